// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the ring buffer.

use thiserror::Error;

/// Errors raised by [`RingBuffer`](crate::RingBuffer) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
	/// The buffer cannot be built with the requested settings.
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),

	/// A logical index past the newest live element was requested.
	#[error("index {index} out of range for buffer holding {count} element(s)")]
	IndexOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, RingBufferError>;
