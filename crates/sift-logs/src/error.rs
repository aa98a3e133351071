// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for building loggers and aggregators.

use thiserror::Error;

/// Errors raised while constructing the logging context.
#[derive(Debug, Error)]
pub enum LogError {
	/// History buffer could not be created
	#[error("history buffer: {0}")]
	Ring(#[from] sift_ring::RingBufferError),

	/// Settings or tag declarations are invalid
	#[error("settings: {0}")]
	Config(#[from] sift_config::ConfigError),
}

pub type Result<T> = std::result::Result<T, LogError>;
