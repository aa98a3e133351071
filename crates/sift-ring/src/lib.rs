// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fixed-capacity ring buffer used by Sift to retain recent log records.
//!
//! - [`RingBuffer`] - overwrite-oldest circular storage behind a single lock
//! - [`RingBufferError`] - construction and index errors

mod buffer;
mod error;

pub use buffer::RingBuffer;
pub use error::{Result, RingBufferError};
