// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persisted settings for Sift diagnostic logging.
//!
//! This crate provides:
//! - XDG Base Directory compliant resolution of the settings file
//! - [`LogSettings`]: per-severity display flags, the displayed tag mask and
//!   the declared tag names, stored as TOML
//! - Tolerant loading: a missing or corrupt file falls back to defaults

pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::{resolve_settings_path, SETTINGS_FILE_ENV};
pub use settings::{
	corrupt_path, DisplayFlags, DisplaySettings, LogSettings, StackTraceMode, DEFAULT_TAG,
};

/// Load settings from the resolved default location.
///
/// Never fails on bad file contents; only an unresolvable home directory is
/// reported.
pub fn load_settings() -> Result<LogSettings, ConfigError> {
	let path = resolve_settings_path()?;
	Ok(LogSettings::load(&path))
}
