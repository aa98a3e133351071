// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// I/O error reading or writing the settings file
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// TOML serialization error
	#[error("TOML serialize error: {0}")]
	TomlSerialize(#[from] toml::ser::Error),

	/// Declared tag list is invalid
	#[error("invalid tag list: {0}")]
	Tags(#[from] sift_tags::TagError),

	/// Home directory not found
	#[error("Could not determine home directory")]
	HomeDirNotFound,
}
