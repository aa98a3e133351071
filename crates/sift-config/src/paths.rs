// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

use crate::ConfigError;

/// Environment variable overriding the settings file location.
pub const SETTINGS_FILE_ENV: &str = "SIFT_SETTINGS_FILE";

/// Resolve the settings file path.
///
/// Order: `SIFT_SETTINGS_FILE`, then `$XDG_CONFIG_HOME/sift/settings.toml`,
/// then `~/.config/sift/settings.toml`.
pub fn resolve_settings_path() -> Result<PathBuf, ConfigError> {
	if let Some(path) = std::env::var_os(SETTINGS_FILE_ENV) {
		return Ok(PathBuf::from(path));
	}

	let config_home = match std::env::var_os("XDG_CONFIG_HOME") {
		Some(dir) => PathBuf::from(dir),
		None => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};

	let path = config_home.join("sift/settings.toml");
	tracing::debug!(path = %path.display(), "resolved settings path");
	Ok(path)
}
