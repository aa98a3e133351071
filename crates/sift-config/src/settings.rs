// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Display settings and their TOML persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_tags::{TagMask, TagRegistry};
use tracing::warn;

use crate::ConfigError;

/// Tag declared when the settings name none.
pub const DEFAULT_TAG: &str = "Default";

/// What a decorated line shows for one severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFlags {
	/// Prefix the line with `(file:line)`.
	pub show_tracer: bool,
	/// Show the tag name after the tracer.
	pub show_tag: bool,
}

impl Default for DisplayFlags {
	fn default() -> Self {
		Self {
			show_tracer: true,
			show_tag: true,
		}
	}
}

/// Display flags for each severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
	pub debug: DisplayFlags,
	pub warning: DisplayFlags,
	pub error: DisplayFlags,
}

/// How much of the call stack debug and warning lines carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackTraceMode {
	/// No stack trace.
	#[default]
	Off,
	/// Frames from application code only.
	AppOnly,
	/// Every captured frame.
	Full,
}

/// Persisted logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
	/// Whether a failed assertion asks the host to pause.
	pub enable_assertion_stop: bool,
	/// Raw displayed-tags mask; absent means every tag is displayed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub displayed_tags: Option<u64>,
	/// Declared tag names, in ordinal order.
	pub tags: Vec<String>,
	pub display: DisplaySettings,
	/// Stack traces attached to debug and warning lines.
	pub stack_traces: StackTraceMode,
}

impl Default for LogSettings {
	fn default() -> Self {
		Self {
			enable_assertion_stop: true,
			displayed_tags: None,
			tags: vec![DEFAULT_TAG.to_string()],
			display: DisplaySettings::default(),
			stack_traces: StackTraceMode::default(),
		}
	}
}

impl LogSettings {
	/// Settings after the saved state has been cleared.
	///
	/// Tag names are hidden and assertion stop is off; tracers stay visible.
	pub fn cleared() -> Self {
		let hidden_tag = DisplayFlags {
			show_tracer: true,
			show_tag: false,
		};
		Self {
			enable_assertion_stop: false,
			display: DisplaySettings {
				debug: hidden_tag,
				warning: hidden_tag,
				error: hidden_tag,
			},
			..Self::default()
		}
	}

	/// Load settings from `path`, falling back to defaults.
	///
	/// A missing file is normal. Nothing here is fatal:
	/// - an unreadable file is logged and ignored;
	/// - a corrupt file is logged and moved aside to [`corrupt_path`];
	/// - an invalid tag list is replaced by the default one.
	pub fn load(path: &Path) -> Self {
		match Self::try_load(path) {
			Ok(Some(settings)) => settings.with_valid_tags(),
			Ok(None) => {
				tracing::debug!(path = %path.display(), "no saved log settings; using defaults");
				Self::default()
			}
			Err(e @ ConfigError::TomlParse { .. }) => {
				let aside = corrupt_path(path);
				warn!(
					path = %path.display(),
					moved_to = %aside.display(),
					error = %e,
					"discarding corrupt log settings; using defaults"
				);
				if let Err(rename) = std::fs::rename(path, &aside) {
					warn!(path = %path.display(), error = %rename, "failed to move corrupt log settings aside");
				}
				Self::default()
			}
			Err(e) => {
				warn!(
					path = %path.display(),
					error = %e,
					"discarding unreadable log settings; using defaults"
				);
				Self::default()
			}
		}
	}

	/// Replace an undeclarable tag list with the default one.
	///
	/// The persisted mask indexes the old list, so it is dropped as well.
	fn with_valid_tags(self) -> Self {
		match self.registry() {
			Ok(_) => self,
			Err(e) => {
				warn!(
					tags = ?self.tags,
					error = %e,
					"discarding invalid tag list; declaring the default tag"
				);
				Self {
					tags: vec![DEFAULT_TAG.to_string()],
					displayed_tags: None,
					..self
				}
			}
		}
	}

	/// Load settings from `path`, reporting every failure.
	///
	/// Returns `Ok(None)` when the file does not exist.
	pub fn try_load(path: &Path) -> Result<Option<Self>, ConfigError> {
		if !path.exists() {
			return Ok(None);
		}

		let contents = std::fs::read_to_string(path)?;
		let settings = toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
			path: path.to_path_buf(),
			source,
		})?;
		Ok(Some(settings))
	}

	/// Write settings to `path`, creating parent directories.
	pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let contents = toml::to_string_pretty(self)?;
		std::fs::write(path, contents)?;
		tracing::debug!(path = %path.display(), "saved log settings");
		Ok(())
	}

	/// Delete the saved file and return [`LogSettings::cleared`].
	pub fn clear_saved(path: &Path) -> Result<Self, ConfigError> {
		match std::fs::remove_file(path) {
			Ok(()) => {}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
			Err(e) => return Err(e.into()),
		}
		Ok(Self::cleared())
	}

	/// Build the tag registry from the declared names.
	pub fn registry(&self) -> Result<TagRegistry, ConfigError> {
		if self.tags.is_empty() {
			return Ok(TagRegistry::from_names([DEFAULT_TAG])?);
		}
		Ok(TagRegistry::from_names(self.tags.iter().cloned())?)
	}

	/// Displayed tags resolved against `registry`.
	///
	/// Out-of-range persisted values are clipped.
	pub fn displayed_mask(&self, registry: &TagRegistry) -> TagMask {
		match self.displayed_tags {
			Some(raw) => TagMask::from_raw(raw, registry),
			None => TagMask::all(registry),
		}
	}

	pub fn set_displayed_mask(&mut self, mask: TagMask) {
		self.displayed_tags = Some(mask.value());
	}
}

/// Where [`LogSettings::load`] moves a settings file it cannot parse.
pub fn corrupt_path(path: &Path) -> PathBuf {
	let mut name = path
		.file_name()
		.map(|name| name.to_os_string())
		.unwrap_or_default();
	name.push(".corrupt");
	path.with_file_name(name)
}
