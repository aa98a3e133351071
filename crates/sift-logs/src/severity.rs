// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Severity taxonomy and its mapping from host log kinds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sift_config::{DisplayFlags, DisplaySettings};

/// Importance of a log line, independent of its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Debug,
	Warning,
	Error,
}

impl Severity {
	/// Convert from a tracing level; everything below WARN is Debug.
	pub fn from_tracing(level: &tracing::Level) -> Self {
		match *level {
			tracing::Level::ERROR => Severity::Error,
			tracing::Level::WARN => Severity::Warning,
			_ => Severity::Debug,
		}
	}

	/// Level a line of this severity is emitted at.
	pub fn to_tracing(self) -> tracing::Level {
		match self {
			Severity::Debug => tracing::Level::INFO,
			Severity::Warning => tracing::Level::WARN,
			Severity::Error => tracing::Level::ERROR,
		}
	}

	/// Display flags configured for this severity.
	pub fn display_flags(self, display: &DisplaySettings) -> DisplayFlags {
		match self {
			Severity::Debug => display.debug,
			Severity::Warning => display.warning,
			Severity::Error => display.error,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Severity::Debug => "debug",
			Severity::Warning => "warning",
			Severity::Error => "error",
		}
	}
}

impl std::fmt::Display for Severity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// The host sink's own classification of an emitted line.
///
/// Assertion failures and exceptions are kept apart from plain errors so
/// records remember where they came from, but all three count as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostLogKind {
	Log,
	Warning,
	Error,
	Assert,
	Exception,
}

impl HostLogKind {
	pub fn severity(self) -> Severity {
		match self {
			HostLogKind::Log => Severity::Debug,
			HostLogKind::Warning => Severity::Warning,
			HostLogKind::Error | HostLogKind::Assert | HostLogKind::Exception => Severity::Error,
		}
	}

	/// Kind of a tracing event, refined by its `kind` field when present.
	pub fn from_tracing(level: &tracing::Level, kind: Option<&str>) -> Self {
		let fallback = match Severity::from_tracing(level) {
			Severity::Debug => HostLogKind::Log,
			Severity::Warning => HostLogKind::Warning,
			Severity::Error => HostLogKind::Error,
		};

		match kind.and_then(|k| k.parse::<HostLogKind>().ok()) {
			// A kind field may only refine, never change, the severity.
			Some(parsed) if parsed.severity() == fallback.severity() => parsed,
			_ => fallback,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			HostLogKind::Log => "log",
			HostLogKind::Warning => "warning",
			HostLogKind::Error => "error",
			HostLogKind::Assert => "assert",
			HostLogKind::Exception => "exception",
		}
	}
}

impl FromStr for HostLogKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"log" => Ok(HostLogKind::Log),
			"warning" => Ok(HostLogKind::Warning),
			"error" => Ok(HostLogKind::Error),
			"assert" => Ok(HostLogKind::Assert),
			"exception" => Ok(HostLogKind::Exception),
			other => Err(format!("unknown log kind: {other}")),
		}
	}
}

impl std::fmt::Display for HostLogKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}
