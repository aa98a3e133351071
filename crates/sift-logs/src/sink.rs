// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The logging capability shared by the full and no-op loggers.

use std::fmt::Write as _;
use std::panic::Location;

use sift_tags::Tag;

use crate::logger::DiagnosticLoggerBuilder;
use crate::severity::{HostLogKind, Severity};
use crate::{Result, SIFT_TARGET};

/// Message used by [`DiagnosticSink::assert_not_null`] when none is given.
pub const NULL_ASSERTION_MESSAGE: &str = "Object is null";

/// Source position of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
	pub file: &'static str,
	pub line: u32,
}

impl SourceLocation {
	pub const fn new(file: &'static str, line: u32) -> Self {
		Self { file, line }
	}

	/// Location of the nearest caller not marked `#[track_caller]`.
	#[track_caller]
	pub fn caller() -> Self {
		let location = Location::caller();
		Self {
			file: location.file(),
			line: location.line(),
		}
	}
}

/// Logging entry points.
///
/// Implemented by [`DiagnosticLogger`](crate::DiagnosticLogger) and
/// [`NoopLogger`]. The convenience methods capture the caller's location.
pub trait DiagnosticSink: Send + Sync {
	/// Log at `severity`, subject to tag filtering when `tag` is given.
	fn log_at(&self, severity: Severity, message: &str, tag: Option<Tag>, location: SourceLocation);

	/// Emit an error line when `condition` is false.
	fn assert_at(&self, condition: bool, message: &str, location: SourceLocation);

	/// Report an error. Never filtered and never compiled out.
	fn log_exception(&self, error: &(dyn std::error::Error + 'static));

	#[track_caller]
	fn log(&self, message: &str, tag: Option<Tag>) {
		self.log_at(Severity::Debug, message, tag, SourceLocation::caller());
	}

	#[track_caller]
	fn log_warning(&self, message: &str, tag: Option<Tag>) {
		self.log_at(Severity::Warning, message, tag, SourceLocation::caller());
	}

	#[track_caller]
	fn log_error(&self, message: &str, tag: Option<Tag>) {
		self.log_at(Severity::Error, message, tag, SourceLocation::caller());
	}

	#[track_caller]
	fn assert(&self, condition: bool, message: &str) {
		self.assert_at(condition, message, SourceLocation::caller());
	}

	/// Assert that `value` is present; an empty message becomes
	/// [`NULL_ASSERTION_MESSAGE`].
	#[track_caller]
	fn assert_not_null<T: ?Sized>(&self, value: Option<&T>, message: &str)
	where
		Self: Sized,
	{
		let message = if message.is_empty() {
			NULL_ASSERTION_MESSAGE
		} else {
			message
		};
		self.assert_at(value.is_some(), message, SourceLocation::caller());
	}
}

/// Emit an undecorated error line carrying the error's source chain.
pub(crate) fn emit_exception(error: &(dyn std::error::Error + 'static)) {
	let mut chain = String::new();
	let mut source = error.source();
	while let Some(cause) = source {
		if !chain.is_empty() {
			chain.push('\n');
		}
		let _ = write!(chain, "caused by: {cause}");
		source = cause.source();
	}

	let kind = HostLogKind::Exception.as_str();
	if chain.is_empty() {
		tracing::error!(target: SIFT_TARGET, kind, "{}", error);
	} else {
		tracing::error!(target: SIFT_TARGET, kind, stack_trace = %chain, "{}", error);
	}
}

/// Logger that drops everything except exceptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl DiagnosticSink for NoopLogger {
	fn log_at(&self, _severity: Severity, _message: &str, _tag: Option<Tag>, _location: SourceLocation) {}

	fn assert_at(&self, _condition: bool, _message: &str, _location: SourceLocation) {}

	fn log_exception(&self, error: &(dyn std::error::Error + 'static)) {
		emit_exception(error);
	}
}

/// The logger selected by the `diagnostics` feature.
#[cfg(feature = "diagnostics")]
pub type Logger = crate::DiagnosticLogger;

/// The logger selected by the `diagnostics` feature.
#[cfg(not(feature = "diagnostics"))]
pub type Logger = NoopLogger;

/// Build the feature-selected logger.
#[cfg(feature = "diagnostics")]
pub fn build_logger(builder: DiagnosticLoggerBuilder) -> Result<Logger> {
	builder.build()
}

/// Build the feature-selected logger.
#[cfg(not(feature = "diagnostics"))]
pub fn build_logger(builder: DiagnosticLoggerBuilder) -> Result<Logger> {
	drop(builder);
	Ok(NoopLogger)
}
