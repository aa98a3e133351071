// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Diagnostic log capture, retention and tag filtering.
//!
//! This crate provides:
//! - [`DiagnosticLogger`] - the logging context: tag filter, line composer
//!   and log history behind the [`DiagnosticSink`] entry points
//! - [`LogAggregator`] - a bounded history of emitted lines with severity
//!   counters and broadcast subscribers
//! - [`AggregatorLayer`] - a tracing Layer feeding the aggregator
//! - [`TagFilter`] - per-tag pass/withhold decisions and the withheld journal
//! - [`LineComposer`] - `(file:line) [Tag] | message` decoration
//! - [`NoopLogger`] - the same entry points with everything but exceptions
//!   dropped, selected when the `diagnostics` feature is off
//!
//! # Usage
//!
//! ```ignore
//! use sift_logs::{DiagnosticLogger, DiagnosticSink};
//! use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
//!
//! let settings = sift_config::load_settings()?;
//! let logger = DiagnosticLogger::builder().settings(settings).build()?;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(logger.layer())
//!     .init();
//!
//! let net = logger.tag("Network");
//! logger.log("connected", net);
//! ```

mod aggregator;
mod compose;
mod error;
mod filter;
mod layer;
mod logger;
mod record;
mod severity;
mod sink;
mod stack_trace;

pub use aggregator::{
	default_capacity, AggregatorEvent, LogAggregator, SeverityCounts, DEFAULT_CAPACITY,
	LOW_MEMORY_CAPACITY, LOW_MEMORY_THRESHOLD_MB,
};
pub use compose::{
	normalize_location, sequence, strip_decoration, ComposeStyle, LineComposer, MAX_LOCATION_LEN,
};
pub use error::{LogError, Result};
pub use filter::{Admission, TagFilter, WithheldMessage, WithheldReport};
pub use layer::{AggregatorLayer, KIND_FIELD, STACK_TRACE_FIELD};
pub use logger::{AssertionHook, DiagnosticLogger, DiagnosticLoggerBuilder, WarnOnAssertion};
pub use record::LogRecord;
pub use severity::{HostLogKind, Severity};
pub use sink::{
	build_logger, DiagnosticSink, Logger, NoopLogger, SourceLocation, NULL_ASSERTION_MESSAGE,
};

pub use stack_trace::capture_stack_trace;

pub use sift_config::{DisplayFlags, DisplaySettings, LogSettings, StackTraceMode};
pub use sift_tags::{Tag, TagMask, TagRegistry};

/// Tracing target of every line this crate emits.
pub const SIFT_TARGET: &str = "sift";
