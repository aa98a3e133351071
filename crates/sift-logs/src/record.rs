// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retained log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::{HostLogKind, Severity};

/// A log line as observed at the host sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
	/// Arrival order, starting at 1 and never reused within an aggregator.
	pub sequence: u64,
	/// When the aggregator received the line.
	pub timestamp: DateTime<Utc>,
	pub kind: HostLogKind,
	pub severity: Severity,
	/// The emitted text, decoration included.
	pub message: String,
	#[serde(skip_serializing_if = "String::is_empty", default)]
	pub stack_trace: String,
}

impl LogRecord {
	pub fn new(
		sequence: u64,
		kind: HostLogKind,
		message: impl Into<String>,
		stack_trace: impl Into<String>,
	) -> Self {
		Self {
			sequence,
			timestamp: Utc::now(),
			kind,
			severity: kind.severity(),
			message: message.into(),
			stack_trace: stack_trace.into(),
		}
	}
}
