// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Tracing layer that feeds emitted lines into a [`LogAggregator`].

use std::fmt;
use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::aggregator::LogAggregator;
use crate::severity::HostLogKind;

/// Field carrying a stack trace or error chain.
pub const STACK_TRACE_FIELD: &str = "stack_trace";

/// Field refining the host kind, e.g. `kind = "assert"`.
pub const KIND_FIELD: &str = "kind";

/// A tracing Layer that records every event into a [`LogAggregator`].
///
/// This is the host log sink subscription: compose it with the output layer
/// (like `fmt::layer()`) so the aggregator sees exactly what is emitted.
/// Extra structured fields are appended to the message as `key=value`.
#[derive(Clone)]
pub struct AggregatorLayer {
	aggregator: LogAggregator,
}

impl AggregatorLayer {
	pub fn new(aggregator: LogAggregator) -> Self {
		Self { aggregator }
	}

	pub fn aggregator(&self) -> &LogAggregator {
		&self.aggregator
	}
}

impl<S> Layer<S> for AggregatorLayer
where
	S: Subscriber + for<'a> LookupSpan<'a>,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();

		let mut visitor = FieldVisitor::default();
		event.record(&mut visitor);

		let kind = HostLogKind::from_tracing(metadata.level(), visitor.kind.as_deref());
		let mut message = visitor.message.unwrap_or_default();
		for (name, value) in &visitor.fields {
			let _ = write!(message, " {name}={value}");
		}

		self.aggregator
			.record(kind, message, visitor.stack_trace.unwrap_or_default());
	}
}

#[derive(Default)]
struct FieldVisitor {
	message: Option<String>,
	stack_trace: Option<String>,
	kind: Option<String>,
	fields: Vec<(String, String)>,
}

impl FieldVisitor {
	fn store(&mut self, field: &Field, value: String) {
		match field.name() {
			"message" => self.message = Some(value),
			STACK_TRACE_FIELD => self.stack_trace = Some(value),
			KIND_FIELD => self.kind = Some(value),
			name => self.fields.push((name.to_string(), value)),
		}
	}
}

impl Visit for FieldVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		self.store(field, format!("{:?}", value));
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		self.store(field, value.to_string());
	}

	fn record_i64(&mut self, field: &Field, value: i64) {
		self.store(field, value.to_string());
	}

	fn record_u64(&mut self, field: &Field, value: u64) {
		self.store(field, value.to_string());
	}

	fn record_bool(&mut self, field: &Field, value: bool) {
		self.store(field, value.to_string());
	}

	fn record_f64(&mut self, field: &Field, value: f64) {
		self.store(field, value.to_string());
	}

	fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
		self.store(field, value.to_string());
	}
}
