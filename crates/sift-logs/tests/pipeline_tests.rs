// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use sift_logs::{
	build_logger, strip_decoration, AggregatorEvent, ComposeStyle, DiagnosticLogger, DiagnosticSink,
	HostLogKind, LogRecord, LogSettings, Severity, TagMask, NULL_ASSERTION_MESSAGE,
};
use tracing_subscriber::layer::SubscriberExt;

fn logger_with_tags(names: &[&str]) -> DiagnosticLogger {
	DiagnosticLogger::builder()
		.settings(LogSettings {
			tags: names.iter().map(|n| n.to_string()).collect(),
			enable_assertion_stop: false,
			..LogSettings::default()
		})
		.style(ComposeStyle::Plain)
		.capacity(50)
		.build()
		.unwrap()
}

/// Run `f` with only `logger`'s layer installed.
fn capture(logger: &DiagnosticLogger, f: impl FnOnce()) -> Vec<LogRecord> {
	let subscriber = tracing_subscriber::registry().with(logger.layer());
	tracing::subscriber::with_default(subscriber, f);
	logger.aggregator().records()
}

#[test]
fn warnings_then_clear_resets_history() {
	let logger = logger_with_tags(&["Default"]);
	let mut rx = logger.aggregator().subscribe();

	capture(&logger, || {
		for i in 0..5 {
			logger.log_warning(&format!("warning {i}"), None);
		}
	});
	assert_eq!(logger.aggregator().warning_count(), 5);
	assert_eq!(logger.aggregator().all_log_count(), 5);

	logger.aggregator().clear();
	assert_eq!(logger.aggregator().warning_count(), 0);
	assert_eq!(logger.aggregator().all_log_count(), 0);

	let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
	assert_eq!(events.len(), 6);
	assert_eq!(events.last(), Some(&AggregatorEvent::Cleared));
}

#[test]
fn hidden_tag_is_journalled_and_flushed() {
	let logger = logger_with_tags(&["A", "B"]);
	let a = logger.tag("A").unwrap();
	let b = logger.tag("B").unwrap();
	logger.set_displayed_tags(TagMask::from_tag(a));

	let records = capture(&logger, || {
		logger.log("x", Some(a));
		logger.log("y", Some(b));
		logger.log("z", Some(b));
	});

	assert_eq!(records.len(), 1);
	assert_eq!(strip_decoration(&records[0].message), "x");
	assert_eq!(logger.filter().passed_count(), 1);
	assert_eq!(logger.filter().withheld_count(), 2);

	let records = capture(&logger, || {
		let report = logger.flush_withheld(b).unwrap();
		assert_eq!(report.tag_name, "B");
		let messages: Vec<_> = report.messages.iter().map(|m| m.message.as_str()).collect();
		assert_eq!(messages, vec!["y", "z"]);
	});

	assert_eq!(logger.filter().withheld_count(), 0);
	let report_line = &records.last().unwrap().message;
	assert!(report_line.starts_with("=== [B] Withheld messages: 2 ==="), "got {report_line}");
	assert!(logger.flush_withheld(b).is_none());
}

#[test]
fn untagged_calls_bypass_the_filter() {
	let logger = logger_with_tags(&["A"]);
	logger.set_displayed_tags(TagMask::none());

	let records = capture(&logger, || {
		logger.log_error("always shown", None);
	});

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].severity, Severity::Error);
	assert_eq!(logger.filter().passed_count(), 0);
	assert_eq!(logger.filter().withheld_count(), 0);
}

#[test]
fn exceptions_are_never_filtered() {
	let logger = logger_with_tags(&["A"]);
	logger.set_displayed_tags(TagMask::none());
	let error = std::io::Error::other("socket closed");

	let records = capture(&logger, || {
		logger.log_exception(&error);
	});

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].kind, HostLogKind::Exception);
	assert_eq!(records[0].message, "socket closed");
	assert_eq!(logger.aggregator().error_count(), 1);
}

#[test]
fn failed_assertions_are_errors() {
	let logger = logger_with_tags(&["A"]);

	let records = capture(&logger, || {
		logger.assert(1 + 1 == 2, "arithmetic");
		logger.assert_not_null::<u32>(None, "");
	});

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].kind, HostLogKind::Assert);
	assert!(records[0].message.ends_with(NULL_ASSERTION_MESSAGE));
}

#[test]
fn history_keeps_newest_records() {
	let logger = DiagnosticLogger::builder()
		.style(ComposeStyle::Plain)
		.capacity(3)
		.build()
		.unwrap();

	capture(&logger, || {
		for c in ["A", "B", "C", "D", "E"] {
			logger.log(c, None);
		}
	});

	let messages: Vec<_> = logger
		.aggregator()
		.records()
		.iter()
		.map(|r| strip_decoration(&r.message))
		.collect();
	assert_eq!(messages, vec!["C", "D", "E"]);
	assert_eq!(logger.aggregator().info_count(), 5);
}

#[test]
fn settings_survive_save_and_clear() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("sift").join("settings.toml");

	let logger = logger_with_tags(&["A", "B"]);
	let b = logger.tag("B").unwrap();
	logger.set_displayed_tags(TagMask::from_tag(b));
	logger.save_settings(&path).unwrap();

	let restored = DiagnosticLogger::builder()
		.settings(LogSettings::load(&path))
		.build()
		.unwrap();
	assert_eq!(restored.displayed_tags(), TagMask::from_tag(b));
	assert_eq!(restored.registry().names(), vec!["A", "B"]);

	restored.clear_saved_settings(&path).unwrap();
	assert!(!path.exists());
	let settings = restored.settings();
	assert!(!settings.enable_assertion_stop);
	assert!(!settings.display.warning.show_tag);
	assert!(settings.display.warning.show_tracer);
	assert_eq!(settings.tags, vec!["A", "B"]);
	assert_eq!(restored.displayed_tags(), TagMask::all(restored.registry()));
}

#[test]
fn shared_logger_across_threads() {
	let logger = Arc::new(logger_with_tags(&["Worker"]));
	let worker = logger.tag("Worker").unwrap();
	let subscriber = tracing_subscriber::registry().with(logger.layer());
	let dispatch = tracing::Dispatch::new(subscriber);

	let handles: Vec<_> = (0..4)
		.map(|t| {
			let logger = Arc::clone(&logger);
			let dispatch = dispatch.clone();
			std::thread::spawn(move || {
				tracing::dispatcher::with_default(&dispatch, || {
					for i in 0..10 {
						logger.log(&format!("thread {t} line {i}"), Some(worker));
					}
				});
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(logger.aggregator().all_log_count(), 40);
	assert_eq!(logger.filter().passed_count(), 40);
}

#[cfg(feature = "diagnostics")]
#[test]
fn feature_selected_logger_is_full() {
	let logger = build_logger(DiagnosticLogger::builder().capacity(5)).unwrap();
	assert_eq!(logger.aggregator().capacity(), 5);
}

#[cfg(not(feature = "diagnostics"))]
#[test]
fn feature_selected_logger_is_noop() {
	let logger = build_logger(DiagnosticLogger::builder()).unwrap();
	logger.log("dropped", None);
}
