// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Stack trace capture for debug and warning lines.

use std::backtrace::Backtrace;

use sift_config::StackTraceMode;

/// Capture the current stack according to `mode`.
///
/// Returns `None` for [`StackTraceMode::Off`] or when nothing is left after
/// filtering.
pub fn capture_stack_trace(mode: StackTraceMode) -> Option<String> {
	let rendered = match mode {
		StackTraceMode::Off => return None,
		StackTraceMode::AppOnly => app_frames(&Backtrace::force_capture().to_string()),
		StackTraceMode::Full => Backtrace::force_capture().to_string(),
	};
	let rendered = rendered.trim_end().to_string();
	(!rendered.is_empty()).then_some(rendered)
}

/// Keep only application frames of a rendered backtrace.
///
/// Each frame is a `N: function` line followed by its `at file:line` lines.
fn app_frames(rendered: &str) -> String {
	let mut out = String::new();
	let mut keep = false;

	for line in rendered.lines() {
		let trimmed = line.trim_start();
		if let Some(function) = frame_function(trimmed) {
			keep = is_app_frame(function);
		} else if !trimmed.starts_with("at ") {
			keep = false;
		}

		if keep {
			out.push_str(line);
			out.push('\n');
		}
	}
	out
}

fn frame_function(line: &str) -> Option<&str> {
	let (index, function) = line.split_once(':')?;
	index.parse::<u32>().ok()?;
	Some(function.trim())
}

fn is_app_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tracing::",
		"<tracing::",
		"tracing_core::",
		"tracing_subscriber::",
		"<tracing_subscriber::",
		"sift_logs::",
		"<sift_logs::",
		"test::",
		"<F as core::",
		"__rust",
		"_start",
		"__libc",
		"clone",
		"start_thread",
	];

	!function.is_empty() && !SYSTEM_PREFIXES.iter().any(|prefix| function.starts_with(prefix))
}
