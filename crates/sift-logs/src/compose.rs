// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Line decoration: `(file:line) [Tag] | message`.

use std::sync::atomic::{AtomicU64, Ordering};

use colored::{Color, Colorize};
use sift_config::DisplayFlags;

use crate::severity::Severity;

/// Location labels longer than this are treated as full paths.
pub const MAX_LOCATION_LEN: usize = 20;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Number of lines composed in this process so far.
///
/// Increases by one per [`LineComposer::compose`] call and is never reset.
pub fn sequence() -> u64 {
	SEQUENCE.load(Ordering::Relaxed)
}

/// Shorten a long location label to its file name without extension.
///
/// A leading dot does not start an extension, so `.hidden` stays `.hidden`.
pub fn normalize_location(label: &str) -> &str {
	if label.chars().count() <= MAX_LOCATION_LEN {
		return label;
	}

	let file = label.rsplit(&['/', '\\'][..]).next().unwrap_or(label);
	match file.rfind('.') {
		Some(dot) if dot > 0 => &file[..dot],
		_ => file,
	}
}

fn divider_color(severity: Severity) -> Color {
	match severity {
		Severity::Debug => Color::White,
		Severity::Warning => Color::Yellow,
		Severity::Error => Color::Red,
	}
}

/// Output flavour of decorated lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposeStyle {
	/// Terminal colours, subject to `colored`'s own tty and env detection.
	#[default]
	Ansi,
	/// No escape sequences.
	Plain,
}

/// Builds decorated lines. Performs no suppression.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineComposer {
	style: ComposeStyle,
}

impl LineComposer {
	pub fn new(style: ComposeStyle) -> Self {
		Self { style }
	}

	pub fn style(&self) -> ComposeStyle {
		self.style
	}

	/// Compose the printable line.
	///
	/// The tracer is `(label:line)` when `show_tracer` is set, the tag is
	/// ` [name]` when `show_tag` is set and a name is given, and a divider
	/// coloured by severity follows when either is present. The message is
	/// appended unmodified.
	pub fn compose(
		&self,
		message: &str,
		location: &str,
		severity: Severity,
		line: u32,
		tag_name: Option<&str>,
		flags: DisplayFlags,
	) -> String {
		SEQUENCE.fetch_add(1, Ordering::Relaxed);

		let tag_name = tag_name.filter(|name| flags.show_tag && !name.is_empty());
		let mut out = String::with_capacity(message.len() + 32);

		if flags.show_tracer {
			out.push_str(&format!("({}:{})", normalize_location(location), line));
		}

		if let Some(name) = tag_name {
			match self.style {
				ComposeStyle::Ansi => out.push_str(&format!(" [{}]", name.green())),
				ComposeStyle::Plain => out.push_str(&format!(" [{name}]")),
			}
		}

		if flags.show_tracer || tag_name.is_some() {
			match self.style {
				ComposeStyle::Ansi => out.push_str(&format!(
					" {} ",
					"|".bold().color(divider_color(severity))
				)),
				ComposeStyle::Plain => out.push_str(" | "),
			}
		}

		out.push_str(message);
		out
	}
}

/// Remove ANSI escape sequences.
fn strip_ansi(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(c) = chars.next() {
		if c != '\u{1b}' {
			out.push(c);
			continue;
		}
		if chars.next() == Some('[') {
			for c in chars.by_ref() {
				if ('@'..='~').contains(&c) {
					break;
				}
			}
		}
	}
	out
}

/// Recover the original message from a decorated line.
///
/// Lines without a tracer or tag prefix are returned as they are.
pub fn strip_decoration(text: &str) -> String {
	let plain = strip_ansi(text);
	if !(plain.starts_with('(') || plain.starts_with(" [")) {
		return plain;
	}
	match plain.find(" | ") {
		Some(divider) => plain[divider + 3..].to_string(),
		None => plain,
	}
}
