// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Tag based pass/withhold decisions and the withheld-message journal.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use sift_tags::{Tag, TagMask, TagRegistry};

use crate::SIFT_TARGET;

/// Outcome of a tag-qualified log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
	/// The tag is displayed; emission proceeds.
	Passed,
	/// The tag is hidden; the message went to the journal instead.
	Withheld,
}

/// A suppressed message kept for later inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithheldMessage {
	pub message: String,
	pub tag: Tag,
	pub timestamp: DateTime<Local>,
}

/// Batch report produced by [`TagFilter::flush_withheld`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithheldReport {
	pub tag: Tag,
	pub tag_name: String,
	/// Drained entries in capture order.
	pub messages: Vec<WithheldMessage>,
}

impl fmt::Display for WithheldReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"=== [{}] Withheld messages: {} ===",
			self.tag_name,
			self.messages.len()
		)?;
		for withheld in &self.messages {
			writeln!(
				f,
				"[{}] {}",
				withheld.timestamp.format("%H:%M:%S"),
				withheld.message
			)?;
		}
		Ok(())
	}
}

/// Decides per tag whether output is emitted and journals what is not.
///
/// The displayed mask is replaced wholesale. The decision, the passed
/// counter and the journal share one lock, so a call racing with
/// [`flush_withheld`](Self::flush_withheld) or
/// [`reset_counters`](Self::reset_counters) is either fully before or fully
/// after it.
pub struct TagFilter {
	registry: Arc<TagRegistry>,
	state: Mutex<FilterState>,
}

struct FilterState {
	displayed: TagMask,
	passed: u64,
	journal: Vec<WithheldMessage>,
}

impl TagFilter {
	pub fn new(registry: Arc<TagRegistry>, displayed: TagMask) -> Self {
		Self {
			registry,
			state: Mutex::new(FilterState {
				displayed,
				passed: 0,
				journal: Vec::new(),
			}),
		}
	}

	/// A filter displaying every declared tag.
	pub fn display_all(registry: Arc<TagRegistry>) -> Self {
		let all = TagMask::all(&registry);
		Self::new(registry, all)
	}

	pub fn registry(&self) -> &Arc<TagRegistry> {
		&self.registry
	}

	pub fn displayed(&self) -> TagMask {
		self.state.lock().displayed
	}

	/// Replace the displayed mask.
	pub fn set_displayed(&self, mask: TagMask) {
		self.state.lock().displayed = mask;
		tracing::debug!(mask = mask.value(), "displayed tags changed");
	}

	pub fn should_display(&self, tag: Tag) -> bool {
		self.state.lock().displayed.contains(tag)
	}

	/// Decide one tag-qualified call and record the outcome.
	pub fn admit(&self, tag: Tag, message: &str) -> Admission {
		let mut state = self.state.lock();
		if state.displayed.contains(tag) {
			state.passed += 1;
			Admission::Passed
		} else {
			state.journal.push(WithheldMessage {
				message: message.to_string(),
				tag,
				timestamp: Local::now(),
			});
			Admission::Withheld
		}
	}

	/// Number of calls that passed since the last reset.
	pub fn passed_count(&self) -> u64 {
		self.state.lock().passed
	}

	/// Number of journalled messages.
	pub fn withheld_count(&self) -> usize {
		self.state.lock().journal.len()
	}

	/// Snapshot of the journal in capture order.
	pub fn withheld(&self) -> Vec<WithheldMessage> {
		self.state.lock().journal.clone()
	}

	/// Drain every journalled message for `tag` and emit them as one report.
	///
	/// Other tags' entries stay in the journal. Returns `None` and emits
	/// nothing when no entry matches.
	pub fn flush_withheld(&self, tag: Tag) -> Option<WithheldReport> {
		let messages = {
			let mut state = self.state.lock();
			let (matching, rest): (Vec<_>, Vec<_>) =
				state.journal.drain(..).partition(|m| m.tag == tag);
			state.journal = rest;
			matching
		};

		if messages.is_empty() {
			return None;
		}

		let report = WithheldReport {
			tag,
			tag_name: self
				.registry
				.name(tag)
				.unwrap_or_else(|| tag.to_string()),
			messages,
		};
		tracing::info!(target: SIFT_TARGET, "{}", report);
		Some(report)
	}

	/// Zero the passed counter and empty the journal.
	pub fn reset_counters(&self) {
		let mut state = self.state.lock();
		state.passed = 0;
		state.journal.clear();
	}
}

impl fmt::Debug for TagFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.lock();
		f.debug_struct("TagFilter")
			.field("displayed", &state.displayed)
			.field("passed", &state.passed)
			.field("withheld", &state.journal.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filter_showing_a() -> (TagFilter, Tag, Tag) {
		let registry = Arc::new(TagRegistry::from_names(["A", "B"]).unwrap());
		let a = registry.get("A").unwrap();
		let b = registry.get("B").unwrap();
		(TagFilter::new(registry, TagMask::from_tag(a)), a, b)
	}

	#[test]
	fn test_hidden_tag_is_withheld() {
		let (filter, _, b) = filter_showing_a();

		assert_eq!(filter.admit(b, "hidden"), Admission::Withheld);
		assert_eq!(filter.withheld_count(), 1);
		assert_eq!(filter.passed_count(), 0);
	}

	#[test]
	fn test_displayed_tag_passes() {
		let (filter, a, _) = filter_showing_a();

		assert!(filter.should_display(a));
		assert_eq!(filter.admit(a, "shown"), Admission::Passed);
		assert_eq!(filter.passed_count(), 1);
		assert_eq!(filter.withheld_count(), 0);
	}

	#[test]
	fn test_flush_drains_only_matching_tag() {
		let (filter, a, b) = filter_showing_a();
		filter.set_displayed(TagMask::none());

		filter.admit(b, "b1");
		filter.admit(a, "a1");
		filter.admit(b, "b2");

		let report = filter.flush_withheld(b).unwrap();
		let drained: Vec<_> = report.messages.iter().map(|m| m.message.as_str()).collect();
		assert_eq!(drained, vec!["b1", "b2"]);
		assert_eq!(report.tag_name, "B");

		let remaining = filter.withheld();
		assert_eq!(remaining.len(), 1);
		assert_eq!(remaining[0].tag, a);

		assert!(filter.flush_withheld(b).is_none());
	}

	#[test]
	fn test_report_format() {
		let (filter, _, b) = filter_showing_a();
		filter.admit(b, "first");
		filter.admit(b, "second");

		let rendered = filter.flush_withheld(b).unwrap().to_string();
		let lines: Vec<_> = rendered.lines().collect();
		assert_eq!(lines[0], "=== [B] Withheld messages: 2 ===");
		assert!(lines[1].ends_with("] first"));
		assert!(lines[2].ends_with("] second"));
		assert_eq!(lines[1].len(), "[00:00:00] first".len());
	}

	#[test]
	fn test_reset_counters() {
		let (filter, a, b) = filter_showing_a();
		filter.admit(a, "shown");
		filter.admit(b, "hidden");

		filter.reset_counters();
		assert_eq!(filter.passed_count(), 0);
		assert_eq!(filter.withheld_count(), 0);
	}

	#[test]
	fn test_display_all_follows_registry() {
		let registry = Arc::new(TagRegistry::from_names(["A", "B"]).unwrap());
		let filter = TagFilter::display_all(Arc::clone(&registry));

		for tag in registry.tags() {
			assert!(filter.should_display(tag));
		}
	}

	#[test]
	fn test_concurrent_admissions_are_all_accounted() {
		let (filter, a, b) = filter_showing_a();
		let filter = Arc::new(filter);

		let handles: Vec<_> = (0..4)
			.map(|i| {
				let filter = Arc::clone(&filter);
				std::thread::spawn(move || {
					for n in 0..100 {
						let tag = if (i + n) % 2 == 0 { a } else { b };
						filter.admit(tag, "msg");
					}
				})
			})
			.collect();
		let flusher = {
			let filter = Arc::clone(&filter);
			std::thread::spawn(move || {
				let mut flushed = 0;
				for _ in 0..20 {
					flushed += filter.flush_withheld(b).map_or(0, |r| r.messages.len());
				}
				flushed
			})
		};
		for handle in handles {
			handle.join().unwrap();
		}
		let flushed = flusher.join().unwrap();

		assert_eq!(filter.passed_count(), 200);
		assert_eq!(flushed + filter.withheld_count(), 200);
	}
}
