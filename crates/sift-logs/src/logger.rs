// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The diagnostic logging context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use sift_config::LogSettings;
use sift_tags::{Tag, TagMask, TagRegistry};
use tokio::sync::broadcast;

use crate::aggregator::{LogAggregator, DEFAULT_CAPACITY};
use crate::compose::{ComposeStyle, LineComposer};
use crate::error::Result;
use crate::filter::{Admission, TagFilter, WithheldReport};
use crate::layer::AggregatorLayer;
use crate::severity::{HostLogKind, Severity};
use crate::sink::{emit_exception, DiagnosticSink, SourceLocation};
use crate::stack_trace::capture_stack_trace;
use crate::SIFT_TARGET;

/// Size of the settings-change channel.
const SETTINGS_CHANNEL_CAPACITY: usize = 16;

/// Called when an assertion fails and assertion stop is enabled.
pub trait AssertionHook: Send + Sync {
	fn assertion_failed(&self, message: &str, location: SourceLocation);
}

/// Default hook: pausing is host specific, so only a warning is logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarnOnAssertion;

impl AssertionHook for WarnOnAssertion {
	fn assertion_failed(&self, _message: &str, location: SourceLocation) {
		tracing::warn!(
			target: SIFT_TARGET,
			"assertion stop requested at {}:{}",
			location.file,
			location.line
		);
	}
}

/// Builder for [`DiagnosticLogger`].
pub struct DiagnosticLoggerBuilder {
	settings: LogSettings,
	registry: Option<Arc<TagRegistry>>,
	aggregator: Option<LogAggregator>,
	capacity: usize,
	style: ComposeStyle,
	assertion_hook: Option<Arc<dyn AssertionHook>>,
	autosave: Option<PathBuf>,
}

impl DiagnosticLoggerBuilder {
	pub fn new() -> Self {
		Self {
			settings: LogSettings::default(),
			registry: None,
			aggregator: None,
			capacity: DEFAULT_CAPACITY,
			style: ComposeStyle::default(),
			assertion_hook: None,
			autosave: None,
		}
	}

	/// Display flags, displayed tags and tag names to start from.
	pub fn settings(mut self, settings: LogSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Use an existing registry instead of the names in the settings.
	pub fn registry(mut self, registry: Arc<TagRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Share an existing aggregator; `capacity` is then ignored.
	pub fn aggregator(mut self, aggregator: LogAggregator) -> Self {
		self.aggregator = Some(aggregator);
		self
	}

	/// Number of records the history retains.
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	pub fn style(mut self, style: ComposeStyle) -> Self {
		self.style = style;
		self
	}

	pub fn assertion_hook(mut self, hook: Arc<dyn AssertionHook>) -> Self {
		self.assertion_hook = Some(hook);
		self
	}

	/// Save the settings to `path` after every change.
	pub fn autosave(mut self, path: impl Into<PathBuf>) -> Self {
		self.autosave = Some(path.into());
		self
	}

	pub fn build(self) -> Result<DiagnosticLogger> {
		let registry = match self.registry {
			Some(registry) => registry,
			None => Arc::new(self.settings.registry()?),
		};
		let aggregator = match self.aggregator {
			Some(aggregator) => aggregator,
			None => LogAggregator::new(self.capacity)?,
		};

		let mut settings = self.settings;
		settings.tags = registry.names();
		let displayed = settings.displayed_mask(&registry);
		tracing::debug!(
			tags = registry.len(),
			displayed = %displayed.label(&registry),
			capacity = aggregator.capacity(),
			"diagnostic logger ready"
		);

		let (settings_sender, _) = broadcast::channel(SETTINGS_CHANNEL_CAPACITY);
		Ok(DiagnosticLogger {
			filter: TagFilter::new(Arc::clone(&registry), displayed),
			registry,
			aggregator,
			settings: RwLock::new(settings),
			settings_sender,
			autosave: self.autosave,
			composer: LineComposer::new(self.style),
			assertion_hook: self
				.assertion_hook
				.unwrap_or_else(|| Arc::new(WarnOnAssertion)),
		})
	}
}

impl Default for DiagnosticLoggerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// The logging context: tag filter, line composer and log history.
///
/// Create one at startup, install [`layer`](Self::layer) into the tracing
/// subscriber, and share it (typically as `Arc<DiagnosticLogger>`) with the
/// code that logs. Independent instances do not interact.
pub struct DiagnosticLogger {
	registry: Arc<TagRegistry>,
	filter: TagFilter,
	aggregator: LogAggregator,
	settings: RwLock<LogSettings>,
	settings_sender: broadcast::Sender<LogSettings>,
	autosave: Option<PathBuf>,
	composer: LineComposer,
	assertion_hook: Arc<dyn AssertionHook>,
}

impl DiagnosticLogger {
	pub fn builder() -> DiagnosticLoggerBuilder {
		DiagnosticLoggerBuilder::new()
	}

	/// Layer feeding emitted lines into this logger's history.
	pub fn layer(&self) -> AggregatorLayer {
		self.aggregator.layer()
	}

	pub fn aggregator(&self) -> &LogAggregator {
		&self.aggregator
	}

	pub fn filter(&self) -> &TagFilter {
		&self.filter
	}

	pub fn registry(&self) -> &Arc<TagRegistry> {
		&self.registry
	}

	/// Look up a declared tag by name.
	pub fn tag(&self, name: &str) -> Option<Tag> {
		self.registry.get(name)
	}

	pub fn displayed_tags(&self) -> TagMask {
		self.filter.displayed()
	}

	/// Replace the displayed tags, in the filter and in the settings.
	pub fn set_displayed_tags(&self, mask: TagMask) {
		self.update_settings(|settings| settings.set_displayed_mask(mask));
	}

	/// Copy of the current settings.
	pub fn settings(&self) -> LogSettings {
		self.settings.read().clone()
	}

	/// Subscribe to settings changes.
	///
	/// Each change publishes the settings as they are after it.
	pub fn subscribe_settings(&self) -> broadcast::Receiver<LogSettings> {
		self.settings_sender.subscribe()
	}

	/// Modify the settings in place and apply the displayed tags.
	///
	/// Names appended to `tags` are declared in the registry. Declared tags
	/// cannot be removed or renamed, so any other edit of `tags` is undone.
	/// Subscribers are notified and, with autosave configured, the result
	/// is saved.
	pub fn update_settings<F>(&self, update: F)
	where
		F: FnOnce(&mut LogSettings),
	{
		self.apply_settings(update, true);
	}

	fn apply_settings<F>(&self, update: F, autosave: bool)
	where
		F: FnOnce(&mut LogSettings),
	{
		let (displayed, snapshot) = {
			let mut settings = self.settings.write();
			update(&mut *settings);
			self.sync_tags(&mut settings);
			(settings.displayed_mask(&self.registry), settings.clone())
		};
		self.filter.set_displayed(displayed);

		if let Some(path) = self.autosave.as_ref().filter(|_| autosave) {
			if let Err(e) = snapshot.save(path) {
				tracing::warn!(path = %path.display(), error = %e, "failed to autosave log settings");
			}
		}

		// No subscribers is not an error.
		let _ = self.settings_sender.send(snapshot);
	}

	/// Reconcile `settings.tags` with the registry.
	fn sync_tags(&self, settings: &mut LogSettings) {
		let declared = self.registry.names();
		if settings.tags == declared {
			return;
		}

		if settings.tags.starts_with(&declared) {
			for name in &settings.tags[declared.len()..] {
				if let Err(e) = self.registry.register(name.clone()) {
					tracing::warn!(tag = %name, error = %e, "cannot declare tag");
				}
			}
		} else {
			tracing::warn!(
				requested = ?settings.tags,
				"declared tags cannot be removed or renamed; keeping the registry"
			);
		}
		settings.tags = self.registry.names();
	}

	/// Persist the current settings to `path`.
	pub fn save_settings(&self, path: &Path) -> Result<()> {
		let settings = self.settings();
		settings.save(path)?;
		Ok(())
	}

	/// Delete saved settings at `path` and apply the cleared defaults.
	///
	/// Autosave is skipped so the file stays deleted until the next change.
	pub fn clear_saved_settings(&self, path: &Path) -> Result<()> {
		let cleared = LogSettings::clear_saved(path)?;
		self.apply_settings(
			move |settings| {
				let tags = std::mem::take(&mut settings.tags);
				*settings = LogSettings { tags, ..cleared };
			},
			false,
		);
		Ok(())
	}

	/// Emit and drain the withheld messages for `tag`.
	pub fn flush_withheld(&self, tag: Tag) -> Option<WithheldReport> {
		self.filter.flush_withheld(tag)
	}

	pub fn reset_counters(&self) {
		self.filter.reset_counters();
	}

	fn compose(
		&self,
		severity: Severity,
		message: &str,
		tag_name: Option<&str>,
		location: SourceLocation,
	) -> String {
		let flags = severity.display_flags(&self.settings.read().display);
		self.composer
			.compose(message, location.file, severity, location.line, tag_name, flags)
	}

	fn stack_trace(&self) -> Option<String> {
		let mode = self.settings.read().stack_traces;
		capture_stack_trace(mode)
	}
}

impl DiagnosticSink for DiagnosticLogger {
	fn log_at(&self, severity: Severity, message: &str, tag: Option<Tag>, location: SourceLocation) {
		let tag_name = match tag {
			Some(tag) => match self.filter.admit(tag, message) {
				Admission::Withheld => return,
				Admission::Passed => self.registry.name(tag),
			},
			None => None,
		};

		let line = self.compose(severity, message, tag_name.as_deref(), location);
		let (kind, stack_trace) = match severity {
			Severity::Debug => (HostLogKind::Log, self.stack_trace()),
			Severity::Warning => (HostLogKind::Warning, self.stack_trace()),
			Severity::Error => (HostLogKind::Error, None),
		};
		emit(kind, &line, stack_trace.as_deref());
	}

	fn assert_at(&self, condition: bool, message: &str, location: SourceLocation) {
		if condition {
			return;
		}

		let line = self.compose(Severity::Error, message, None, location);
		emit(HostLogKind::Assert, &line, None);

		if self.settings.read().enable_assertion_stop {
			self.assertion_hook.assertion_failed(message, location);
		}
	}

	fn log_exception(&self, error: &(dyn std::error::Error + 'static)) {
		emit_exception(error);
	}
}

/// Hand a composed line to the host sink.
fn emit(kind: HostLogKind, line: &str, stack_trace: Option<&str>) {
	match (kind, stack_trace) {
		(HostLogKind::Log, None) => tracing::info!(target: SIFT_TARGET, "{}", line),
		(HostLogKind::Log, Some(stack_trace)) => {
			tracing::info!(target: SIFT_TARGET, stack_trace, "{}", line)
		}
		(HostLogKind::Warning, None) => tracing::warn!(target: SIFT_TARGET, "{}", line),
		(HostLogKind::Warning, Some(stack_trace)) => {
			tracing::warn!(target: SIFT_TARGET, stack_trace, "{}", line)
		}
		(HostLogKind::Error, _) => tracing::error!(target: SIFT_TARGET, "{}", line),
		(HostLogKind::Assert | HostLogKind::Exception, _) => {
			let kind = kind.as_str();
			tracing::error!(target: SIFT_TARGET, kind, "{}", line)
		}
	}
}

impl std::fmt::Debug for DiagnosticLogger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DiagnosticLogger")
			.field("tags", &self.registry.names())
			.field("filter", &self.filter)
			.field("aggregator", &self.aggregator)
			.finish()
	}
}
