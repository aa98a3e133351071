// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bounded, observable history of host log lines with severity counters.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use sift_ring::RingBuffer;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::layer::AggregatorLayer;
use crate::record::LogRecord;
use crate::severity::{HostLogKind, Severity};

/// Default history capacity.
pub const DEFAULT_CAPACITY: usize = 3000;

/// History capacity on low-memory hosts.
pub const LOW_MEMORY_CAPACITY: usize = 100;

/// Hosts with less system memory than this use [`LOW_MEMORY_CAPACITY`].
pub const LOW_MEMORY_THRESHOLD_MB: u64 = 4000;

/// Size of the subscriber channel; slower receivers observe `Lagged`.
const CHANNEL_CAPACITY: usize = 1024;

/// History capacity suited to a host with `system_memory_mb` of memory.
pub fn default_capacity(system_memory_mb: u64) -> usize {
	if system_memory_mb < LOW_MEMORY_THRESHOLD_MB {
		LOW_MEMORY_CAPACITY
	} else {
		DEFAULT_CAPACITY
	}
}

/// Running counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
	pub error: u64,
	pub warning: u64,
	/// Debug severity lines.
	pub info: u64,
}

impl SeverityCounts {
	fn bump(&mut self, severity: Severity) {
		match severity {
			Severity::Error => self.error += 1,
			Severity::Warning => self.warning += 1,
			Severity::Debug => self.info += 1,
		}
	}
}

/// Notifications published to aggregator subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregatorEvent {
	/// A record was stored; its counter is already updated.
	Received(LogRecord),
	/// The history and all counters were reset.
	Cleared,
}

/// Collects every line the host sink emits.
///
/// Cloning is cheap and every clone shares the same history. Install
/// [`layer`](Self::layer) into the tracing subscriber to start listening; the
/// aggregator listens for as long as that subscriber lives.
#[derive(Clone)]
pub struct LogAggregator {
	inner: Arc<AggregatorInner>,
}

struct AggregatorInner {
	state: Mutex<AggregatorState>,
	sender: broadcast::Sender<AggregatorEvent>,
}

struct AggregatorState {
	records: RingBuffer<LogRecord>,
	counts: SeverityCounts,
	next_sequence: u64,
}

impl LogAggregator {
	/// Create an aggregator retaining up to `capacity` records.
	pub fn new(capacity: usize) -> Result<Self> {
		let records = RingBuffer::new(capacity)?;
		let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
		Ok(Self {
			inner: Arc::new(AggregatorInner {
				state: Mutex::new(AggregatorState {
					records,
					counts: SeverityCounts::default(),
					next_sequence: 1,
				}),
				sender,
			}),
		})
	}

	/// Create an aggregator with [`DEFAULT_CAPACITY`].
	pub fn with_default_capacity() -> Self {
		Self::new(DEFAULT_CAPACITY).expect("default capacity is non-zero")
	}

	/// The tracing layer feeding this aggregator.
	pub fn layer(&self) -> AggregatorLayer {
		AggregatorLayer::new(self.clone())
	}

	/// Store one host line.
	///
	/// Appending, counting and publishing happen under one lock, so
	/// subscribers see records in arrival order. Publishing never blocks.
	pub fn record(
		&self,
		kind: HostLogKind,
		message: impl Into<String>,
		stack_trace: impl Into<String>,
	) -> LogRecord {
		let mut state = self.inner.state.lock();
		let record = LogRecord::new(state.next_sequence, kind, message, stack_trace);
		state.next_sequence += 1;

		state.records.add(record.clone());
		state.counts.bump(record.severity);

		// No subscribers is not an error.
		let _ = self
			.inner
			.sender
			.send(AggregatorEvent::Received(record.clone()));

		record
	}

	/// Empty the history and zero every counter, then publish `Cleared`.
	///
	/// Emits no tracing event of its own: with the layer installed it would
	/// land in the freshly cleared history.
	pub fn clear(&self) {
		let mut state = self.inner.state.lock();
		state.records.clear();
		state.counts = SeverityCounts::default();
		let _ = self.inner.sender.send(AggregatorEvent::Cleared);
	}

	/// Host low-resource signal.
	pub fn on_low_memory(&self) {
		self.clear();
	}

	/// Subscribe to records and clear notifications.
	pub fn subscribe(&self) -> broadcast::Receiver<AggregatorEvent> {
		self.inner.sender.subscribe()
	}

	pub fn counts(&self) -> SeverityCounts {
		self.inner.state.lock().counts
	}

	pub fn error_count(&self) -> u64 {
		self.counts().error
	}

	pub fn warning_count(&self) -> u64 {
		self.counts().warning
	}

	pub fn info_count(&self) -> u64 {
		self.counts().info
	}

	/// Number of records currently retained.
	pub fn all_log_count(&self) -> usize {
		self.inner.state.lock().records.len()
	}

	pub fn capacity(&self) -> usize {
		self.inner.state.lock().records.capacity()
	}

	/// Snapshot of the retained records, oldest first.
	pub fn records(&self) -> Vec<LogRecord> {
		self.inner.state.lock().records.snapshot()
	}

	/// Up to `limit` of the newest records matching `severity`, oldest first.
	pub fn recent(&self, limit: usize, severity: Option<Severity>) -> Vec<LogRecord> {
		let snapshot = self.records();
		let mut recent: Vec<LogRecord> = Vec::with_capacity(limit.min(snapshot.len()));
		for record in snapshot.into_iter().rev() {
			if recent.len() >= limit {
				break;
			}
			if severity.is_none() || severity == Some(record.severity) {
				recent.push(record);
			}
		}
		recent.reverse();
		recent
	}
}

impl Default for LogAggregator {
	fn default() -> Self {
		Self::with_default_capacity()
	}
}

impl std::fmt::Debug for LogAggregator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LogAggregator")
			.field("counts", &self.counts())
			.field("all_log_count", &self.all_log_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::sync::broadcast::error::TryRecvError;

	#[test]
	fn test_zero_capacity_rejected() {
		assert!(LogAggregator::new(0).is_err());
	}

	#[test]
	fn test_counts_by_severity() {
		let aggregator = LogAggregator::new(10).unwrap();

		aggregator.record(HostLogKind::Log, "a", "");
		aggregator.record(HostLogKind::Warning, "b", "");
		aggregator.record(HostLogKind::Error, "c", "");
		aggregator.record(HostLogKind::Assert, "d", "");
		aggregator.record(HostLogKind::Exception, "e", "trace");

		assert_eq!(
			aggregator.counts(),
			SeverityCounts {
				error: 3,
				warning: 1,
				info: 1
			}
		);
		assert_eq!(aggregator.all_log_count(), 5);
	}

	#[test]
	fn test_clear_resets_and_notifies_once() {
		let aggregator = LogAggregator::new(10).unwrap();
		let mut rx = aggregator.subscribe();

		for i in 0..5 {
			aggregator.record(HostLogKind::Warning, format!("warning {i}"), "");
		}
		aggregator.clear();

		assert_eq!(aggregator.warning_count(), 0);
		assert_eq!(aggregator.all_log_count(), 0);

		let mut cleared = 0;
		loop {
			match rx.try_recv() {
				Ok(AggregatorEvent::Cleared) => cleared += 1,
				Ok(AggregatorEvent::Received(_)) => {}
				Err(TryRecvError::Empty) => break,
				Err(e) => panic!("unexpected receive error: {e}"),
			}
		}
		assert_eq!(cleared, 1);
	}

	#[test]
	fn test_eviction_keeps_counters() {
		let aggregator = LogAggregator::new(2).unwrap();
		for i in 0..4 {
			aggregator.record(HostLogKind::Log, format!("msg {i}"), "");
		}

		assert_eq!(aggregator.all_log_count(), 2);
		assert_eq!(aggregator.info_count(), 4);
		let messages: Vec<_> = aggregator.records().into_iter().map(|r| r.message).collect();
		assert_eq!(messages, vec!["msg 2", "msg 3"]);
	}

	#[test]
	fn test_subscribers_see_arrival_order() {
		let aggregator = LogAggregator::new(100).unwrap();
		let mut rx = aggregator.subscribe();

		for i in 0..10 {
			aggregator.record(HostLogKind::Log, format!("{i}"), "");
		}

		for expected in 1..=10 {
			match rx.try_recv().unwrap() {
				AggregatorEvent::Received(record) => assert_eq!(record.sequence, expected),
				AggregatorEvent::Cleared => panic!("unexpected clear"),
			}
		}
	}

	#[test]
	fn test_low_memory_clears() {
		let aggregator = LogAggregator::new(10).unwrap();
		aggregator.record(HostLogKind::Error, "boom", "");
		aggregator.on_low_memory();

		assert_eq!(aggregator.error_count(), 0);
		assert!(aggregator.records().is_empty());
	}

	#[test]
	fn test_recent_filters_newest() {
		let aggregator = LogAggregator::new(10).unwrap();
		aggregator.record(HostLogKind::Warning, "w1", "");
		aggregator.record(HostLogKind::Log, "d1", "");
		aggregator.record(HostLogKind::Warning, "w2", "");
		aggregator.record(HostLogKind::Warning, "w3", "");

		let recent: Vec<_> = aggregator
			.recent(2, Some(Severity::Warning))
			.into_iter()
			.map(|r| r.message)
			.collect();
		assert_eq!(recent, vec!["w2", "w3"]);
		assert_eq!(aggregator.recent(10, None).len(), 4);
	}

	#[test]
	fn test_default_capacity_rule() {
		assert_eq!(default_capacity(2048), LOW_MEMORY_CAPACITY);
		assert_eq!(default_capacity(16_384), DEFAULT_CAPACITY);
		assert_eq!(LogAggregator::default().capacity(), DEFAULT_CAPACITY);
	}

	#[test]
	fn test_concurrent_producers() {
		let aggregator = LogAggregator::new(10_000).unwrap();
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let aggregator = aggregator.clone();
				std::thread::spawn(move || {
					for i in 0..250 {
						aggregator.record(HostLogKind::Warning, format!("{i}"), "");
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		assert_eq!(aggregator.warning_count(), 1000);
		let sequences: Vec<u64> = aggregator.records().iter().map(|r| r.sequence).collect();
		assert_eq!(sequences, (1..=1000).collect::<Vec<_>>());
	}

	#[tokio::test]
	async fn test_broadcast_subscription() {
		let aggregator = LogAggregator::new(100).unwrap();
		let mut rx = aggregator.subscribe();

		aggregator.record(HostLogKind::Log, "broadcast test", "");

		match rx.recv().await.unwrap() {
			AggregatorEvent::Received(record) => assert_eq!(record.message, "broadcast test"),
			AggregatorEvent::Cleared => panic!("unexpected clear"),
		}
	}
}
