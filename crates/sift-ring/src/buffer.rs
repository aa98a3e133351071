// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Thread-safe circular buffer with overwrite-oldest semantics.

use parking_lot::Mutex;

use crate::error::{Result, RingBufferError};

/// A fixed-capacity circular buffer.
///
/// Logical index 0 is always the oldest live element and `len() - 1` the
/// newest. Once the buffer is full every [`add`](Self::add) evicts exactly
/// one element, the oldest.
///
/// All operations take the same per-instance lock. Reads that hand elements
/// to caller code (iteration and scans) copy a snapshot under the lock and
/// release it before any callback runs, so a callback may safely call back
/// into the buffer.
pub struct RingBuffer<T> {
	inner: Mutex<Slots<T>>,
	capacity: usize,
}

struct Slots<T> {
	/// Physical storage, `None` for never-written or cleared slots.
	items: Vec<Option<T>>,
	/// Next physical write position.
	head: usize,
	/// Number of live elements.
	count: usize,
}

impl<T> Slots<T> {
	fn physical(&self, index: usize, capacity: usize) -> usize {
		(self.head + capacity - self.count + index) % capacity
	}
}

impl<T> RingBuffer<T> {
	/// Create a buffer holding at most `capacity` elements.
	///
	/// Fails with [`RingBufferError::InvalidConfiguration`] when `capacity`
	/// is zero.
	pub fn new(capacity: usize) -> Result<Self> {
		if capacity == 0 {
			return Err(RingBufferError::InvalidConfiguration(
				"capacity must be greater than 0".to_string(),
			));
		}

		let mut items = Vec::with_capacity(capacity);
		items.resize_with(capacity, || None);

		Ok(Self {
			inner: Mutex::new(Slots {
				items,
				head: 0,
				count: 0,
			}),
			capacity,
		})
	}

	/// Maximum number of elements.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Current number of live elements.
	pub fn len(&self) -> usize {
		self.inner.lock().count
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Append an element, evicting the oldest when full.
	pub fn add(&self, item: T) {
		let mut slots = self.inner.lock();
		let head = slots.head;
		slots.items[head] = Some(item);
		slots.head = (head + 1) % self.capacity;
		if slots.count < self.capacity {
			slots.count += 1;
		}
	}

	/// Remove every element and rewind the write cursor.
	pub fn clear(&self) {
		let mut slots = self.inner.lock();
		slots.items.iter_mut().for_each(|slot| *slot = None);
		slots.head = 0;
		slots.count = 0;
	}
}

impl<T: Clone> RingBuffer<T> {
	/// Element at logical `index`, 0 being the oldest.
	pub fn get(&self, index: usize) -> Result<T> {
		let slots = self.inner.lock();
		if index >= slots.count {
			return Err(RingBufferError::IndexOutOfRange {
				index,
				count: slots.count,
			});
		}

		let physical = slots.physical(index, self.capacity);
		slots.items[physical]
			.clone()
			.ok_or(RingBufferError::IndexOutOfRange {
				index,
				count: slots.count,
			})
	}

	/// Most recently added element, if any.
	pub fn newest(&self) -> Option<T> {
		let slots = self.inner.lock();
		if slots.count == 0 {
			return None;
		}
		let physical = slots.physical(slots.count - 1, self.capacity);
		slots.items[physical].clone()
	}

	/// Point-in-time copy of the live elements, oldest first.
	pub fn snapshot(&self) -> Vec<T> {
		let slots = self.inner.lock();
		(0..slots.count)
			.filter_map(|i| slots.items[slots.physical(i, self.capacity)].clone())
			.collect()
	}

	/// Iterate over a fresh snapshot, oldest first.
	///
	/// Each call takes a new snapshot, so the sequence is restartable and
	/// unaffected by writes that happen while it is consumed.
	pub fn iter(&self) -> std::vec::IntoIter<T> {
		self.snapshot().into_iter()
	}

	/// Visit, oldest first, every element matching `predicate`.
	///
	/// `visit` receives the element and its position among the matches.
	/// Returns the number of visited elements.
	pub fn scan_forward<P, V>(&self, mut predicate: P, mut visit: V) -> usize
	where
		P: FnMut(&T) -> bool,
		V: FnMut(&T, usize),
	{
		let mut matched = 0;
		for item in self.snapshot().iter().filter(|item| predicate(item)) {
			visit(item, matched);
			matched += 1;
		}
		matched
	}

	/// Walk newest to oldest until `predicate` returns `false`.
	///
	/// `predicate` receives the element and the number of elements accepted
	/// so far. Returns that number.
	pub fn scan_backward<P>(&self, mut predicate: P) -> usize
	where
		P: FnMut(&T, usize) -> bool,
	{
		let mut accepted = 0;
		for item in self.snapshot().iter().rev() {
			if !predicate(item, accepted) {
				break;
			}
			accepted += 1;
		}
		accepted
	}
}

impl<T: Clone> IntoIterator for &RingBuffer<T> {
	type Item = T;
	type IntoIter = std::vec::IntoIter<T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<T> std::fmt::Debug for RingBuffer<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RingBuffer")
			.field("capacity", &self.capacity)
			.field("len", &self.len())
			.finish()
	}
}
