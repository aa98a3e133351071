// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bitmask sets of tags.

use std::ops::{BitAnd, BitOr, BitXor};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TagError};
use crate::registry::{Tag, TagRegistry};

/// Largest valid mask value for a universe of `tag_count` tags.
///
/// Equal to `2^(tag_count + 1) - 1`; bit 0 is included even though no tag
/// maps to it.
pub fn all_tags_value(tag_count: usize) -> u64 {
	let shift = tag_count as u32 + 1;
	1u64.checked_shl(shift).map_or(u64::MAX, |bit| bit - 1)
}

/// An immutable set of tags stored as a single integer.
///
/// Set operations between two in-range masks always stay in range, so only
/// the raw constructors and [`complement`](Self::complement) need the
/// registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMask(u64);

impl TagMask {
	/// The empty mask.
	pub const fn none() -> Self {
		Self(0)
	}

	/// Every currently declared tag.
	pub fn all(registry: &TagRegistry) -> Self {
		Self(all_tags_value(registry.len()))
	}

	pub fn from_tag(tag: Tag) -> Self {
		Self(tag.bit())
	}

	pub fn from_tags<I>(tags: I) -> Self
	where
		I: IntoIterator<Item = Tag>,
	{
		Self(tags.into_iter().fold(0, |acc, tag| acc | tag.bit()))
	}

	/// Build a mask from a raw value, clipping bits beyond the declared tags.
	///
	/// An out-of-range value is not an error: the excess bits are dropped and
	/// a diagnostic is logged. Use [`try_from_raw`](Self::try_from_raw) to
	/// reject such values instead.
	pub fn from_raw(value: u64, registry: &TagRegistry) -> Self {
		let max = all_tags_value(registry.len());
		if value > max {
			tracing::error!(
				value,
				max,
				tag_count = registry.len(),
				"mask value is too large; clipping to declared tags"
			);
			return Self(value & max);
		}
		Self(value)
	}

	/// Build a mask from a raw value, failing on bits beyond the declared tags.
	pub fn try_from_raw(value: u64, registry: &TagRegistry) -> Result<Self> {
		let max = all_tags_value(registry.len());
		if value > max {
			return Err(TagError::InvalidMask { value, max });
		}
		Ok(Self(value))
	}

	/// Raw integer value, suitable for persisting.
	pub const fn value(self) -> u64 {
		self.0
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub fn contains(self, tag: Tag) -> bool {
		self.0 & tag.bit() != 0
	}

	/// Whether the masks share at least one tag.
	pub fn contains_any(self, other: Self) -> bool {
		self.0 & other.0 != 0
	}

	/// Whether every tag of `other` is in this mask.
	pub fn contains_all(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn union(self, other: Self) -> Self {
		Self(self.0 | other.0)
	}

	pub fn intersect(self, other: Self) -> Self {
		Self(self.0 & other.0)
	}

	pub fn symmetric_difference(self, other: Self) -> Self {
		Self(self.0 ^ other.0)
	}

	/// Every declared tag not in this mask; never sets bits above the valid range.
	pub fn complement(self, registry: &TagRegistry) -> Self {
		Self(!self.0 & all_tags_value(registry.len()))
	}

	/// Copy of this mask with `tag` added.
	pub fn with(self, tag: Tag) -> Self {
		Self(self.0 | tag.bit())
	}

	/// Copy of this mask with `tag` removed.
	pub fn without(self, tag: Tag) -> Self {
		Self(self.0 & !tag.bit())
	}

	/// Declared tags contained in this mask, by ascending ordinal.
	pub fn tags(self, registry: &TagRegistry) -> Vec<Tag> {
		registry
			.tags()
			.into_iter()
			.filter(|tag| self.contains(*tag))
			.collect()
	}

	/// Human readable label: `"None"` or the comma separated tag names.
	pub fn label(self, registry: &TagRegistry) -> String {
		let names: Vec<String> = self
			.tags(registry)
			.into_iter()
			.filter_map(|tag| registry.name(tag))
			.collect();

		if names.is_empty() {
			"None".to_string()
		} else {
			names.join(", ")
		}
	}
}

impl From<Tag> for TagMask {
	fn from(tag: Tag) -> Self {
		Self::from_tag(tag)
	}
}

impl FromIterator<Tag> for TagMask {
	fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
		Self::from_tags(iter)
	}
}

impl BitOr for TagMask {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		self.union(rhs)
	}
}

impl BitAnd for TagMask {
	type Output = Self;

	fn bitand(self, rhs: Self) -> Self {
		self.intersect(rhs)
	}
}

impl BitXor for TagMask {
	type Output = Self;

	fn bitxor(self, rhs: Self) -> Self {
		self.symmetric_difference(rhs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::MAX_TAGS;
	use proptest::prelude::*;

	fn abc() -> (TagRegistry, Tag, Tag, Tag) {
		let registry = TagRegistry::from_names(["A", "B", "C"]).unwrap();
		let a = registry.get("A").unwrap();
		let b = registry.get("B").unwrap();
		let c = registry.get("C").unwrap();
		(registry, a, b, c)
	}

	#[test]
	fn test_membership_and_label() {
		let (registry, a, b, c) = abc();
		let mask = TagMask::from_tags([a, c]);

		assert!(!mask.contains(b));
		assert!(mask.contains(a));
		assert_eq!(mask.label(&registry), "A, C");
		assert_eq!(mask.tags(&registry), vec![a, c]);
	}

	#[test]
	fn test_empty_label_is_none() {
		let (registry, ..) = abc();
		assert_eq!(TagMask::none().label(&registry), "None");
	}

	#[test]
	fn test_all_tags_value() {
		assert_eq!(all_tags_value(0), 0b1);
		assert_eq!(all_tags_value(3), 0b1111);
		assert_eq!(all_tags_value(MAX_TAGS), i64::MAX as u64);
		assert_eq!(all_tags_value(63), u64::MAX);
	}

	#[test]
	fn test_all_tracks_registry_growth() {
		let (registry, ..) = abc();
		let before = TagMask::all(&registry);
		let d = registry.register("D").unwrap();
		let after = TagMask::all(&registry);

		assert!(!before.contains(d));
		assert!(after.contains(d));
	}

	#[test]
	fn test_from_raw_clips() {
		let (registry, a, ..) = abc();
		let mask = TagMask::from_raw(0xFF, &registry);

		assert_eq!(mask.value(), 0b1111);
		assert!(mask.contains(a));
	}

	#[test]
	fn test_try_from_raw_rejects() {
		let (registry, ..) = abc();

		assert_eq!(
			TagMask::try_from_raw(0x10, &registry),
			Err(TagError::InvalidMask {
				value: 0x10,
				max: 0b1111
			})
		);
		assert_eq!(TagMask::try_from_raw(0b0110, &registry).unwrap().value(), 0b0110);
	}

	#[test]
	fn test_complement_is_bounded() {
		let (registry, a, b, c) = abc();
		let complement = TagMask::from_tag(a).complement(&registry);

		assert!(complement.contains(b));
		assert!(complement.contains(c));
		assert!(!complement.contains(a));
		assert!(complement.value() <= all_tags_value(registry.len()));
	}

	#[test]
	fn test_operators() {
		let (_, a, b, c) = abc();
		let ab = TagMask::from_tags([a, b]);
		let bc = TagMask::from_tags([b, c]);

		assert_eq!(ab | bc, TagMask::from_tags([a, b, c]));
		assert_eq!(ab & bc, TagMask::from_tag(b));
		assert_eq!(ab ^ bc, TagMask::from_tags([a, c]));
		assert_eq!(ab.without(a).with(c), bc);
	}

	#[test]
	fn test_serializes_as_integer() {
		let (_, a, _, c) = abc();
		let mask: TagMask = [a, c].into_iter().collect();

		let json = serde_json::to_string(&mask).unwrap();
		assert_eq!(json, "10");
		let back: TagMask = serde_json::from_str(&json).unwrap();
		assert_eq!(back, mask);
	}

	fn mask_strategy() -> impl Strategy<Value = TagMask> {
		(0u64..=0b1111_1111_1110).prop_map(TagMask)
	}

	proptest! {
		#[test]
		fn union_contains_both(m1 in mask_strategy(), m2 in mask_strategy()) {
			let union = m1.union(m2);
			prop_assert!(union.contains_all(m1));
			prop_assert!(union.contains_all(m2));
		}

		#[test]
		fn intersect_nonempty_iff_shared(m1 in mask_strategy(), m2 in mask_strategy()) {
			let shared = m1.value() & m2.value() != 0;
			prop_assert_eq!(m1.intersect(m2).contains_any(m1), shared);
		}

		#[test]
		fn complement_twice_is_identity(raw in 0u64..=0b1111) {
			let (registry, ..) = abc();
			let mask = TagMask::from_raw(raw, &registry);
			prop_assert_eq!(mask.complement(&registry).complement(&registry), mask);
		}
	}
}
