// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Ordered registry of declared tag names.

use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TagError};

/// Largest number of tags a registry accepts.
///
/// Ordinals run from 1 to `MAX_TAGS`. Bit 63 stays clear so every mask is
/// also a non-negative `i64`, the integer type TOML persists.
pub const MAX_TAGS: usize = 62;

/// A declared tag, identified by its 1-based ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(u32);

impl Tag {
	/// Build a tag from a raw ordinal without checking the registry.
	pub const fn from_ordinal(ordinal: u32) -> Self {
		Self(ordinal)
	}

	pub const fn ordinal(self) -> u32 {
		self.0
	}

	/// The single mask bit for this tag.
	///
	/// An ordinal above [`MAX_TAGS`] contributes no bit.
	pub fn bit(self) -> u64 {
		match 1u64.checked_shl(self.0) {
			Some(bit) if self.0 as usize <= MAX_TAGS => bit,
			_ => {
				tracing::error!(
					ordinal = self.0,
					"tag ordinal is outside the mask width; too many tags may be declared"
				);
				0
			}
		}
	}
}

impl fmt::Display for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// The tag universe: an append-only list of names mapped to ordinals 1..=N.
///
/// Tags can be appended at any time during the process lifetime; masks read
/// the live size on demand rather than caching it.
#[derive(Debug, Default)]
pub struct TagRegistry {
	names: RwLock<Vec<String>>,
}

impl TagRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a registry declaring `names` in order.
	pub fn from_names<I, S>(names: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let registry = Self::new();
		for name in names {
			registry.register(name)?;
		}
		Ok(registry)
	}

	/// Append a tag and return it.
	pub fn register(&self, name: impl Into<String>) -> Result<Tag> {
		let name = name.into().trim().to_string();
		if name.is_empty() {
			return Err(TagError::EmptyName);
		}

		let mut names = self.names.write();
		if names.iter().any(|existing| *existing == name) {
			return Err(TagError::DuplicateTag(name));
		}
		if names.len() >= MAX_TAGS {
			return Err(TagError::TooManyTags { max: MAX_TAGS });
		}

		names.push(name);
		let tag = Tag(names.len() as u32);
		tracing::debug!(ordinal = tag.0, "registered tag");
		Ok(tag)
	}

	/// Look up a tag by name.
	pub fn get(&self, name: &str) -> Option<Tag> {
		self.names
			.read()
			.iter()
			.position(|existing| existing == name)
			.map(|i| Tag(i as u32 + 1))
	}

	/// Name of a declared tag.
	pub fn name(&self, tag: Tag) -> Option<String> {
		let index = (tag.0 as usize).checked_sub(1)?;
		self.names.read().get(index).cloned()
	}

	/// Number of declared tags.
	pub fn len(&self) -> usize {
		self.names.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, tag: Tag) -> bool {
		tag.0 >= 1 && (tag.0 as usize) <= self.len()
	}

	/// All declared tags in ordinal order.
	pub fn tags(&self) -> Vec<Tag> {
		(1..=self.len() as u32).map(Tag).collect()
	}

	/// All declared names in ordinal order.
	pub fn names(&self) -> Vec<String> {
		self.names.read().clone()
	}
}
