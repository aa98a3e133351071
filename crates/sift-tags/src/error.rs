// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the tag registry and masks.

use thiserror::Error;

/// Errors raised while declaring tags or building masks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
	/// Tag names must contain at least one non-whitespace character.
	#[error("tag name must not be empty")]
	EmptyName,

	/// A tag with this name is already declared.
	#[error("tag '{0}' is already registered")]
	DuplicateTag(String),

	/// The registry cannot hold more tags than the mask width allows.
	#[error("cannot register more than {max} tags")]
	TooManyTags { max: usize },

	/// A raw mask value has bits beyond the declared tags.
	#[error("mask value {value} exceeds the maximum {max} for the declared tags")]
	InvalidMask { value: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, TagError>;
