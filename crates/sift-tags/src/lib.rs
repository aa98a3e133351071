// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Tag universe and tag sets for Sift.
//!
//! This crate provides:
//! - [`TagRegistry`] - the ordered, append-only list of declared tag names
//! - [`Tag`] - a single declared tag, identified by its ordinal
//! - [`TagMask`] - an immutable bitset over the registry's tags
//!
//! Ordinals start at 1, so bit 0 of a mask is never set by a real tag. This
//! keeps raw mask values compatible with previously persisted settings.
//!
//! # Example
//!
//! ```
//! use sift_tags::{TagMask, TagRegistry};
//!
//! let registry = TagRegistry::from_names(["Network", "Physics", "Audio"]).unwrap();
//! let network = registry.get("Network").unwrap();
//! let audio = registry.get("Audio").unwrap();
//!
//! let mask = TagMask::from_tags([network, audio]);
//! assert_eq!(mask.label(&registry), "Network, Audio");
//! ```

mod error;
mod mask;
mod registry;

pub use error::{Result, TagError};
pub use mask::{all_tags_value, TagMask};
pub use registry::{Tag, TagRegistry, MAX_TAGS};
