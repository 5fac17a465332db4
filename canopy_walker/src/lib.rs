// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_walker --heading-base-level=0

//! Canopy Walker: lazy, resumable flattening of a Canopy forest.
//!
//! A view over a large forest only needs the handful of rows that fit on
//! screen. This crate produces those rows on demand instead of flattening the
//! whole forest up front.
//!
//! - [`TreeWalker`]: pre-order walk over an explicit stack. Each step emits one
//!   [`FlatEntry`] (node, depth, row) and appends it to an append-only flat
//!   index, so asking for more rows later continues where the walk stopped.
//! - [`CollapsedSet`]: the nodes a user closed and the descendants they hide.
//!   A walker does not descend below closed or hidden nodes.
//! - [`SearchIndex`]: token index over labels, filled as the walker emits
//!   nodes. [`TreeWalker::search`] ranks matches and lists each match's
//!   visible subtree right after it.
//!
//! A walker is tied to one forest and one collapse state. When either changes,
//! build a new walker; the old flat index is no longer valid.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use canopy_forest::{BuildOptions, Forest, Location};
//! use canopy_walker::{CollapsedSet, TreeWalker};
//!
//! let forest = Arc::new(
//!     Forest::build(
//!         Vec::new(),
//!         vec![
//!             Location::new("a", "Alpha plant"),
//!             Location::new("b", "Boiler").with_parent("a"),
//!             Location::new("c", "Cooling tower").with_parent("a"),
//!         ],
//!         BuildOptions::default(),
//!     )
//!     .unwrap(),
//! );
//!
//! let mut walker = TreeWalker::new(forest.clone(), CollapsedSet::new());
//! assert_eq!(walker.ensure_rows(1), 1);
//!
//! // Only `a` has been walked, yet its children come along with the match.
//! let page = walker.search("alpha", 3, 0);
//! let ids: Vec<_> = page.rows.iter().map(|r| forest.id(r.node)).collect();
//! assert_eq!(ids, ["a", "b", "c"]);
//! assert_eq!(page.hits, 1);
//! ```

mod collapsed;
mod search;
mod walker;

pub use collapsed::CollapsedSet;
pub use search::{IndexedNode, SearchIndex};
pub use walker::{FlatEntry, SearchPage, SearchRow, TreeWalker, WalkState};
