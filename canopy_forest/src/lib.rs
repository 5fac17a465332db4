// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_forest --heading-base-level=0

//! Canopy Forest: assets and locations as a parent-linked forest.
//!
//! The data layer hands out two flat lists per company: assets and locations.
//! This crate turns them into a forest (a set of independent rooted trees)
//! that the traversal and view crates can walk lazily.
//!
//! - [`Entity`], [`Asset`], [`Location`]: the flat records. An entity's parent
//!   key is the location's own parent, else the asset's parent, else the
//!   asset's owning location ([`Entity::parent_key`]).
//! - [`Forest`]: arena of [`Node`]s addressed by [`NodeIdx`], built with
//!   [`Forest::build`]. Records whose parent cannot be resolved become roots.
//!   Records caught in a parent cycle are promoted to roots as well, so every
//!   record appears exactly once.
//! - [`ForestCache`]: built forests keyed by [`CompanyId`], rebuilt when the
//!   input lists change, and [`CompanyDataSource`], the contract for
//!   fetching those lists.
//!
//! ## Example
//!
//! ```rust
//! use canopy_forest::{Asset, BuildOptions, Forest, Location};
//!
//! let locations = vec![
//!     Location::new("plant", "Production plant"),
//!     Location::new("line", "Line 1").with_parent("plant"),
//! ];
//! let assets = vec![
//!     Asset::new("motor", "Motor H12D").with_location("line"),
//!     Asset::new("sensor", "Vibration sensor").with_parent("motor"),
//! ];
//!
//! let forest = Forest::build(assets, locations, BuildOptions::default()).unwrap();
//! assert_eq!(forest.len(), 4);
//! assert_eq!(forest.roots().len(), 1);
//!
//! let sensor = forest.find("sensor").unwrap();
//! assert_eq!(forest.depth_of(sensor), 3);
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for the records, matching the
//!   camelCase JSON served by the upstream API.

mod cache;
mod entity;
mod error;
mod forest;

pub use cache::{CompanyDataSource, ForestCache};
pub use entity::{Asset, CompanyId, Entity, Location};
pub use error::{BuildError, Result};
pub use forest::{BuildOptions, BuildStats, Forest, Node, NodeIdx, SiblingOrder};
