// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_tree_view --heading-base-level=0

//! Canopy Tree View: a virtualized, searchable tree view core.
//!
//! This crate turns a [`Forest`](canopy_forest::Forest) into the few rows a
//! fixed-height viewport needs right now. It is renderer-agnostic: it decides
//! which nodes to show, where, and with which flags, and leaves drawing to the
//! host toolkit.
//!
//! - [`TreeView`]: the controller. It owns the scroll position, the collapse
//!   state, the debounced search text and the walker, and realizes the rows of
//!   the current window with [`TreeView::render`].
//! - [`RowViewport`]: maps a scroll offset to a window of rows: the visible
//!   rows plus half as many again as overscan, split around the visible band.
//! - [`Debouncer`]: coalesces typed search text until the user pauses.
//! - [`RenderedRow`] and [`RowFlags`]: what the host draws.
//! - [`TreeViewConfig`]: geometry and timing, validated on construction.
//!
//! Host frameworks are responsible for:
//!
//! - Calling [`TreeView::on_scroll`] and [`TreeView::on_search_input`] from
//!   their event handlers, and [`TreeView::tick`] from a timer.
//! - Sizing a spacer to [`TreeView::spacer_extent`] and placing each row at its
//!   [`RenderedRow::bounds`].
//! - Routing expander clicks to [`TreeView::toggle`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use canopy_forest::{Asset, BuildOptions, Forest, Location};
//! use canopy_tree_view::{TreeView, TreeViewConfig};
//!
//! let forest = Forest::build(
//!     vec![Asset::new("m1", "Motor").with_location("l1")],
//!     vec![Location::new("l1", "Line 1")],
//!     BuildOptions::default(),
//! )
//! .unwrap();
//!
//! let config = TreeViewConfig::default().with_viewport_height(240.0);
//! let mut view = TreeView::new(Arc::new(forest), config).unwrap();
//!
//! view.on_search_input("mot", 0);
//! assert!(view.tick(config.search_debounce_ms));
//!
//! let rows = view.render();
//! assert_eq!(rows.len(), 1);
//! assert!(rows[0].is_match());
//! ```
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`TreeViewConfig`].

mod config;
mod debounce;
mod row;
mod view;
mod viewport;

pub use config::{ConfigError, TreeViewConfig};
pub use debounce::Debouncer;
pub use row::{RenderedRow, RowFlags};
pub use view::TreeView;
pub use viewport::{RowViewport, RowWindow};
