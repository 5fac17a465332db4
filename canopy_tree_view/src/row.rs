// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rows handed to the host for drawing.

use canopy_forest::NodeIdx;
use kurbo::Rect;

bitflags::bitflags! {
    /// Per-row state the host needs to pick a presentation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RowFlags: u8 {
        /// The node has children (draw an expander).
        const HAS_CHILDREN = 0b0000_0001;
        /// The node was closed by the user.
        const CLOSED       = 0b0000_0010;
        /// The node matched the active search directly.
        const MATCHED      = 0b0000_0100;
    }
}

/// One realized row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedRow {
    /// The node shown in this row.
    pub node: NodeIdx,
    /// Depth of the node; roots are at depth 0.
    pub depth: u32,
    /// Logical row: position in the flat index, or in the search results.
    pub row: usize,
    /// Row rectangle in content coordinates: `row * row_height` from the top
    /// of the spacer, inset by `depth * indent`.
    pub bounds: Rect,
    /// Presentation flags.
    pub flags: RowFlags,
}

impl RenderedRow {
    /// Returns `true` if the node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.flags.contains(RowFlags::HAS_CHILDREN)
    }

    /// Returns `true` if the node is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.flags.contains(RowFlags::CLOSED)
    }

    /// Returns `true` if the node matched the active search.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.flags.contains(RowFlags::MATCHED)
    }
}
