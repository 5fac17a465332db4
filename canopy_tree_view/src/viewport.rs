// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll state and the row window it selects.

/// Rows a [`RowViewport`] asks to be realized.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowWindow {
    /// Row the scroll offset maps to.
    pub start: usize,
    /// First row to realize: `start` less half the overscan.
    pub first: usize,
    /// Number of rows to realize: visible rows plus overscan.
    pub size: usize,
    /// Height of the spacer that stands in for every row.
    pub content_extent: f64,
}

impl RowWindow {
    /// Returns `true` if no row should be realized.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Fixed-height row strip with scroll state.
///
/// The viewport maps a pixel scroll offset onto a row index using the total
/// row count it was given. Rows hidden by collapsed ancestors still count
/// towards that total, so after collapsing a large subtree the mapping is an
/// estimate and the spacer is taller than the visible content.
///
/// The window is cached and only recomputed after one of its inputs changes.
///
/// ```rust
/// use canopy_tree_view::RowViewport;
///
/// // 100 rows of 20px in a 200px viewport: 10 visible, 5 overscan.
/// let mut viewport = RowViewport::new(20.0, 200.0, 100);
/// assert_eq!(viewport.visible_rows(), 10);
/// assert_eq!(viewport.window_size(), 15);
///
/// viewport.set_scroll_offset(400.0);
/// let window = viewport.window();
/// assert_eq!(window.start, 20);
/// assert_eq!(window.first, 18);
/// assert_eq!(window.content_extent, 2000.0);
/// ```
#[derive(Debug)]
pub struct RowViewport {
    row_height: f64,
    viewport_height: f64,
    total_rows: usize,
    scroll_offset: f64,

    dirty: bool,
    last_window: RowWindow,
}

impl RowViewport {
    /// Creates a viewport scrolled to the top.
    ///
    /// Negative or non-finite lengths are treated as zero.
    #[must_use]
    pub fn new(row_height: f64, viewport_height: f64, total_rows: usize) -> Self {
        Self {
            row_height: non_negative(row_height),
            viewport_height: non_negative(viewport_height),
            total_rows,
            scroll_offset: 0.0,
            dirty: true,
            last_window: RowWindow::default(),
        }
    }

    /// Height of one row.
    #[must_use]
    pub const fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Height of the viewport.
    #[must_use]
    pub const fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Sets the viewport height.
    pub fn set_viewport_height(&mut self, height: f64) {
        let height = non_negative(height);
        if height != self.viewport_height {
            self.viewport_height = height;
            self.dirty = true;
        }
    }

    /// Row count used for the scroll mapping and the spacer.
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Sets the row count used for the scroll mapping and the spacer.
    pub fn set_total_rows(&mut self, total: usize) {
        if total != self.total_rows {
            self.total_rows = total;
            self.dirty = true;
        }
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Sets the scroll offset. Negative values clamp to zero.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        let offset = non_negative(offset);
        if offset != self.scroll_offset {
            self.scroll_offset = offset;
            self.dirty = true;
        }
    }

    /// Number of whole rows that fit in the viewport.
    #[must_use]
    pub fn visible_rows(&self) -> usize {
        if self.row_height <= 0.0 {
            return 0;
        }
        to_index(self.viewport_height / self.row_height)
    }

    /// Extra rows realized around the visible band: half the visible rows.
    #[must_use]
    pub fn overscan(&self) -> usize {
        self.visible_rows() / 2
    }

    /// Number of rows to realize.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.visible_rows() + self.overscan()
    }

    /// Height of the spacer: every row, hidden or not.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.row_height * self.total_rows as f64
    }

    /// Row the current scroll offset maps to.
    #[must_use]
    pub fn start_index(&self) -> usize {
        let content = self.content_extent();
        if self.total_rows == 0 || content <= 0.0 {
            return 0;
        }
        let fraction = self.scroll_offset / content;
        let start = to_index(fraction * self.total_rows as f64);
        start.min(self.total_rows - 1)
    }

    /// First row of the window.
    #[must_use]
    pub fn first_row(&self) -> usize {
        self.start_index().saturating_sub(self.overscan() / 2)
    }

    /// Computes or returns the cached window.
    #[must_use]
    pub fn window(&mut self) -> RowWindow {
        if self.dirty {
            self.last_window = if self.total_rows == 0 {
                RowWindow::default()
            } else {
                RowWindow {
                    start: self.start_index(),
                    first: self.first_row(),
                    size: self.window_size(),
                    content_extent: self.content_extent(),
                }
            };
            self.dirty = false;
        }
        self.last_window
    }

    /// Top edge of `row` in content coordinates.
    #[must_use]
    pub fn offset_of(&self, row: usize) -> f64 {
        row as f64 * self.row_height
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Callers pass non-negative row counts; `as` saturates on overflow."
)]
fn to_index(rows: f64) -> usize {
    rows.floor() as usize
}
