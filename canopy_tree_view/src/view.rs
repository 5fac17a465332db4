// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view controller: scroll, collapse and search state driving the walker.

use std::sync::Arc;

use canopy_forest::{Forest, NodeIdx};
use canopy_walker::{CollapsedSet, TreeWalker};
use kurbo::Rect;
use tracing::{debug, trace, warn};

use crate::config::{ConfigError, TreeViewConfig};
use crate::debounce::Debouncer;
use crate::row::{RenderedRow, RowFlags};
use crate::viewport::RowViewport;

/// A virtualized, searchable view over one forest.
///
/// `TreeView` owns every piece of mutable state of a tree view: the scroll
/// position, the collapse state, the debounced search text and the walker that
/// flattens the forest. It realizes only the rows in the current window.
///
/// The walker is rebuilt lazily on the next [`render`](Self::render) after the
/// forest or the collapse state changes. Changing the query keeps it, so the
/// label index it has built so far carries over to the next search.
///
/// ```rust
/// use std::sync::Arc;
/// use canopy_forest::{BuildOptions, Forest, Location};
/// use canopy_tree_view::{TreeView, TreeViewConfig};
///
/// let forest = Forest::build(
///     Vec::new(),
///     vec![
///         Location::new("a", "Alpha"),
///         Location::new("b", "Beta").with_parent("a"),
///         Location::new("c", "Gamma").with_parent("a"),
///     ],
///     BuildOptions::default(),
/// )
/// .unwrap();
/// let mut view = TreeView::new(Arc::new(forest), TreeViewConfig::default()).unwrap();
///
/// let rows: Vec<_> = view.render().iter().map(|r| (r.depth, r.row)).collect();
/// assert_eq!(rows, [(0, 0), (1, 1), (1, 2)]);
///
/// assert_eq!(view.toggle_id("a"), Some(true));
/// assert_eq!(view.render().len(), 1);
/// ```
#[derive(Debug)]
pub struct TreeView {
    forest: Arc<Forest>,
    config: TreeViewConfig,
    viewport: RowViewport,
    collapsed: CollapsedSet,
    walker: Option<TreeWalker>,
    search: Debouncer<String>,
    query: Option<String>,
    rows: Vec<RenderedRow>,
}

impl TreeView {
    /// Creates a view over `forest`, scrolled to the top with everything expanded.
    pub fn new(forest: Arc<Forest>, config: TreeViewConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let viewport = RowViewport::new(config.row_height, config.viewport_height, forest.len());
        debug!(nodes = forest.len(), roots = forest.roots().len(), "tree view created");
        Ok(Self {
            forest,
            config,
            viewport,
            collapsed: CollapsedSet::new(),
            walker: None,
            search: Debouncer::new(config.search_debounce_ms),
            query: None,
            rows: Vec::new(),
        })
    }

    /// Shows `forest` instead of the current one.
    ///
    /// Handing back the same forest is a no-op. A different forest resets the
    /// collapse state, since node indices do not carry over between forests.
    pub fn set_forest(&mut self, forest: Arc<Forest>) {
        if Arc::ptr_eq(&self.forest, &forest) {
            return;
        }
        debug!(nodes = forest.len(), "tree view forest replaced");
        self.viewport.set_total_rows(forest.len());
        self.forest = forest;
        self.collapsed.clear();
        self.walker = None;
        self.rows.clear();
    }

    /// Records a new scroll offset.
    pub fn on_scroll(&mut self, offset: f64) {
        self.viewport.set_scroll_offset(offset);
    }

    /// Records a new viewport height.
    pub fn set_viewport_height(&mut self, height: f64) {
        self.config.viewport_height = height;
        self.viewport.set_viewport_height(height);
    }

    /// Opens `node` if it is closed, closes it otherwise. Returns `Some(true)`
    /// if it is now closed.
    ///
    /// Returns `None` and changes nothing if `node` is not a node of the
    /// current forest, such as an index kept from before [`set_forest`](Self::set_forest).
    pub fn toggle(&mut self, node: NodeIdx) -> Option<bool> {
        if self.forest.get(node).is_none() {
            warn!(node = node.index(), "toggle of node outside the forest ignored");
            return None;
        }
        let closed = self.collapsed.toggle(&self.forest, node);
        debug!(node = self.forest.id(node), closed, "toggled");
        self.walker = None;
        Some(closed)
    }

    /// Like [`toggle`](Self::toggle), addressing the node by record id.
    ///
    /// Returns `None` if no node has that id.
    pub fn toggle_id(&mut self, id: &str) -> Option<bool> {
        match self.forest.find(id) {
            Some(node) => self.toggle(node),
            None => {
                warn!(id, "toggle of unknown node ignored");
                None
            }
        }
    }

    /// Records typed search text. It takes effect once a [`tick`](Self::tick)
    /// arrives after the debounce delay with no newer input in between.
    pub fn on_search_input(&mut self, text: &str, now: u64) {
        self.search.push(text.to_owned(), now);
    }

    /// Applies debounced search text that has settled by `now`.
    ///
    /// Returns `true` if the active query changed and the view should be rendered again.
    pub fn tick(&mut self, now: u64) -> bool {
        match self.search.poll(now) {
            Some(text) => self.apply_query(&text),
            None => false,
        }
    }

    /// Applies `text` as the query right away, dropping any pending input.
    ///
    /// Returns `true` if the active query changed.
    pub fn set_query(&mut self, text: &str) -> bool {
        self.search.cancel();
        self.apply_query(text)
    }

    fn apply_query(&mut self, text: &str) -> bool {
        let text = text.trim();
        let query = (!text.is_empty()).then(|| text.to_owned());
        if query == self.query {
            return false;
        }
        debug!(query = query.as_deref().unwrap_or_default(), "search applied");
        self.query = query;
        true
    }

    /// Realizes the rows of the current window and returns them.
    ///
    /// Without a query, rows come from the flat walk starting at the window's
    /// first row. With a query, they come from the search results at the same
    /// offset, walking further until the page is full or the walk completes.
    pub fn render(&mut self) -> &[RenderedRow] {
        let window = self.viewport.window();
        let mut slots: Vec<(NodeIdx, u32, bool)> = Vec::with_capacity(window.size);

        if !window.is_empty() {
            let walker = self
                .walker
                .get_or_insert_with(|| TreeWalker::new(self.forest.clone(), self.collapsed.clone()));

            match self.query.as_deref() {
                None => {
                    let mut row = window.first;
                    while slots.len() < window.size {
                        if walker.ensure_rows(row + 1) <= row {
                            break;
                        }
                        let Some(entry) = walker.row(row) else {
                            break;
                        };
                        row += 1;
                        if self.collapsed.is_hidden(entry.node) {
                            continue;
                        }
                        slots.push((entry.node, entry.depth, false));
                    }
                }
                Some(query) => {
                    let page = loop {
                        let page = walker.search(query, window.size, window.first);
                        if page.rows.len() >= window.size || walker.is_complete() {
                            break page;
                        }
                        walker.advance(window.size);
                    };
                    slots.extend(page.rows.iter().map(|r| (r.node, r.depth, r.matched)));
                }
            }
        }

        let mut rows = core::mem::take(&mut self.rows);
        rows.clear();
        rows.extend(
            slots
                .into_iter()
                .enumerate()
                .map(|(i, (node, depth, matched))| {
                    self.rendered(node, depth, window.first + i, matched)
                }),
        );
        self.rows = rows;
        trace!(
            first = window.first,
            size = window.size,
            rows = self.rows.len(),
            searching = self.query.is_some(),
            "rendered window"
        );
        &self.rows
    }

    fn rendered(&self, node: NodeIdx, depth: u32, row: usize, matched: bool) -> RenderedRow {
        let x0 = f64::from(depth) * self.config.indent;
        let y0 = self.viewport.offset_of(row);
        let bounds = Rect::new(
            x0,
            y0,
            self.config.viewport_width.max(x0),
            y0 + self.viewport.row_height(),
        );

        let mut flags = RowFlags::empty();
        flags.set(
            RowFlags::HAS_CHILDREN,
            self.forest.node(node).has_children(),
        );
        flags.set(RowFlags::CLOSED, self.collapsed.is_closed(node));
        flags.set(RowFlags::MATCHED, matched);

        RenderedRow {
            node,
            depth,
            row,
            bounds,
            flags,
        }
    }

    /// Rows produced by the last [`render`](Self::render).
    #[must_use]
    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// Height of the spacer that holds the rows.
    #[must_use]
    pub fn spacer_extent(&self) -> f64 {
        self.viewport.content_extent()
    }

    /// Label of the node shown in `row`.
    #[must_use]
    pub fn label(&self, row: &RenderedRow) -> &str {
        self.forest.label(row.node)
    }

    /// Returns `true` if `node` is closed.
    #[must_use]
    pub fn is_closed(&self, node: NodeIdx) -> bool {
        self.collapsed.is_closed(node)
    }

    /// Current collapse state.
    #[must_use]
    pub fn collapsed(&self) -> &CollapsedSet {
        &self.collapsed
    }

    /// The walker, if one has been built since the last invalidation.
    #[must_use]
    pub fn walker(&self) -> Option<&TreeWalker> {
        self.walker.as_ref()
    }

    /// The active query, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns `true` if typed search text is waiting for its debounce delay.
    #[must_use]
    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &TreeViewConfig {
        &self.config
    }

    /// The forest being shown.
    #[must_use]
    pub fn forest(&self) -> &Arc<Forest> {
        &self.forest
    }

    /// Scroll state and window geometry.
    #[must_use]
    pub fn viewport(&self) -> &RowViewport {
        &self.viewport
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use canopy_forest::{Asset, BuildOptions, Forest, Location};

    use super::TreeView;
    use crate::{RowFlags, TreeViewConfig};

    fn abc() -> Arc<Forest> {
        let locations = vec![
            Location::new("A", "Alpha"),
            Location::new("B", "Beta").with_parent("A"),
            Location::new("C", "Gamma").with_parent("A"),
        ];
        Arc::new(Forest::build(Vec::<Asset>::new(), locations, BuildOptions::default()).unwrap())
    }

    /// A chain of `n` roots, each with one child: `r0, c0, r1, c1, ...`.
    fn pairs(n: usize) -> Arc<Forest> {
        let mut locations = Vec::new();
        for i in 0..n {
            locations.push(Location::new(format!("r{i}"), format!("Room {i}")));
        }
        let assets = (0..n)
            .map(|i| Asset::new(format!("c{i}"), format!("Pump {i}")).with_location(format!("r{i}")))
            .collect::<Vec<_>>();
        Arc::new(Forest::build(assets, locations, BuildOptions::default()).unwrap())
    }

    fn ids(view: &TreeView) -> Vec<String> {
        view.rows()
            .iter()
            .map(|r| view.forest().id(r.node).to_owned())
            .collect()
    }

    #[test]
    fn renders_pre_order_with_geometry() {
        let mut view = TreeView::new(abc(), TreeViewConfig::default()).unwrap();
        view.render();
        assert_eq!(ids(&view), ["A", "B", "C"]);

        let b = view.rows()[1];
        assert_eq!(b.depth, 1);
        assert_eq!(b.bounds.x0, 16.0);
        assert_eq!(b.bounds.y0, 24.0);
        assert_eq!(b.bounds.height(), 24.0);
        assert_eq!(view.label(&b), "Beta");
        assert!(view.rows()[0].flags.contains(RowFlags::HAS_CHILDREN));
        assert_eq!(view.spacer_extent(), 72.0);
    }

    #[test]
    fn collapsing_root_hides_children() {
        let mut view = TreeView::new(abc(), TreeViewConfig::default()).unwrap();
        assert_eq!(view.toggle_id("A"), Some(true));
        view.render();
        assert_eq!(ids(&view), ["A"]);
        assert!(view.rows()[0].is_closed());

        assert_eq!(view.toggle_id("A"), Some(false));
        view.render();
        assert_eq!(ids(&view), ["A", "B", "C"]);
        assert_eq!(view.toggle_id("nope"), None);
    }

    #[test]
    fn toggle_with_index_from_replaced_forest_is_ignored() {
        let old = abc();
        let c = old.find("C").unwrap();
        let mut view = TreeView::new(old, TreeViewConfig::default()).unwrap();
        view.render();

        let smaller = Arc::new(
            Forest::build(
                Vec::<Asset>::new(),
                [Location::new("only", "Only")],
                BuildOptions::default(),
            )
            .unwrap(),
        );
        view.set_forest(smaller);
        assert_eq!(view.toggle(c), None);
        assert!(!view.collapsed().is_closed(c));
        assert_eq!(view.toggle_id("only"), Some(true));
        view.render();
        assert_eq!(ids(&view), ["only"]);
    }

    #[test]
    fn toggling_invalidates_the_walker() {
        let mut view = TreeView::new(abc(), TreeViewConfig::default()).unwrap();
        view.render();
        assert!(view.walker().is_some());
        view.toggle_id("B");
        assert!(view.walker().is_none());
    }

    #[test]
    fn window_size_bounds_the_rows() {
        // 96px / 24px = 4 visible rows, 2 overscan.
        let config = TreeViewConfig::default().with_viewport_height(96.0);
        let mut view = TreeView::new(pairs(10), config).unwrap();
        assert_eq!(view.render().len(), 6);
        assert_eq!(view.walker().unwrap().len(), 6, "only the window is walked");

        // Row 8 at 24px; overscan 2 puts the window one row above.
        view.on_scroll(8.0 * 24.0);
        view.render();
        assert_eq!(view.rows()[0].row, 7);
        assert_eq!(ids(&view)[0], "c3");
        assert_eq!(view.rows()[0].bounds.y0, 7.0 * 24.0);
    }

    #[test]
    fn empty_forest_renders_nothing() {
        let mut view = TreeView::new(Arc::new(Forest::empty()), TreeViewConfig::default()).unwrap();
        assert!(view.render().is_empty());
        assert_eq!(view.spacer_extent(), 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = TreeViewConfig::default().with_row_height(0.0);
        assert!(TreeView::new(abc(), config).is_err());
    }

    #[test]
    fn search_backfills_children() {
        let mut view = TreeView::new(abc(), TreeViewConfig::default()).unwrap();
        assert!(view.set_query("alpha"));
        view.render();
        assert_eq!(ids(&view), ["A", "B", "C"]);
        assert!(view.rows()[0].is_match());
        assert!(!view.rows()[1].is_match());
    }

    #[test]
    fn search_walks_until_the_page_is_full() {
        let config = TreeViewConfig::default().with_viewport_height(96.0);
        let mut view = TreeView::new(pairs(10), config).unwrap();
        view.set_query("pump");
        let rows = view.render().to_vec();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| r.is_match()));
        assert_eq!(ids(&view)[..3], ["c0", "c1", "c2"]);
    }

    #[test]
    fn search_without_matches_completes_the_walk() {
        let mut view = TreeView::new(pairs(5), TreeViewConfig::default()).unwrap();
        view.set_query("valve");
        assert!(view.render().is_empty());
        assert!(view.walker().unwrap().is_complete());
    }

    #[test]
    fn debounced_input_applies_after_quiet_period() {
        let mut view = TreeView::new(abc(), TreeViewConfig::default()).unwrap();
        view.on_search_input("g", 1_000);
        view.on_search_input("gam", 1_100);
        assert!(!view.tick(1_200));
        assert_eq!(view.query(), None);
        assert!(view.tick(1_250));
        assert_eq!(view.query(), Some("gam"));
        view.render();
        assert_eq!(ids(&view), ["C"]);

        // Whitespace clears the search.
        view.on_search_input("  ", 2_000);
        assert!(view.tick(2_150));
        assert_eq!(view.query(), None);
        assert!(!view.set_query(""));
    }

    #[test]
    fn short_debounce_settles_before_a_fixed_wait() {
        let config = TreeViewConfig::default().with_search_debounce_ms(50);
        let mut view = TreeView::new(abc(), config).unwrap();
        view.on_search_input("g", 0);
        view.on_search_input("ga", 60);
        view.on_search_input("gam", 120);
        assert!(view.search_pending());
        assert!(view.tick(200));
        assert!(!view.search_pending());
        assert!(!view.tick(270));
        assert_eq!(view.query(), Some("gam"));
    }

    #[test]
    fn same_forest_keeps_state_new_forest_resets_it() {
        let forest = abc();
        let mut view = TreeView::new(forest.clone(), TreeViewConfig::default()).unwrap();
        view.toggle_id("A");
        view.set_forest(forest);
        assert_eq!(view.collapsed().len(), 1);

        view.set_forest(pairs(2));
        assert!(view.collapsed().is_empty());
        assert!(view.walker().is_none());
        assert_eq!(view.spacer_extent(), 4.0 * 24.0);
    }
}
