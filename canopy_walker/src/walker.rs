// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resumable pre-order walk that builds the flat index on demand.

use core::fmt;
use core::iter::FusedIterator;
use std::sync::Arc;

use canopy_forest::{Forest, NodeIdx};
use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::collapsed::CollapsedSet;
use crate::search::{IndexedNode, SearchIndex};

/// Progress of a [`TreeWalker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkState {
    /// No node emitted yet.
    Fresh,
    /// Some nodes emitted; more are pending.
    InProgress,
    /// Nothing left to emit. Terminal.
    Complete,
}

/// A row of the flat index: a node, its depth, and its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatEntry {
    /// The node.
    pub node: NodeIdx,
    /// Number of ancestors; roots are at depth 0.
    pub depth: u32,
    /// Position in the flat index.
    pub row: usize,
}

/// A row of a search page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRow {
    /// The node.
    pub node: NodeIdx,
    /// Number of ancestors; roots are at depth 0.
    pub depth: u32,
    /// `true` if the node matched the query itself rather than being listed
    /// as part of a matching ancestor's subtree.
    pub matched: bool,
}

/// Result of [`TreeWalker::search`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Matches, each followed by its visible subtree.
    pub rows: Vec<SearchRow>,
    /// Number of rows that matched the query directly.
    pub hits: usize,
}

/// Lazily flattens a forest in pre-order.
///
/// The walker keeps its pending stack between calls, so asking for more rows
/// extends the flat index instead of re-walking from the roots. Rows, once
/// written, never change. Children of nodes in the collapsed set are not
/// visited. A walker is bound to one forest and one collapsed set; build a
/// new one when either changes.
///
/// Every emitted node is also added to the walker's [`SearchIndex`].
///
/// ```rust
/// use std::sync::Arc;
/// use canopy_forest::{BuildOptions, Forest, Location};
/// use canopy_walker::{CollapsedSet, TreeWalker, WalkState};
///
/// let forest = Forest::build(
///     Vec::new(),
///     vec![
///         Location::new("a", "A"),
///         Location::new("b", "B").with_parent("a"),
///         Location::new("c", "C").with_parent("a"),
///     ],
///     BuildOptions::default(),
/// )
/// .unwrap();
/// let forest = Arc::new(forest);
///
/// let mut walker = TreeWalker::new(forest.clone(), CollapsedSet::new());
/// assert_eq!(walker.state(), WalkState::Fresh);
///
/// let order: Vec<_> = walker
///     .by_ref()
///     .map(|entry| (forest.id(entry.node), entry.depth))
///     .collect();
/// assert_eq!(order, [("a", 0), ("b", 1), ("c", 1)]);
/// assert!(walker.is_complete());
/// ```
pub struct TreeWalker {
    forest: Arc<Forest>,
    collapsed: CollapsedSet,
    /// Pending nodes with their depth; the top of the stack is emitted next.
    stack: Vec<(NodeIdx, u32)>,
    flat: Vec<FlatEntry>,
    rows: HashMap<NodeIdx, usize>,
    index: SearchIndex,
    state: WalkState,
}

impl fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeWalker")
            .field("nodes_total", &self.forest.len())
            .field("emitted", &self.flat.len())
            .field("pending", &self.stack.len())
            .field("indexed", &self.index.len())
            .field("collapsed", &self.collapsed.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TreeWalker {
    /// Creates a walker over `forest`, skipping the subtrees closed in `collapsed`.
    #[must_use]
    pub fn new(forest: Arc<Forest>, collapsed: CollapsedSet) -> Self {
        let stack: Vec<_> = forest.roots().iter().rev().map(|&r| (r, 0)).collect();
        let state = if stack.is_empty() {
            WalkState::Complete
        } else {
            WalkState::Fresh
        };
        Self {
            forest,
            collapsed,
            stack,
            flat: Vec::new(),
            rows: HashMap::new(),
            index: SearchIndex::new(),
            state,
        }
    }

    /// Emits the next node, or `None` once the walk is complete.
    pub fn step(&mut self) -> Option<FlatEntry> {
        let Some((node, depth)) = self.stack.pop() else {
            self.finish();
            return None;
        };

        if !self.collapsed.contains(node) {
            // Reversed so the first child is popped first.
            for &child in self.forest.children_of(node).iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }

        let entry = FlatEntry {
            node,
            depth,
            row: self.flat.len(),
        };
        self.flat.push(entry);
        self.rows.insert(node, entry.row);
        self.index.insert(node, depth, self.forest.label(node));

        if self.stack.is_empty() {
            self.finish();
        } else {
            self.state = WalkState::InProgress;
        }
        Some(entry)
    }

    fn finish(&mut self) {
        if self.state != WalkState::Complete {
            debug!(rows = self.flat.len(), "walk complete");
            self.state = WalkState::Complete;
        }
    }

    /// Walks until at least `len` rows exist or the walk completes.
    /// Returns the number of rows available.
    pub fn ensure_rows(&mut self, len: usize) -> usize {
        while self.flat.len() < len && self.step().is_some() {}
        self.flat.len()
    }

    /// Emits up to `count` more nodes. Returns how many were emitted.
    pub fn advance(&mut self, count: usize) -> usize {
        let before = self.flat.len();
        for _ in 0..count {
            if self.step().is_none() {
                break;
            }
        }
        self.flat.len() - before
    }

    /// Current progress.
    #[must_use]
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Returns `true` once every reachable node has been emitted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == WalkState::Complete
    }

    /// Number of rows emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    /// Returns `true` if nothing has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// The flat index built so far.
    #[must_use]
    pub fn rows(&self) -> &[FlatEntry] {
        &self.flat
    }

    /// Row `row` of the flat index, if it has been emitted.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<FlatEntry> {
        self.flat.get(row).copied()
    }

    /// Flat entry of `node`, if it has been emitted.
    #[must_use]
    pub fn entry_of(&self, node: NodeIdx) -> Option<FlatEntry> {
        self.rows.get(&node).map(|&row| self.flat[row])
    }

    /// The node with record id `id` and its depth, if the walk has reached it.
    ///
    /// Nodes materialized by [`search`](Self::search) count as reached even
    /// though they have no row in the flat index.
    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<IndexedNode> {
        self.index.get(self.forest.find(id)?)
    }

    /// The forest being walked.
    #[must_use]
    pub fn forest(&self) -> &Arc<Forest> {
        &self.forest
    }

    /// The collapse state this walker was built with.
    #[must_use]
    pub fn collapsed(&self) -> &CollapsedSet {
        &self.collapsed
    }

    /// The label index filled so far.
    #[must_use]
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Searches the nodes discovered so far.
    ///
    /// Returns up to `limit` rows for the matches starting at `offset` in
    /// rank order. Each match is followed by as much of its visible subtree as
    /// fits, depth first, so an ancestor's children stay listed even when
    /// they do not match themselves. Those descendants are indexed as a side
    /// effect. A node is listed at most once per page.
    pub fn search(&mut self, query: &str, limit: usize, offset: usize) -> SearchPage {
        let mut page = SearchPage::default();
        if limit == 0 {
            return page;
        }
        let hits = self.index.query(query, limit, offset);
        let mut listed: HashSet<NodeIdx> = HashSet::with_capacity(limit);
        for hit in hits {
            if page.rows.len() >= limit {
                break;
            }
            page.hits += 1;
            if !listed.insert(hit.node) {
                // Already listed under an earlier match.
                if let Some(row) = page.rows.iter_mut().find(|row| row.node == hit.node) {
                    row.matched = true;
                }
                continue;
            }
            page.rows.push(SearchRow {
                node: hit.node,
                depth: hit.depth,
                matched: true,
            });
            self.backfill(hit, limit, &mut page.rows, &mut listed);
        }
        trace!(query, offset, hits = page.hits, rows = page.rows.len(), "search page");
        page
    }

    fn backfill(
        &mut self,
        hit: IndexedNode,
        limit: usize,
        rows: &mut Vec<SearchRow>,
        listed: &mut HashSet<NodeIdx>,
    ) {
        if self.collapsed.contains(hit.node) {
            return;
        }
        let mut stack: Vec<(NodeIdx, u32)> = self
            .forest
            .children_of(hit.node)
            .iter()
            .rev()
            .map(|&child| (child, hit.depth + 1))
            .collect();

        while let Some((node, depth)) = stack.pop() {
            if rows.len() >= limit {
                break;
            }
            if !listed.insert(node) {
                continue;
            }
            self.index.insert(node, depth, self.forest.label(node));
            rows.push(SearchRow {
                node,
                depth,
                matched: false,
            });
            if !self.collapsed.contains(node) {
                for &child in self.forest.children_of(node).iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}

impl Iterator for TreeWalker {
    type Item = FlatEntry;

    fn next(&mut self) -> Option<FlatEntry> {
        self.step()
    }
}

impl FusedIterator for TreeWalker {}
