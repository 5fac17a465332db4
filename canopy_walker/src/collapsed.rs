// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collapse state: which nodes are closed and which rows they hide.

use canopy_forest::{Forest, NodeIdx};
use hashbrown::{HashMap, HashSet};

/// Nodes the user closed, plus the descendants each closed node hides.
///
/// Only explicit closes are stored as state; the hidden marks are derived
/// from them whenever a node is toggled. A close nested inside another
/// close therefore survives the outer node being opened and closed again.
///
/// ```rust
/// use canopy_forest::{BuildOptions, Forest, Location};
/// use canopy_walker::CollapsedSet;
///
/// let forest = Forest::build(
///     Vec::new(),
///     vec![Location::new("a", "A"), Location::new("b", "B").with_parent("a")],
///     BuildOptions::default(),
/// )
/// .unwrap();
/// let a = forest.find("a").unwrap();
/// let b = forest.find("b").unwrap();
///
/// let mut collapsed = CollapsedSet::new();
/// assert!(collapsed.toggle(&forest, a));
/// assert!(collapsed.is_closed(a));
/// assert_eq!(collapsed.hidden_by(b), Some(a));
///
/// assert!(!collapsed.toggle(&forest, a));
/// assert!(collapsed.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapsedSet {
    closed: HashSet<NodeIdx>,
    /// Nearest closed ancestor of every hidden node.
    hidden: HashMap<NodeIdx, NodeIdx>,
}

impl CollapsedSet {
    /// Creates an empty set: everything expanded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of closed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closed.len()
    }

    /// Returns `true` if no node is closed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }

    /// Opens everything.
    pub fn clear(&mut self) {
        self.closed.clear();
        self.hidden.clear();
    }

    /// Returns `true` if `node` was closed by the user.
    #[must_use]
    pub fn is_closed(&self, node: NodeIdx) -> bool {
        self.closed.contains(&node)
    }

    /// The nearest closed ancestor of `node`, if any.
    #[must_use]
    pub fn hidden_by(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.hidden.get(&node).copied()
    }

    /// Returns `true` if `node` sits below a closed ancestor.
    #[must_use]
    pub fn is_hidden(&self, node: NodeIdx) -> bool {
        self.hidden.contains_key(&node)
    }

    /// Returns `true` if `node` is closed or hidden; its children are not shown either way.
    #[must_use]
    pub fn contains(&self, node: NodeIdx) -> bool {
        self.is_closed(node) || self.is_hidden(node)
    }

    /// Iterates the closed nodes in no particular order.
    pub fn closed(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.closed.iter().copied()
    }

    /// Flips `node` between closed and open. Returns `true` if it is now closed.
    pub fn toggle(&mut self, forest: &Forest, node: NodeIdx) -> bool {
        let close = !self.is_closed(node);
        self.set_closed(forest, node, close);
        close
    }

    /// Closes or opens `node` and refreshes the hidden marks of its subtree.
    pub fn set_closed(&mut self, forest: &Forest, node: NodeIdx, closed: bool) {
        let changed = if closed {
            self.closed.insert(node)
        } else {
            self.closed.remove(&node)
        };
        if !changed {
            return;
        }

        // The subtree's marks depend on `node` and on the closes above it.
        let outer = forest.ancestors(node).find(|a| self.closed.contains(a));
        let inherited = if closed { Some(node) } else { outer };

        let mut stack: Vec<(NodeIdx, Option<NodeIdx>)> = forest
            .children_of(node)
            .iter()
            .map(|&child| (child, inherited))
            .collect();
        while let Some((current, by)) = stack.pop() {
            match by {
                Some(closer) => {
                    self.hidden.insert(current, closer);
                }
                None => {
                    self.hidden.remove(&current);
                }
            }
            let below = if self.closed.contains(&current) {
                Some(current)
            } else {
                by
            };
            stack.extend(forest.children_of(current).iter().map(|&c| (c, below)));
        }
    }
}
