// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incrementally populated token index over node labels.

use core::ops::Bound;
use std::collections::BTreeMap;

use canopy_forest::NodeIdx;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// A node as recorded by the index, with the depth it was discovered at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedNode {
    /// The node.
    pub node: NodeIdx,
    /// Depth assigned when the node was indexed.
    pub depth: u32,
}

#[derive(Clone, Copy, Debug)]
struct Posting {
    seq: u32,
    position: u16,
}

/// Rank of a candidate: fewer prefix-only terms, then earlier token
/// positions, then earlier insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    prefix_terms: u32,
    positions: u32,
    seq: u32,
}

/// Text index over node labels, filled as nodes are discovered.
///
/// Labels are split on non-alphanumeric characters and lowercased. A query
/// matches a node when every query term is a prefix of one of the label's
/// tokens. Results rank exact token matches ahead of prefix matches, then
/// matches nearer the start of the label, then the node indexed first.
///
/// ```rust
/// use canopy_forest::{BuildOptions, Forest, Location};
/// use canopy_walker::SearchIndex;
///
/// let forest = Forest::build(
///     Vec::new(),
///     vec![Location::new("l1", "Machinery house"), Location::new("l2", "Warehouse")],
///     BuildOptions::default(),
/// )
/// .unwrap();
///
/// let mut index = SearchIndex::new();
/// for (node, n) in forest.iter() {
///     index.insert(node, 0, n.label());
/// }
///
/// let hits = index.query("mach", 10, 0);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(forest.id(hits[0].node), "l1");
/// assert!(index.query("house", 10, 0).len() == 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
    entries: Vec<IndexedNode>,
    slots: HashMap<NodeIdx, u32>,
    tokens: BTreeMap<String, SmallVec<[Posting; 2]>>,
}

impl SearchIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been indexed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `node` has been indexed.
    #[must_use]
    pub fn contains(&self, node: NodeIdx) -> bool {
        self.slots.contains_key(&node)
    }

    /// The entry recorded for `node`, if it has been indexed.
    #[must_use]
    pub fn get(&self, node: NodeIdx) -> Option<IndexedNode> {
        self.slots.get(&node).map(|&seq| self.entries[seq as usize])
    }

    /// Indexes `label` for `node`. Returns `false` if `node` was already indexed.
    pub fn insert(&mut self, node: NodeIdx, depth: u32, label: &str) -> bool {
        if self.slots.contains_key(&node) {
            return false;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "A forest holds at most u32::MAX nodes and each is indexed once."
        )]
        let seq = self.entries.len() as u32;
        self.entries.push(IndexedNode { node, depth });
        self.slots.insert(node, seq);

        for (position, token) in tokenize(label).enumerate() {
            let position = u16::try_from(position).unwrap_or(u16::MAX);
            self.tokens
                .entry(token)
                .or_default()
                .push(Posting { seq, position });
        }
        true
    }

    /// Returns up to `limit` matches for `query`, skipping the first `offset`.
    ///
    /// An empty query, or one made only of separators, matches nothing.
    #[must_use]
    pub fn query(&self, query: &str, limit: usize, offset: usize) -> Vec<IndexedNode> {
        let mut terms: Vec<String> = tokenize(query).collect();
        terms.sort_unstable();
        terms.dedup();
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut candidates: HashMap<u32, Rank> = HashMap::new();
        for (i, term) in terms.iter().enumerate() {
            let best = self.best_postings(term);
            if i == 0 {
                candidates = best
                    .into_iter()
                    .map(|(seq, (prefix, position))| {
                        let rank = Rank {
                            prefix_terms: u32::from(prefix),
                            positions: u32::from(position),
                            seq,
                        };
                        (seq, rank)
                    })
                    .collect();
            } else {
                candidates.retain(|seq, rank| match best.get(seq) {
                    Some(&(prefix, position)) => {
                        rank.prefix_terms += u32::from(prefix);
                        rank.positions += u32::from(position);
                        true
                    }
                    None => false,
                });
            }
            if candidates.is_empty() {
                return Vec::new();
            }
        }

        let mut ranked: Vec<Rank> = candidates.into_values().collect();
        ranked.sort_unstable();
        ranked
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|rank| self.entries[rank.seq as usize])
            .collect()
    }

    /// Best `(is_prefix_only, position)` per indexed node for one term.
    fn best_postings(&self, term: &str) -> HashMap<u32, (bool, u16)> {
        let mut best: HashMap<u32, (bool, u16)> = HashMap::new();
        let range = self
            .tokens
            .range::<str, _>((Bound::Included(term), Bound::Unbounded));
        for (token, postings) in range {
            if !token.starts_with(term) {
                break;
            }
            let prefix = token.len() != term.len();
            for posting in postings {
                let candidate = (prefix, posting.position);
                best.entry(posting.seq)
                    .and_modify(|current| {
                        if candidate < *current {
                            *current = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }
        best
    }
}

/// Splits `text` into lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use canopy_forest::{BuildOptions, Forest, Location, NodeIdx};

    use super::{SearchIndex, tokenize};

    fn forest(labels: &[&str]) -> Forest {
        let locations = labels
            .iter()
            .enumerate()
            .map(|(i, label)| Location::new(format!("n{i}"), *label))
            .collect::<Vec<_>>();
        Forest::build(Vec::new(), locations, BuildOptions::default()).unwrap()
    }

    fn indexed(labels: &[&str]) -> (Forest, SearchIndex) {
        let forest = forest(labels);
        let mut index = SearchIndex::new();
        for (node, n) in forest.iter() {
            index.insert(node, 0, n.label());
        }
        (forest, index)
    }

    fn ids(forest: &Forest, index: &SearchIndex, q: &str) -> Vec<String> {
        index
            .query(q, 100, 0)
            .iter()
            .map(|hit| forest.id(hit.node).to_owned())
            .collect()
    }

    #[test]
    fn tokenizer_splits_and_lowercases() {
        let tokens: Vec<_> = tokenize("MOTOR TC01 - Coupling_Module (Área)").collect();
        assert_eq!(tokens, ["motor", "tc01", "coupling", "module", "área"]);
    }

    #[test]
    fn empty_index_and_empty_query_match_nothing() {
        let index = SearchIndex::new();
        assert!(index.query("motor", 10, 0).is_empty());

        let (_, index) = indexed(&["Motor"]);
        assert!(index.query("", 10, 0).is_empty());
        assert!(index.query(" - ", 10, 0).is_empty());
        assert!(index.query("motor", 0, 0).is_empty());
    }

    #[test]
    fn every_term_must_match() {
        let (forest, index) = indexed(&["Motor TC01", "Motor RT", "Fan TC01"]);
        assert_eq!(ids(&forest, &index, "motor tc"), ["n0"]);
        assert_eq!(ids(&forest, &index, "tc01"), ["n0", "n2"]);
        assert!(ids(&forest, &index, "motor fan").is_empty());
    }

    #[test]
    fn exact_tokens_rank_before_prefixes() {
        let (forest, index) = indexed(&["Motors", "Old motor", "Motor"]);
        // `Motor` and `Old motor` match exactly; `Motor` matches at position 0.
        assert_eq!(ids(&forest, &index, "motor"), ["n2", "n1", "n0"]);
    }

    #[test]
    fn ties_go_to_the_first_indexed() {
        let (forest, index) = indexed(&["Pump", "Pump", "Pump"]);
        assert_eq!(ids(&forest, &index, "pump"), ["n0", "n1", "n2"]);
    }

    #[test]
    fn limit_and_offset_page_through_matches() {
        let (forest, index) = indexed(&["Pump A", "Pump B", "Pump C", "Valve"]);
        let page: Vec<_> = index
            .query("pump", 2, 1)
            .iter()
            .map(|hit| forest.id(hit.node).to_owned())
            .collect();
        assert_eq!(page, ["n1", "n2"]);
        assert!(index.query("pump", 2, 3).is_empty());
    }

    #[test]
    fn inserting_twice_is_ignored() {
        let mut index = SearchIndex::new();
        let forest = forest(&["Pump"]);
        let node: NodeIdx = forest.roots()[0];
        assert!(index.insert(node, 0, "Pump"));
        assert!(!index.insert(node, 3, "Pump"));
        assert_eq!(index.len(), 1);
        assert_eq!(index.query("pump", 10, 0)[0].depth, 0);
    }
}
