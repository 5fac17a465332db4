// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed forest: construction from flat records, structure queries.

use core::cmp::Ordering;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::entity::{Asset, Entity, Location};
use crate::error::{BuildError, Result};

/// Index of a node in its [`Forest`].
///
/// Indices are only meaningful for the forest that produced them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(u32);

impl NodeIdx {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Forest::build rejects inputs with more than u32::MAX records."
    )]
    const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// Position of the node in the forest's arena (input order).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How siblings (and roots) are ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SiblingOrder {
    /// Keep input order: assets first, then locations, each in the order given.
    #[default]
    Input,
    /// Sort by label, ascending. Equal labels keep input order.
    LabelAscending,
    /// Sort by label, descending. Equal labels keep input order.
    LabelDescending,
}

/// Options for [`Forest::build`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Ordering applied to roots and to every child list.
    pub sibling_order: SiblingOrder,
}

/// Counters describing how a forest was assembled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of root nodes.
    pub roots: usize,
    /// Records whose parent reference named no known record.
    pub unresolved_parents: usize,
    /// Records detached from a parent cycle and promoted to roots.
    pub cycle_promotions: usize,
    /// Records whose id was already taken by an earlier record.
    pub duplicate_ids: usize,
}

/// A single node: the original record plus resolved structure.
#[derive(Clone, Debug)]
pub struct Node {
    entity: Entity,
    parent: Option<NodeIdx>,
    children: SmallVec<[NodeIdx; 4]>,
}

impl Node {
    fn new(entity: Entity) -> Self {
        Self {
            entity,
            parent: None,
            children: SmallVec::new(),
        }
    }

    /// The original record.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.entity.id()
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.entity.label()
    }

    /// Resolved parent, `None` for roots.
    #[must_use]
    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    /// Returns `true` if the node has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A set of independent rooted trees over assets and locations.
///
/// Nodes live in a flat arena addressed by [`NodeIdx`]; children are stored
/// as indices. The forest is immutable once built.
///
/// ## Example
///
/// ```rust
/// use canopy_forest::{Asset, BuildOptions, Forest, Location};
///
/// let locations = [Location::new("plant", "Plant")];
/// let assets = [Asset::new("motor", "Motor").with_location("plant")];
/// let forest = Forest::build(assets, locations, BuildOptions::default()).unwrap();
///
/// let plant = forest.find("plant").unwrap();
/// assert_eq!(forest.roots(), &[plant]);
/// assert_eq!(forest.children_of(plant).len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<NodeIdx>,
    by_id: HashMap<String, NodeIdx>,
    stats: BuildStats,
}

impl Forest {
    /// Creates an empty forest.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a forest from assets and locations.
    ///
    /// Records are concatenated assets first, then locations. A record whose
    /// parent key (see [`Entity::parent_key`]) names another record becomes
    /// its child; every other record becomes a root. Records caught in a
    /// parent cycle are detached and promoted to roots so that every record
    /// appears exactly once.
    ///
    /// When several records share an id, the first one owns it: [`find`]
    /// and parent references resolve to it. The later records still get
    /// their own nodes and are placed by their parent key, but cannot be
    /// looked up by id.
    ///
    /// [`find`]: Self::find
    pub fn build<A, L>(assets: A, locations: L, options: BuildOptions) -> Result<Self>
    where
        A: IntoIterator<Item = Asset>,
        L: IntoIterator<Item = Location>,
    {
        let entities = assets
            .into_iter()
            .map(Entity::Asset)
            .chain(locations.into_iter().map(Entity::Location))
            .collect();
        Self::from_entities(entities, options)
    }

    /// Builds a forest from already-concatenated records.
    pub fn from_entities(entities: Vec<Entity>, options: BuildOptions) -> Result<Self> {
        let count = entities.len();
        if u32::try_from(count).is_err() {
            return Err(BuildError::TooManyNodes { count });
        }

        let mut stats = BuildStats::default();
        let mut by_id = HashMap::with_capacity(count);
        for (i, entity) in entities.iter().enumerate() {
            if by_id.contains_key(entity.id()) {
                warn!(id = entity.id(), "duplicate entity id; keeping the first record's id");
                stats.duplicate_ids += 1;
            } else {
                by_id.insert(entity.id().to_owned(), NodeIdx::new(i));
            }
        }

        let mut nodes: Vec<Node> = entities.into_iter().map(Node::new).collect();
        let mut roots = Vec::new();

        for i in 0..count {
            let idx = NodeIdx::new(i);
            let key = nodes[i].entity.parent_key();
            let parent = key.and_then(|k| by_id.get(k)).copied();
            match parent {
                Some(p) if p == idx => {
                    warn!(id = nodes[i].id(), "entity is its own parent; promoting to root");
                    stats.cycle_promotions += 1;
                    roots.push(idx);
                }
                Some(p) => {
                    nodes[i].parent = Some(p);
                    nodes[p.index()].children.push(idx);
                }
                None => {
                    if let Some(key) = key {
                        debug!(id = nodes[i].id(), parent = key, "unresolved parent; promoting to root");
                        stats.unresolved_parents += 1;
                    }
                    roots.push(idx);
                }
            }
        }

        let promoted = break_cycles(&mut nodes, &mut roots);
        if promoted > 0 {
            // Promoted records take their input position among the roots.
            roots.sort_unstable();
            stats.cycle_promotions += promoted;
        }

        if options.sibling_order != SiblingOrder::Input {
            let order = options.sibling_order;
            for i in 0..count {
                let mut children = core::mem::take(&mut nodes[i].children);
                children.sort_by(|a, b| compare_labels(&nodes, order, *a, *b));
                nodes[i].children = children;
            }
            roots.sort_by(|a, b| compare_labels(&nodes, order, *a, *b));
        }

        stats.roots = roots.len();
        if stats.unresolved_parents > 0 {
            warn!(
                count = stats.unresolved_parents,
                "entities reference unknown parents and were promoted to roots"
            );
        }
        debug!(
            nodes = count,
            roots = stats.roots,
            cycle_promotions = stats.cycle_promotions,
            duplicate_ids = stats.duplicate_ids,
            "forest built"
        );

        Ok(Self {
            nodes,
            roots,
            by_id,
            stats,
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root nodes in sibling order.
    #[must_use]
    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    /// Counters recorded while building.
    #[must_use]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Returns the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this forest.
    #[must_use]
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.index()]
    }

    /// Returns the node at `idx`, or `None` if it is out of range.
    #[must_use]
    pub fn get(&self, idx: NodeIdx) -> Option<&Node> {
        self.nodes.get(idx.index())
    }

    /// Looks up a node by its record identifier.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    /// The original record of `idx`.
    #[must_use]
    pub fn entity(&self, idx: NodeIdx) -> &Entity {
        &self.node(idx).entity
    }

    /// Identifier of `idx`.
    #[must_use]
    pub fn id(&self, idx: NodeIdx) -> &str {
        self.node(idx).id()
    }

    /// Label of `idx`.
    #[must_use]
    pub fn label(&self, idx: NodeIdx) -> &str {
        self.node(idx).label()
    }

    /// Parent of `idx`, `None` for roots.
    #[must_use]
    pub fn parent_of(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).parent
    }

    /// Children of `idx` in sibling order.
    #[must_use]
    pub fn children_of(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.node(idx).children
    }

    /// Iterates the ancestors of `idx`, nearest first.
    pub fn ancestors(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        core::iter::successors(self.parent_of(idx), |&p| self.parent_of(p))
    }

    /// Number of ancestors of `idx`; roots have depth 0.
    #[must_use]
    pub fn depth_of(&self, idx: NodeIdx) -> u32 {
        let mut depth = 0;
        for _ in self.ancestors(idx) {
            depth += 1;
        }
        depth
    }

    /// Iterates all nodes in arena (input) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIdx::new(i), node))
    }
}

fn compare_labels(nodes: &[Node], order: SiblingOrder, a: NodeIdx, b: NodeIdx) -> Ordering {
    let ord = nodes[a.index()].label().cmp(nodes[b.index()].label());
    match order {
        SiblingOrder::LabelDescending => ord.reverse(),
        SiblingOrder::Input | SiblingOrder::LabelAscending => ord,
    }
}

/// Promotes records that cannot be reached from any root.
///
/// Each node has a single parent, so an unreachable node sits on a parent
/// cycle or below one. Detaching the first such node in input order and
/// marking its subtree repeats until every node is reachable.
fn break_cycles(nodes: &mut [Node], roots: &mut Vec<NodeIdx>) -> usize {
    let mut reached = vec![false; nodes.len()];
    let mut stack: Vec<NodeIdx> = roots.clone();
    let mut reached_count = mark_reachable(nodes, &mut reached, &mut stack);
    if reached_count == nodes.len() {
        return 0;
    }

    let mut promoted = 0;
    for i in 0..nodes.len() {
        if reached[i] {
            continue;
        }
        let idx = NodeIdx::new(i);
        if let Some(parent) = nodes[i].parent.take() {
            nodes[parent.index()].children.retain(|c| *c != idx);
        }
        warn!(id = nodes[i].id(), "parent cycle detected; promoting to root");
        roots.push(idx);
        promoted += 1;

        stack.push(idx);
        reached_count += mark_reachable(nodes, &mut reached, &mut stack);
        if reached_count == nodes.len() {
            break;
        }
    }
    promoted
}

fn mark_reachable(nodes: &[Node], reached: &mut [bool], stack: &mut Vec<NodeIdx>) -> usize {
    let mut count = 0;
    while let Some(idx) = stack.pop() {
        if reached[idx.index()] {
            continue;
        }
        reached[idx.index()] = true;
        count += 1;
        stack.extend(nodes[idx.index()].children.iter().copied());
    }
    count
}

#[cfg(test)]
mod tests {
    use super::{BuildOptions, Forest, NodeIdx, SiblingOrder};
    use crate::{Asset, Location};

    fn ids(forest: &Forest, nodes: &[NodeIdx]) -> Vec<String> {
        nodes.iter().map(|&n| forest.id(n).to_owned()).collect()
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let forest = Forest::build(Vec::<Asset>::new(), Vec::<Location>::new(), BuildOptions::default()).unwrap();
        assert!(forest.is_empty());
        assert!(forest.roots().is_empty());
        assert_eq!(forest.stats().roots, 0);
    }

    #[test]
    fn assets_hang_off_parent_then_location() {
        let locations = [
            Location::new("plant", "Plant"),
            Location::new("area", "Area").with_parent("plant"),
        ];
        let assets = [
            Asset::new("motor", "Motor").with_location("area"),
            Asset::new("fan", "Fan")
                .with_parent("motor")
                .with_location("plant"),
            Asset::new("loose", "Loose component"),
        ];
        let forest = Forest::build(assets, locations, BuildOptions::default()).unwrap();

        // Assets come first in the concatenation, so `loose` precedes `plant`.
        assert_eq!(ids(&forest, forest.roots()), ["loose", "plant"]);

        let area = forest.find("area").unwrap();
        let motor = forest.find("motor").unwrap();
        assert_eq!(ids(&forest, forest.children_of(area)), ["motor"]);
        assert_eq!(ids(&forest, forest.children_of(motor)), ["fan"]);
        assert_eq!(forest.depth_of(forest.find("fan").unwrap()), 3);
        assert_eq!(forest.depth_of(forest.find("plant").unwrap()), 0);
    }

    #[test]
    fn unresolved_parent_becomes_root() {
        let locations = [Location::new("area", "Area").with_parent("missing")];
        let forest = Forest::build(Vec::<Asset>::new(), locations, BuildOptions::default()).unwrap();
        assert_eq!(ids(&forest, forest.roots()), ["area"]);
        assert_eq!(forest.stats().unresolved_parents, 1);
    }

    #[test]
    fn duplicate_ids_keep_every_record() {
        let assets = [
            Asset::new("x", "One").with_location("plant"),
            Asset::new("y", "Child").with_parent("x"),
        ];
        let locations = [Location::new("plant", "Plant"), Location::new("x", "Two")];
        let forest = Forest::build(assets, locations, BuildOptions::default()).unwrap();

        assert_eq!(forest.len(), 4);
        assert_eq!(forest.stats().duplicate_ids, 1);

        // The first record owns the id and receives its children.
        let x = forest.find("x").unwrap();
        assert_eq!(forest.label(x), "One");
        assert_eq!(ids(&forest, forest.children_of(x)), ["y"]);

        // The later record is still shown, as a root.
        let labels: Vec<_> = forest.roots().iter().map(|&r| forest.label(r)).collect();
        assert_eq!(labels, ["Plant", "Two"]);
    }

    #[test]
    fn parent_cycles_are_broken() {
        let locations = [
            Location::new("a", "A").with_parent("c"),
            Location::new("b", "B").with_parent("a"),
            Location::new("c", "C").with_parent("b"),
            Location::new("d", "D").with_parent("d"),
            Location::new("e", "E").with_parent("b"),
        ];
        let forest = Forest::build(Vec::<Asset>::new(), locations, BuildOptions::default()).unwrap();

        // `d` is its own parent; `a` is the first record on the a→c→b→a cycle.
        // Promoted roots keep input order.
        assert_eq!(ids(&forest, forest.roots()), ["a", "d"]);
        assert_eq!(forest.stats().cycle_promotions, 2);

        let a = forest.find("a").unwrap();
        assert_eq!(forest.parent_of(a), None);
        let c = forest.find("c").unwrap();
        assert_eq!(forest.depth_of(c), 2);

        // Every record is reachable exactly once.
        let mut seen = vec![0_u32; forest.len()];
        let mut stack = forest.roots().to_vec();
        while let Some(n) = stack.pop() {
            seen[n.index()] += 1;
            stack.extend(forest.children_of(n).iter().copied());
        }
        assert!(seen.iter().all(|&n| n == 1), "each node reached once: {seen:?}");
    }

    #[test]
    fn label_order_is_stable() {
        let locations = [
            Location::new("1", "b"),
            Location::new("2", "a"),
            Location::new("3", "b"),
            Location::new("4", "c"),
        ];
        let asc = Forest::build(
            Vec::<Asset>::new(),
            locations.clone(),
            BuildOptions {
                sibling_order: SiblingOrder::LabelAscending,
            },
        )
        .unwrap();
        assert_eq!(ids(&asc, asc.roots()), ["2", "1", "3", "4"]);

        let desc = Forest::build(
            Vec::<Asset>::new(),
            locations,
            BuildOptions {
                sibling_order: SiblingOrder::LabelDescending,
            },
        )
        .unwrap();
        assert_eq!(ids(&desc, desc.roots()), ["4", "1", "3", "2"]);
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let locations = [
            Location::new("a", "A"),
            Location::new("b", "B").with_parent("a"),
            Location::new("c", "C").with_parent("b"),
        ];
        let forest = Forest::build(Vec::<Asset>::new(), locations, BuildOptions::default()).unwrap();
        let c = forest.find("c").unwrap();
        let chain: Vec<_> = forest.ancestors(c).collect();
        assert_eq!(ids(&forest, &chain), ["b", "a"]);
    }
}
