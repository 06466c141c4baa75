// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scope-aware automatic layout.
//!
//! Layout runs in two passes over an immutable [`LayoutSnapshot`]:
//!
//! 1. Bottom-up, every scope arranges its direct children in columns and
//!    the enclosing node grows to fit them plus padding.
//! 2. Top-down, child offsets are turned into absolute positions.
//!
//! Connections only influence the scope where their endpoints diverge:
//! `a -> b2` with `a` inside `parent1` and both `parent1` and `b2` inside
//! `parent3` is ranked as `parent1 -> b2` within `parent3`.

mod ranking;

use crate::node::NodeId;
use crate::scheduler::CancelToken;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Horizontal flow of connected nodes within a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectionBias {
    /// Sources are placed left of their targets
    #[default]
    LeftToRight,
    /// Members are placed in one row in insertion order
    None,
}

/// Layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Inset between a scope's edge and its children
    pub padding: f32,
    /// Minimum distance between sibling boxes
    pub sibling_gap: f32,
    /// Ordering heuristic
    pub direction_bias: DirectionBias,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            sibling_gap: 40.0,
            direction_bias: DirectionBias::LeftToRight,
        }
    }
}

/// Axis-aligned box, positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a rect from its top-left corner and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `inset` on all four sides
    pub fn inset(&self, inset: f32) -> Rect {
        Rect::new(
            self.x + inset,
            self.y + inset,
            self.width - 2.0 * inset,
            self.height - 2.0 * inset,
        )
    }

    /// Whether `other` lies fully inside this rect, within `tolerance`
    pub fn contains_rect(&self, other: &Rect, tolerance: f32) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }

    /// Distance between two boxes along the axis that separates them.
    ///
    /// Negative when the boxes overlap.
    pub fn separation(&self, other: &Rect) -> f32 {
        let dx = (other.x - self.right()).max(self.x - other.right());
        let dy = (other.y - self.bottom()).max(self.y - other.bottom());
        dx.max(dy)
    }

    /// Smallest rect covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Layout input for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Enclosing scope
    pub parent: Option<NodeId>,
    /// Declared minimum size
    pub size: [f32; 2],
}

/// Immutable copy of the graph state layout reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    nodes: IndexMap<NodeId, SnapshotNode>,
    edges: Vec<(NodeId, NodeId)>,
    revision: u64,
}

impl LayoutSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node; insertion order drives tie-breaking
    pub fn add_node(&mut self, id: NodeId, parent: Option<NodeId>, width: f32, height: f32) {
        self.nodes.insert(
            id,
            SnapshotNode {
                parent,
                size: [width, height],
            },
        );
    }

    /// Record a connection between two nodes
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.push((from, to));
    }

    /// Tag with the graph revision it was taken from
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Graph revision the snapshot was taken from
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Node entry by ID
    pub fn node(&self, id: NodeId) -> Option<&SnapshotNode> {
        self.nodes.get(&id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the snapshot holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Final box of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeFrame {
    /// Position and effective size
    pub rect: Rect,
    /// Scope nesting depth; roots are 0
    pub depth: usize,
}

/// Result of a layout run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    frames: IndexMap<NodeId, NodeFrame>,
    revision: u64,
}

impl Layout {
    /// Box of a node
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.frames.get(&id).map(|f| f.rect)
    }

    /// Top-left position of a node
    pub fn position(&self, id: NodeId) -> Option<[f32; 2]> {
        self.rect(id).map(|r| [r.x, r.y])
    }

    /// Scope depth of a node
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.frames.get(&id).map(|f| f.depth)
    }

    /// All boxes in snapshot order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Rect)> + '_ {
        self.frames.iter().map(|(id, f)| (*id, f.rect))
    }

    /// Node ids with shallow scopes first, so deeper boxes draw on top
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.frames.keys().copied().collect();
        ids.sort_by_key(|id| self.frames[id].depth);
        ids
    }

    /// Union of every box, for fitting the viewport
    pub fn bounds(&self) -> Option<Rect> {
        self.frames
            .values()
            .map(|f| f.rect)
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Graph revision the layout was computed from
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of laid out nodes
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no node was laid out
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Computes positions for every node of a snapshot
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create an engine with the given parameters
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Parameters in use
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `snapshot`, giving up with [`LayoutError::Cancelled`] once
    /// `cancel` reports a newer request
    pub fn run(&self, snapshot: &LayoutSnapshot, cancel: &CancelToken) -> Result<Layout, LayoutError> {
        let started = Instant::now();
        if snapshot.is_empty() {
            return Ok(Layout {
                frames: IndexMap::new(),
                revision: snapshot.revision,
            });
        }

        let tree = ScopeTree::build(snapshot)?;
        let edges = self.scoped_edges(snapshot);
        let padding = self.config.padding;

        // Pass 1: sizes and offsets, leaves first
        let mut sizes: HashMap<NodeId, [f32; 2]> = HashMap::with_capacity(snapshot.len());
        let mut offsets: HashMap<NodeId, [f32; 2]> = HashMap::with_capacity(snapshot.len());
        for id in tree.order.iter().rev() {
            if cancel.is_cancelled() {
                return Err(LayoutError::Cancelled);
            }
            let declared = snapshot.nodes[id].size;
            let members = tree.children.get(id).map(Vec::as_slice).unwrap_or(&[]);
            if members.is_empty() {
                sizes.insert(*id, declared);
                continue;
            }

            let scope_edges = edges.get(&Some(*id)).map(Vec::as_slice).unwrap_or(&[]);
            let arrangement = ranking::arrange(
                members,
                &sizes,
                scope_edges,
                self.config.direction_bias,
                self.config.sibling_gap,
            );
            for (child, offset) in arrangement.offsets {
                offsets.insert(child, [offset[0] + padding, offset[1] + padding]);
            }
            sizes.insert(
                *id,
                [
                    declared[0].max(arrangement.size[0] + 2.0 * padding),
                    declared[1].max(arrangement.size[1] + 2.0 * padding),
                ],
            );
        }

        let root_edges = edges.get(&None).map(Vec::as_slice).unwrap_or(&[]);
        let arrangement = ranking::arrange(
            &tree.roots,
            &sizes,
            root_edges,
            self.config.direction_bias,
            self.config.sibling_gap,
        );
        offsets.extend(arrangement.offsets);

        // Pass 2: absolute positions, roots first
        let mut absolute: HashMap<NodeId, [f32; 2]> = HashMap::with_capacity(snapshot.len());
        for id in &tree.order {
            let origin = match snapshot.nodes[id].parent {
                Some(parent) => absolute[&parent],
                None => [0.0, 0.0],
            };
            let offset = offsets[id];
            absolute.insert(*id, [origin[0] + offset[0], origin[1] + offset[1]]);
        }

        let frames: IndexMap<NodeId, NodeFrame> = snapshot
            .nodes
            .keys()
            .map(|id| {
                let [x, y] = absolute[id];
                let [width, height] = sizes[id];
                (
                    *id,
                    NodeFrame {
                        rect: Rect::new(x, y, width, height),
                        depth: tree.depth[id],
                    },
                )
            })
            .collect();

        tracing::info!(
            nodes = frames.len(),
            elapsed = ?started.elapsed(),
            "Layout finished"
        );
        Ok(Layout {
            frames,
            revision: snapshot.revision,
        })
    }

    /// Bucket connections by the scope where their endpoints diverge,
    /// lifting each endpoint to its ancestor that is a member of that scope
    fn scoped_edges(&self, snapshot: &LayoutSnapshot) -> HashMap<Option<NodeId>, Vec<(NodeId, NodeId)>> {
        let mut buckets: HashMap<Option<NodeId>, Vec<(NodeId, NodeId)>> = HashMap::new();
        if self.config.direction_bias == DirectionBias::None {
            return buckets;
        }

        let chain = |id: NodeId| {
            let mut chain = vec![id];
            let mut current = id;
            while let Some(parent) = snapshot.nodes.get(&current).and_then(|n| n.parent) {
                chain.push(parent);
                current = parent;
            }
            chain.reverse();
            chain
        };

        for (from, to) in &snapshot.edges {
            if !snapshot.nodes.contains_key(from) || !snapshot.nodes.contains_key(to) {
                continue;
            }
            let (from_chain, to_chain) = (chain(*from), chain(*to));
            let shared = from_chain
                .iter()
                .zip(&to_chain)
                .take_while(|(a, b)| a == b)
                .count();
            // One endpoint encloses the other
            if shared == from_chain.len() || shared == to_chain.len() {
                continue;
            }
            let scope = shared.checked_sub(1).map(|i| from_chain[i]);
            buckets
                .entry(scope)
                .or_default()
                .push((from_chain[shared], to_chain[shared]));
        }
        buckets
    }
}

/// Containment tree of a snapshot, verified acyclic
struct ScopeTree {
    roots: Vec<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Breadth-first from the roots; parents precede children
    order: Vec<NodeId>,
    depth: HashMap<NodeId, usize>,
}

impl ScopeTree {
    fn build(snapshot: &LayoutSnapshot) -> Result<Self, LayoutError> {
        let mut roots = Vec::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for (id, node) in &snapshot.nodes {
            match node.parent {
                Some(parent) if !snapshot.nodes.contains_key(&parent) => {
                    return Err(LayoutError::UnknownParent { node: *id, parent });
                }
                Some(parent) => children.entry(parent).or_default().push(*id),
                None => roots.push(*id),
            }
        }

        // Each node has one parent, so a walk from the roots visits every
        // node at most once and never reaches a node on a containment cycle.
        let mut order = roots.clone();
        let mut depth: HashMap<NodeId, usize> = roots.iter().map(|id| (*id, 0)).collect();
        let mut cursor = 0;
        while cursor < order.len() {
            let id = order[cursor];
            cursor += 1;
            let next_depth = depth[&id] + 1;
            for child in children.get(&id).into_iter().flatten() {
                depth.insert(*child, next_depth);
                order.push(*child);
            }
        }

        if order.len() < snapshot.len() {
            let stuck = snapshot
                .nodes
                .keys()
                .find(|id| !depth.contains_key(*id))
                .copied();
            if let Some(node) = stuck {
                return Err(LayoutError::LayoutCycle { node });
            }
        }

        Ok(Self {
            roots,
            children,
            order,
            depth,
        })
    }
}

/// Error from a layout run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The parent relation contains a cycle through this node
    #[error("Containment cycle through node {node}")]
    LayoutCycle {
        /// A node on or below the cycle
        node: NodeId,
    },

    /// A node names a parent missing from the snapshot
    #[error("Node {node} has unknown parent {parent}")]
    UnknownParent {
        /// Child node
        node: NodeId,
        /// Missing parent
        parent: NodeId,
    },

    /// A newer layout request superseded this one
    #[error("Layout superseded by a newer request")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use crate::node::{Node, NodeKind};
    use crate::scheduler::LayoutScheduler;

    const EPS: f32 = 1e-3;

    fn run(graph: &GraphStore, config: LayoutConfig) -> Layout {
        LayoutEngine::new(config)
            .run(&graph.snapshot(), &CancelToken::never())
            .unwrap()
    }

    fn connect(graph: &mut GraphStore, from: NodeId, to: NodeId) {
        let source = graph.node(from).unwrap().output("port").unwrap().id;
        let target = graph.node(to).unwrap().input("port").unwrap().id;
        graph.add_connection(source, target).unwrap();
    }

    /// The nested scene from the editor demo
    struct Scene {
        graph: GraphStore,
        parent1: NodeId,
        parent3: NodeId,
        a: NodeId,
        b: NodeId,
        b2: NodeId,
    }

    fn scene() -> Scene {
        let mut graph = GraphStore::new();
        let parent3 = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let parent1 = graph.add_node(Node::new(NodeKind::Parent).with_parent(parent3)).unwrap();
        let b2 = graph.add_node(Node::new(NodeKind::B).with_parent(parent3)).unwrap();
        let a = graph.add_node(Node::new(NodeKind::A).with_parent(parent1)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B).with_parent(parent1)).unwrap();
        connect(&mut graph, a, b);
        connect(&mut graph, parent1, b2);
        Scene {
            graph,
            parent1,
            parent3,
            a,
            b,
            b2,
        }
    }

    fn assert_contained(graph: &GraphStore, layout: &Layout, padding: f32) {
        for node in graph.nodes() {
            if let Some(parent) = node.parent {
                let outer = layout.rect(parent).unwrap().inset(padding);
                let inner = layout.rect(node.id).unwrap();
                assert!(outer.contains_rect(&inner, EPS), "{inner:?} escapes {outer:?}");
            }
        }
    }

    fn assert_separated(graph: &GraphStore, layout: &Layout, gap: f32) {
        let scope = graph.scope();
        let mut groups: Vec<Vec<NodeId>> = vec![scope.roots().to_vec()];
        groups.extend(graph.node_ids().map(|id| scope.children(id).to_vec()));
        for group in groups {
            for (i, first) in group.iter().enumerate() {
                for second in &group[i + 1..] {
                    let (r1, r2) = (layout.rect(*first).unwrap(), layout.rect(*second).unwrap());
                    assert!(r1.separation(&r2) >= gap - EPS, "{r1:?} too close to {r2:?}");
                }
            }
        }
    }

    #[test]
    fn test_empty_graph() {
        let layout = run(&GraphStore::new(), LayoutConfig::default());
        assert!(layout.is_empty());
        assert!(layout.bounds().is_none());
    }

    #[test]
    fn test_nested_scene() {
        let Scene {
            mut graph,
            parent1,
            parent3,
            a,
            b,
            b2,
        } = scene();
        let loose = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let config = LayoutConfig::default();
        let layout = run(&graph, config.clone());

        let p1 = layout.rect(parent1).unwrap().inset(config.padding);
        let p3 = layout.rect(parent3).unwrap().inset(config.padding);
        assert!(p1.contains_rect(&layout.rect(a).unwrap(), EPS));
        assert!(p1.contains_rect(&layout.rect(b).unwrap(), EPS));
        assert!(p3.contains_rect(&layout.rect(parent1).unwrap(), EPS));
        assert!(p3.contains_rect(&layout.rect(b2).unwrap(), EPS));
        let gap = layout.rect(parent3).unwrap().separation(&layout.rect(loose).unwrap());
        assert!(gap >= config.sibling_gap - EPS);

        // Sources sit left of their targets
        assert!(layout.rect(a).unwrap().x < layout.rect(b).unwrap().x);
        assert!(layout.rect(parent1).unwrap().x < layout.rect(b2).unwrap().x);

        assert_contained(&graph, &layout, config.padding);
        assert_separated(&graph, &layout, config.sibling_gap);
        assert_eq!(layout.depth(a), Some(2));
        assert_eq!(layout.draw_order()[0], parent3);
    }

    #[test]
    fn test_parent_grows_to_fit_children() {
        let Scene { graph, parent1, .. } = scene();
        let config = LayoutConfig::default();
        let layout = run(&graph, config.clone());

        // Two 180-wide children side by side
        let rect = layout.rect(parent1).unwrap();
        assert!((rect.width - (180.0 * 2.0 + config.sibling_gap + 2.0 * config.padding)).abs() < EPS);
        assert!((rect.height - (140.0 + 2.0 * config.padding)).abs() < EPS);
    }

    #[test]
    fn test_declared_size_is_a_minimum() {
        let mut graph = GraphStore::new();
        let big = graph
            .add_node(Node::new(NodeKind::Parent).with_size(1000.0, 800.0))
            .unwrap();
        graph.add_node(Node::new(NodeKind::A).with_parent(big)).unwrap();
        let layout = run(&graph, LayoutConfig::default());
        assert_eq!(layout.rect(big).unwrap().width, 1000.0);
        assert_eq!(layout.rect(big).unwrap().height, 800.0);
    }

    #[test]
    fn test_cross_scope_edge_lifted() {
        let mut graph = GraphStore::new();
        // b is inserted before a, so without the lifted edge it would come first
        let right = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let left = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B).with_parent(right)).unwrap();
        let a = graph.add_node(Node::new(NodeKind::A).with_parent(left)).unwrap();
        connect(&mut graph, a, b);

        let layout = run(&graph, LayoutConfig::default());
        assert!(layout.rect(left).unwrap().right() < layout.rect(right).unwrap().x);
        assert!(layout.rect(a).unwrap().x < layout.rect(b).unwrap().x);
    }

    #[test]
    fn test_edge_into_own_scope_ignored() {
        let Scene {
            mut graph,
            parent1,
            a,
            ..
        } = scene();
        let config = LayoutConfig::default();
        let before = run(&graph, config.clone());
        connect(&mut graph, parent1, a);
        let after = run(&graph, config.clone());

        assert!(before.iter().eq(after.iter()));
        assert_contained(&graph, &after, config.padding);
        assert_separated(&graph, &after, config.sibling_gap);
    }

    #[test]
    fn test_edge_out_of_nested_scope_lifted() {
        // parent3 holds b2 before parent1, so only the a -> b2 edge lifted
        // to parent1 -> b2 puts parent1 first
        let mut graph = GraphStore::new();
        let parent3 = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let b2 = graph.add_node(Node::new(NodeKind::B).with_parent(parent3)).unwrap();
        let parent1 = graph.add_node(Node::new(NodeKind::Parent).with_parent(parent3)).unwrap();
        let a = graph.add_node(Node::new(NodeKind::A).with_parent(parent1)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B).with_parent(parent1)).unwrap();
        connect(&mut graph, a, b);
        connect(&mut graph, a, b2);

        let config = LayoutConfig::default();
        let layout = run(&graph, config.clone());
        assert!(layout.rect(parent1).unwrap().right() < layout.rect(b2).unwrap().x);
        assert!(layout.rect(a).unwrap().x < layout.rect(b).unwrap().x);
        assert_contained(&graph, &layout, config.padding);
        assert_separated(&graph, &layout, config.sibling_gap);
    }

    #[test]
    fn test_connection_cycles_still_laid_out() {
        let mut graph = GraphStore::new();
        let p = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let q = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        connect(&mut graph, p, q);
        connect(&mut graph, q, p);
        let config = LayoutConfig::default();
        let layout = run(&graph, config.clone());
        assert_separated(&graph, &layout, config.sibling_gap);
    }

    #[test]
    fn test_deep_nesting_and_no_bias() {
        let mut graph = GraphStore::new();
        let mut parent = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        for depth in 0..5 {
            for _ in 0..=depth % 3 {
                graph.add_node(Node::new(NodeKind::B).with_parent(parent)).unwrap();
            }
            parent = graph.add_node(Node::new(NodeKind::Parent).with_parent(parent)).unwrap();
        }
        let config = LayoutConfig {
            padding: 12.0,
            sibling_gap: 7.0,
            direction_bias: DirectionBias::None,
        };
        let layout = run(&graph, config.clone());
        assert_contained(&graph, &layout, config.padding);
        assert_separated(&graph, &layout, config.sibling_gap);
    }

    #[test]
    fn test_deterministic() {
        let Scene { graph, .. } = scene();
        let first = run(&graph, LayoutConfig::default());
        let second = run(&graph, LayoutConfig::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_containment_cycle_fails() {
        let (x, y, z) = (NodeId::new(), NodeId::new(), NodeId::new());
        let mut snapshot = LayoutSnapshot::new();
        snapshot.add_node(z, None, 10.0, 10.0);
        snapshot.add_node(x, Some(y), 10.0, 10.0);
        snapshot.add_node(y, Some(x), 10.0, 10.0);

        let result = LayoutEngine::default().run(&snapshot, &CancelToken::never());
        assert!(matches!(result, Err(LayoutError::LayoutCycle { .. })));
    }

    #[test]
    fn test_unknown_parent_fails() {
        let (x, ghost) = (NodeId::new(), NodeId::new());
        let mut snapshot = LayoutSnapshot::new();
        snapshot.add_node(x, Some(ghost), 10.0, 10.0);
        let result = LayoutEngine::default().run(&snapshot, &CancelToken::never());
        assert_eq!(result, Err(LayoutError::UnknownParent { node: x, parent: ghost }));
    }

    #[test]
    fn test_superseded_run_is_cancelled() {
        let Scene { graph, .. } = scene();
        let mut scheduler = LayoutScheduler::new();
        let stale = scheduler.request(&graph);
        let _fresh = scheduler.request(&graph);
        let result = LayoutEngine::default().run(&stale.snapshot, &stale.cancel);
        assert_eq!(result, Err(LayoutError::Cancelled));
    }

    #[test]
    fn test_bounds_cover_all_nodes() {
        let Scene { graph, .. } = scene();
        let layout = run(&graph, LayoutConfig::default());
        let bounds = layout.bounds().unwrap();
        assert!(layout.iter().all(|(_, rect)| bounds.contains_rect(&rect, EPS)));
    }
}
