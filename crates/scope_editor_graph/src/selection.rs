// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node selection with accumulate semantics.

use crate::graph::{GraphError, GraphStore, Removal};
use crate::node::NodeId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Pointer modifier state accompanying a pointer intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Control (or command) held
    pub ctrl: bool,
    /// Shift held
    pub shift: bool,
}

/// Which modifier turns a click into an accumulating click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccumulatePolicy {
    /// Accumulate while ctrl is held
    #[default]
    OnCtrl,
    /// Accumulate while shift is held
    OnShift,
    /// Every click replaces the selection
    Never,
}

impl AccumulatePolicy {
    /// Whether a click with `modifiers` accumulates
    pub fn accumulating(&self, modifiers: Modifiers) -> bool {
        match self {
            Self::OnCtrl => modifiers.ctrl,
            Self::OnShift => modifiers.shift,
            Self::Never => false,
        }
    }
}

/// The set of selected nodes
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: IndexSet<NodeId>,
}

impl SelectionManager {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_exists(graph: &GraphStore, id: NodeId) -> Result<(), GraphError> {
        if graph.contains_node(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    /// Replace the selection with `{id}`
    pub fn select_only(&mut self, graph: &GraphStore, id: NodeId) -> Result<(), GraphError> {
        Self::ensure_exists(graph, id)?;
        self.selected.clear();
        self.selected.insert(id);
        Ok(())
    }

    /// Add `id` if absent, remove it if present
    pub fn toggle(&mut self, graph: &GraphStore, id: NodeId) -> Result<(), GraphError> {
        Self::ensure_exists(graph, id)?;
        if !self.selected.shift_remove(&id) {
            self.selected.insert(id);
        }
        Ok(())
    }

    /// Handle a click on `id`
    pub fn pick(&mut self, graph: &GraphStore, id: NodeId, accumulating: bool) -> Result<(), GraphError> {
        if accumulating {
            self.toggle(graph, id)
        } else {
            self.select_only(graph, id)
        }
    }

    /// Empty the selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop every node a removal took out
    pub fn prune(&mut self, removal: &Removal) {
        self.selected.retain(|id| !removal.contains_node(*id));
    }

    /// Drop every id the graph no longer holds
    pub fn retain_existing(&mut self, graph: &GraphStore) {
        self.selected.retain(|id| graph.contains_node(*id));
    }

    /// Whether a node is selected
    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected nodes, in selection order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected.iter().copied()
    }

    /// Number of selected nodes
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};

    fn two_nodes() -> (GraphStore, NodeId, NodeId) {
        let mut graph = GraphStore::new();
        let x = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let y = graph.add_node(Node::new(NodeKind::B)).unwrap();
        (graph, x, y)
    }

    #[test]
    fn test_pick_replaces_without_accumulating() {
        let (graph, x, y) = two_nodes();
        let mut selection = SelectionManager::new();
        selection.pick(&graph, y, false).unwrap();
        selection.pick(&graph, x, false).unwrap();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![x]);
    }

    #[test]
    fn test_pick_accumulates() {
        let (graph, x, y) = two_nodes();
        let mut selection = SelectionManager::new();
        selection.pick(&graph, y, false).unwrap();
        selection.pick(&graph, x, true).unwrap();
        assert!(selection.contains(x) && selection.contains(y));
        assert_eq!(selection.len(), 2);

        // Accumulating click on a selected node deselects only that node
        selection.pick(&graph, y, true).unwrap();
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![x]);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let (graph, x, _) = two_nodes();
        let mut selection = SelectionManager::new();
        selection.select_only(&graph, x).unwrap();
        let ghost = NodeId::new();
        assert_eq!(selection.toggle(&graph, ghost), Err(GraphError::UnknownNode(ghost)));
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![x]);
    }

    #[test]
    fn test_prune_and_retain() {
        let (mut graph, x, y) = two_nodes();
        let mut selection = SelectionManager::new();
        selection.pick(&graph, x, true).unwrap();
        selection.pick(&graph, y, true).unwrap();

        let removal = graph.remove_node(x).unwrap();
        selection.prune(&removal);
        assert!(!selection.contains(x));

        graph.remove_node(y).unwrap();
        selection.retain_existing(&graph);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_accumulate_policy() {
        let ctrl = Modifiers { ctrl: true, shift: false };
        assert!(AccumulatePolicy::OnCtrl.accumulating(ctrl));
        assert!(!AccumulatePolicy::OnShift.accumulating(ctrl));
        assert!(!AccumulatePolicy::Never.accumulating(Modifiers { ctrl: true, shift: true }));
    }
}
