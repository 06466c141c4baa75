// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor assembly.
//!
//! Wires the graph store, selection, layout engine and layout scheduler
//! together. UI intent handlers talk to this type; rendering reads the
//! graph and selection back through it.

use crate::config::EditorConfig;
use crate::connection::ConnectionId;
use crate::graph::{GraphStore, Removal, Result};
use crate::layout::{Layout, LayoutEngine, LayoutError};
use crate::node::{Node, NodeId};
use crate::port::PortId;
use crate::scheduler::{CancelToken, LayoutRequest, LayoutScheduler};
use crate::selection::{AccumulatePolicy, Modifiers, SelectionManager};
use crate::validation::{ConnectionRejection, ConnectionValidator};

/// A scoped graph editor
#[derive(Debug)]
pub struct Editor {
    graph: GraphStore,
    selection: SelectionManager,
    engine: LayoutEngine,
    scheduler: LayoutScheduler,
    accumulate: AccumulatePolicy,
}

impl Editor {
    /// Create an empty editor
    pub fn new(config: EditorConfig) -> Self {
        Self {
            graph: GraphStore::with_validator(ConnectionValidator::new(config.sockets)),
            selection: SelectionManager::new(),
            engine: LayoutEngine::new(config.layout),
            scheduler: LayoutScheduler::new(),
            accumulate: config.accumulate,
        }
    }

    /// Read-only graph
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Read-only selection
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Layout engine in use
    pub fn engine(&self) -> &LayoutEngine {
        &self.engine
    }

    /// Add a node
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        self.graph.add_node(node)
    }

    /// Remove a node and its scope, pruning the selection
    pub fn remove_node(&mut self, id: NodeId) -> Result<Removal> {
        let removal = self.graph.remove_node(id)?;
        self.selection.prune(&removal);
        Ok(removal)
    }

    /// Remove every selected node
    pub fn remove_selected(&mut self) -> Vec<Removal> {
        let selected: Vec<NodeId> = self.selection.iter().collect();
        let mut removals = Vec::new();
        for id in selected {
            // Already gone if an earlier selected ancestor took it out
            if let Ok(removal) = self.remove_node(id) {
                removals.push(removal);
            }
        }
        removals
    }

    /// Connect an output to an input
    pub fn add_connection(&mut self, source: PortId, target: PortId) -> Result<ConnectionId> {
        self.graph.add_connection(source, target)
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, id: ConnectionId) -> Result<()> {
        self.graph.remove_connection(id).map(|_| ())
    }

    /// Move a node into another scope
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.graph.reparent(id, parent)
    }

    /// Set a control value
    pub fn set_control(&mut self, id: NodeId, key: &str, value: impl Into<String>) -> Result<()> {
        self.graph.set_control(id, key, value)
    }

    /// Pre-flight check for a connection drag
    pub fn can_connect(&self, source: PortId, target: PortId) -> std::result::Result<(), ConnectionRejection> {
        self.graph.validator().can_connect(&self.graph, source, target)
    }

    /// Click on a node with an explicit accumulating flag
    pub fn pick(&mut self, id: NodeId, accumulating: bool) -> Result<()> {
        self.selection.pick(&self.graph, id, accumulating)
    }

    /// Click on a node with pointer modifiers
    pub fn click(&mut self, id: NodeId, modifiers: Modifiers) -> Result<()> {
        let accumulating = self.accumulate.accumulating(modifiers);
        self.pick(id, accumulating)
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Start a layout that may run elsewhere; see [`Editor::commit_layout`]
    pub fn request_layout(&mut self) -> LayoutRequest {
        self.scheduler.request(&self.graph)
    }

    /// Apply a finished layout if no newer request was issued
    pub fn commit_layout(&mut self, sequence: u64, layout: &Layout) -> bool {
        self.scheduler.commit(&mut self.graph, sequence, layout)
    }

    /// Lay out and apply synchronously
    pub fn layout_now(&mut self) -> std::result::Result<Layout, LayoutError> {
        let request = self.request_layout();
        let layout = self.engine.run(&request.snapshot, &request.cancel)?;
        self.commit_layout(request.sequence, &layout);
        Ok(layout)
    }

    /// Lay out without touching the graph
    pub fn preview_layout(&self) -> std::result::Result<Layout, LayoutError> {
        self.engine.run(&self.graph.snapshot(), &CancelToken::never())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
