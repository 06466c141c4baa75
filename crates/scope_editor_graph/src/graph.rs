// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store: the single owner of nodes, ports and connections.

use crate::connection::{Connection, ConnectionId};
use crate::layout::{Layout, LayoutSnapshot};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortId};
use crate::scope::ScopeIndex;
use crate::validation::{ConnectionRejection, ConnectionValidator};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Result type for graph mutations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Everything removed by a cascading node removal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removal {
    /// Removed nodes: the requested node first, then its descendants
    pub nodes: Vec<NodeId>,
    /// Removed connections
    pub connections: Vec<ConnectionId>,
}

impl Removal {
    /// Whether `id` was removed
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }
}

/// A scoped node graph.
///
/// Every mutation is validated before anything is written, so a rejected
/// call leaves the store untouched.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Connections in insertion order
    connections: IndexMap<ConnectionId, Connection>,
    /// Owner of every registered port
    ports: HashMap<PortId, NodeId>,
    /// Incoming connection of every occupied input
    incoming: HashMap<PortId, ConnectionId>,
    /// Containment index mirroring node parents
    scope: ScopeIndex,
    /// Connection rules
    validator: ConnectionValidator,
    /// Bumped on every committed mutation
    revision: u64,
}

impl GraphStore {
    /// Create an empty graph with identity socket matching
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph using the given connection rules
    pub fn with_validator(validator: ConnectionValidator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// Add a node and register its ports
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        if let Some(parent) = node.parent {
            if !self.nodes.contains_key(&parent) {
                return Err(GraphError::UnknownNode(parent));
            }
        }
        if let Some(key) = node.duplicate_port_key() {
            return Err(GraphError::DuplicatePort(key.to_string()));
        }
        if let Some(port) = node.ports().find(|p| p.node != id) {
            return Err(GraphError::ForeignPort(port.id));
        }
        if let Some(port) = node.duplicate_port_id() {
            return Err(GraphError::DuplicatePort(port.key.clone()));
        }
        if let Some(port) = node.ports().find(|p| self.ports.contains_key(&p.id)) {
            return Err(GraphError::DuplicatePort(port.key.clone()));
        }

        for port in node.ports() {
            self.ports.insert(port.id, id);
        }
        self.scope.insert(id, node.parent);
        tracing::debug!(node = %id, kind = %node.kind, parent = ?node.parent, "Added node");
        self.nodes.insert(id, node);
        self.commit();
        Ok(id)
    }

    /// Remove a node, every descendant and every connection touching them
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Removal> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::UnknownNode(node_id));
        }

        let mut removed = vec![node_id];
        removed.extend(self.scope.descendants(node_id));
        let removed_set: HashSet<NodeId> = removed.iter().copied().collect();

        let connections: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.touches_any(&removed_set))
            .map(|c| c.id)
            .collect();
        for connection_id in &connections {
            self.drop_connection(*connection_id);
        }

        // Leaves first so the scope index never holds an orphan
        for id in removed.iter().rev() {
            self.scope.remove(*id);
            if let Some(node) = self.nodes.shift_remove(id) {
                for port in node.ports() {
                    self.ports.remove(&port.id);
                }
            }
        }

        tracing::debug!(
            node = %node_id,
            nodes = removed.len(),
            connections = connections.len(),
            "Removed node"
        );
        self.commit();
        Ok(Removal {
            nodes: removed,
            connections,
        })
    }

    /// Connect an output port to an input port
    pub fn add_connection(&mut self, source: PortId, target: PortId) -> Result<ConnectionId> {
        let source_port = self.port(source).ok_or(GraphError::UnknownPort(source))?;
        let target_port = self.port(target).ok_or(GraphError::UnknownPort(target))?;

        let connection = match self.validator.check(
            source_port,
            target_port,
            self.is_port_occupied(target),
        ) {
            Ok(()) => Connection::between(source_port, target_port),
            Err(ConnectionRejection::PortOccupied) => {
                tracing::warn!(port = ?target, "Rejected connection: input occupied");
                return Err(GraphError::PortOccupied(target));
            }
            Err(reason) => {
                tracing::warn!(%reason, "Rejected connection");
                return Err(GraphError::InvalidConnection(reason));
            }
        };

        let id = connection.id;
        tracing::debug!(
            connection = %id,
            from = %connection.from_node,
            to = %connection.to_node,
            "Added connection"
        );
        self.incoming.insert(target, id);
        self.connections.insert(id, connection);
        self.commit();
        Ok(id)
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Result<Connection> {
        let connection = self
            .drop_connection(connection_id)
            .ok_or(GraphError::UnknownConnection(connection_id))?;
        tracing::debug!(connection = %connection_id, "Removed connection");
        self.commit();
        Ok(connection)
    }

    fn drop_connection(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&connection_id)?;
        self.incoming.remove(&connection.to_port);
        Some(connection)
    }

    /// Move a node into another scope, or to the root with `None`
    pub fn reparent(&mut self, node_id: NodeId, new_parent: Option<NodeId>) -> Result<()> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::UnknownNode(node_id));
        }
        if let Some(parent) = new_parent {
            if !self.nodes.contains_key(&parent) {
                return Err(GraphError::UnknownNode(parent));
            }
            if parent == node_id || self.scope.is_ancestor(node_id, parent) {
                return Err(GraphError::CycleDetected {
                    node: node_id,
                    parent,
                });
            }
        }

        if let Some(node) = self.nodes.get_mut(&node_id) {
            if node.parent == new_parent {
                return Ok(());
            }
            node.parent = new_parent;
        }
        self.scope.set_parent(node_id, new_parent);
        tracing::debug!(node = %node_id, parent = ?new_parent, "Reparented node");
        self.commit();
        Ok(())
    }

    /// Set a control value on a node
    pub fn set_control(&mut self, node_id: NodeId, key: &str, value: impl Into<String>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::UnknownNode(node_id))?;
        if !node.set_control(key, value) {
            return Err(GraphError::UnknownControl(key.to_string()));
        }
        self.commit();
        Ok(())
    }

    fn commit(&mut self) {
        self.revision += 1;
        #[cfg(debug_assertions)]
        self.check_invariants();
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Whether a node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        let owner = self.ports.get(&port_id)?;
        self.nodes.get(owner)?.port(&port_id)
    }

    /// Whether an input already has an incoming connection
    pub fn is_port_occupied(&self, port_id: PortId) -> bool {
        self.incoming.contains_key(&port_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// All connections in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections from a specific port
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_port == port_id)
    }

    /// Get the connection into a specific input
    pub fn connection_to(&self, port_id: PortId) -> Option<&Connection> {
        self.incoming
            .get(&port_id)
            .and_then(|id| self.connections.get(id))
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Read-only containment index
    pub fn scope(&self) -> &ScopeIndex {
        &self.scope
    }

    /// Connection rules used by this graph
    pub fn validator(&self) -> &ConnectionValidator {
        &self.validator
    }

    /// Mutation counter, bumped on every committed change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take an immutable copy of everything layout needs
    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot::new();
        for node in self.nodes.values() {
            snapshot.add_node(node.id, node.parent, node.width(), node.height());
        }
        for connection in self.connections.values() {
            snapshot.add_edge(connection.from_node, connection.to_node);
        }
        snapshot.with_revision(self.revision)
    }

    /// Write positions and extents from a finished layout.
    ///
    /// Nodes removed since the snapshot was taken are skipped. Returns the
    /// number of nodes updated.
    pub fn apply_layout(&mut self, layout: &Layout) -> usize {
        let mut applied = 0;
        for (id, rect) in layout.iter() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.position = [rect.x, rect.y];
                node.extent = Some([rect.width, rect.height]);
                applied += 1;
            }
        }
        if applied < layout.len() {
            tracing::debug!(skipped = layout.len() - applied, "Layout referenced removed nodes");
        }
        self.revision += 1;
        applied
    }

    /// Verify the internal indexes against the node and connection tables.
    ///
    /// # Panics
    ///
    /// Panics if any index disagrees; that is a bug in this module, never a
    /// user error.
    pub fn check_invariants(&self) {
        let rebuilt = ScopeIndex::from_parents(self.nodes.values().map(|n| (n.id, n.parent)));
        assert!(
            rebuilt.same_relations(&self.scope),
            "scope index disagrees with node parents"
        );

        let port_total: usize = self.nodes.values().map(|n| n.ports().count()).sum();
        assert_eq!(port_total, self.ports.len(), "port index out of sync");

        for connection in self.connections.values() {
            assert!(
                self.port(connection.from_port).is_some() && self.port(connection.to_port).is_some(),
                "connection {} references a missing port",
                connection.id
            );
            assert_eq!(
                self.incoming.get(&connection.to_port),
                Some(&connection.id),
                "occupancy index out of sync"
            );
        }
        assert_eq!(self.incoming.len(), self.connections.len(), "stale occupancy entry");
    }
}

/// Error from a graph mutation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node ID already in use
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    /// Port key repeated within one direction, or port ID already registered
    #[error("Duplicate port: {0}")]
    DuplicatePort(String),

    /// A port of the added node names a different owner
    #[error("Port {0:?} belongs to another node")]
    ForeignPort(PortId),

    /// Node not found
    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    UnknownPort(PortId),

    /// Connection not found
    #[error("Connection not found: {0}")]
    UnknownConnection(ConnectionId),

    /// Control not found on the node
    #[error("Control not found: {0}")]
    UnknownControl(String),

    /// Validator rejected the connection
    #[error("Invalid connection: {0}")]
    InvalidConnection(ConnectionRejection),

    /// Input already has an incoming connection
    #[error("Port already connected: {0:?}")]
    PortOccupied(PortId),

    /// Reparenting would nest a node inside itself
    #[error("Moving {node} into {parent} would create a containment cycle")]
    CycleDetected {
        /// Node being moved
        node: NodeId,
        /// Requested parent
        parent: NodeId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::port::SocketType;

    fn out(graph: &GraphStore, id: NodeId) -> PortId {
        graph.node(id).unwrap().output("port").unwrap().id
    }

    fn inp(graph: &GraphStore, id: NodeId) -> PortId {
        graph.node(id).unwrap().input("port").unwrap().id
    }

    #[test]
    fn test_add_node_rejects_duplicates_and_missing_parent() {
        let mut graph = GraphStore::new();
        let node = Node::new(NodeKind::A);
        graph.add_node(node.clone()).unwrap();
        assert_eq!(graph.add_node(node.clone()), Err(GraphError::DuplicateId(node.id)));

        let ghost = NodeId::new();
        let orphan = Node::new(NodeKind::B).with_parent(ghost);
        assert_eq!(graph.add_node(orphan), Err(GraphError::UnknownNode(ghost)));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_node_rejects_duplicate_port_keys() {
        let mut graph = GraphStore::new();
        let mut node = Node::new(NodeKind::B);
        node.inputs.push(Port::input(node.id, "port", SocketType::default()));
        assert!(matches!(graph.add_node(node), Err(GraphError::DuplicatePort(_))));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_add_node_rejects_foreign_port_owner() {
        let mut graph = GraphStore::new();
        let mut node = Node::new(NodeKind::Parent);
        node.outputs[0].node = NodeId::new();
        let port = node.outputs[0].id;
        assert_eq!(graph.add_node(node), Err(GraphError::ForeignPort(port)));
        assert_eq!(graph.node_count(), 0);
        assert!(graph.port(port).is_none());

        // With the owner intact the self-loop is caught
        let p = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        assert_eq!(
            graph.add_connection(out(&graph, p), inp(&graph, p)),
            Err(GraphError::InvalidConnection(ConnectionRejection::SelfLoop))
        );
    }

    #[test]
    fn test_add_node_rejects_repeated_port_id() {
        let mut graph = GraphStore::new();
        let mut node = Node::new(NodeKind::B);
        let mut twin = node.inputs[0].clone();
        twin.key = "other".to_string();
        node.inputs.push(twin);
        assert!(matches!(graph.add_node(node), Err(GraphError::DuplicatePort(_))));
        assert_eq!(graph.node_count(), 0);
        graph.check_invariants();
    }

    #[test]
    fn test_nodes_in_insertion_order() {
        let mut graph = GraphStore::new();
        let ids: Vec<NodeId> = NodeKind::ALL
            .into_iter()
            .map(|kind| graph.add_node(Node::new(kind)).unwrap())
            .collect();
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), ids);
        // Restartable
        assert_eq!(graph.nodes().count(), graph.nodes().count());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut graph = GraphStore::new();
        let outer = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let inner = graph.add_node(Node::new(NodeKind::Parent).with_parent(outer)).unwrap();
        let a = graph.add_node(Node::new(NodeKind::A).with_parent(inner)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B)).unwrap();
        let keep = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let keep_b = graph.add_node(Node::new(NodeKind::B)).unwrap();

        let doomed = graph.add_connection(out(&graph, a), inp(&graph, b)).unwrap();
        let kept = graph.add_connection(out(&graph, keep), inp(&graph, keep_b)).unwrap();
        let a_port = out(&graph, a);

        let removal = graph.remove_node(outer).unwrap();
        assert_eq!(removal.nodes, vec![outer, inner, a]);
        assert_eq!(removal.connections, vec![doomed]);

        assert!(!graph.contains_node(inner) && !graph.contains_node(a));
        assert!(graph.port(a_port).is_none());
        assert!(graph.connection(kept).is_some());
        assert!(graph
            .connections()
            .all(|c| graph.port(c.from_port).is_some() && graph.port(c.to_port).is_some()));
        // The freed input accepts a new connection
        assert!(!graph.is_port_occupied(inp(&graph, b)));
        assert_eq!(graph.remove_node(outer), Err(GraphError::UnknownNode(outer)));
    }

    #[test]
    fn test_add_connection_errors() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let parent = graph.add_node(Node::new(NodeKind::Parent)).unwrap();

        let missing = PortId::new();
        assert_eq!(
            graph.add_connection(out(&graph, a), missing),
            Err(GraphError::UnknownPort(missing))
        );
        assert_eq!(
            graph.add_connection(out(&graph, parent), inp(&graph, parent)),
            Err(GraphError::InvalidConnection(ConnectionRejection::SelfLoop))
        );
        assert_eq!(
            graph.add_connection(inp(&graph, parent), out(&graph, a)),
            Err(GraphError::InvalidConnection(ConnectionRejection::WrongDirection))
        );
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_occupied_input_never_replaced() {
        let mut graph = GraphStore::new();
        let a1 = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let a2 = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B)).unwrap();
        let target = inp(&graph, b);

        let first = graph.add_connection(out(&graph, a1), target).unwrap();
        for source in [out(&graph, a2), out(&graph, a1)] {
            assert_eq!(
                graph.add_connection(source, target),
                Err(GraphError::PortOccupied(target))
            );
        }
        assert_eq!(graph.connection_to(target).map(|c| c.id), Some(first));

        // Outputs fan out
        let b2 = graph.add_node(Node::new(NodeKind::B)).unwrap();
        graph.add_connection(out(&graph, a1), inp(&graph, b2)).unwrap();
        assert_eq!(graph.connections_from(out(&graph, a1)).count(), 2);
    }

    #[test]
    fn test_remove_connection() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B)).unwrap();
        let id = graph.add_connection(out(&graph, a), inp(&graph, b)).unwrap();

        assert_eq!(graph.remove_connection(id).unwrap().id, id);
        assert_eq!(graph.remove_connection(id), Err(GraphError::UnknownConnection(id)));
        assert!(graph.add_connection(out(&graph, a), inp(&graph, b)).is_ok());
    }

    #[test]
    fn test_reparent_cycle_detection() {
        let mut graph = GraphStore::new();
        let x = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let child = graph.add_node(Node::new(NodeKind::Parent).with_parent(x)).unwrap();
        let grandchild = graph.add_node(Node::new(NodeKind::A).with_parent(child)).unwrap();
        let other = graph.add_node(Node::new(NodeKind::Parent)).unwrap();

        for target in [x, child, grandchild] {
            assert_eq!(
                graph.reparent(x, Some(target)),
                Err(GraphError::CycleDetected { node: x, parent: target })
            );
        }
        assert_eq!(graph.scope().parent(x), None);

        graph.reparent(x, Some(other)).unwrap();
        assert_eq!(graph.scope().children(other), &[x]);
        assert_eq!(graph.node(x).unwrap().parent, Some(other));
        assert_eq!(graph.scope().depth(grandchild), 3);

        graph.reparent(grandchild, None).unwrap();
        assert!(graph.scope().roots().contains(&grandchild));
        assert!(graph.scope().children(child).is_empty());
    }

    #[test]
    fn test_reparent_keeps_connections() {
        let mut graph = GraphStore::new();
        let p = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        let a = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let b = graph.add_node(Node::new(NodeKind::B)).unwrap();
        graph.add_connection(out(&graph, a), inp(&graph, b)).unwrap();

        graph.reparent(a, Some(p)).unwrap();
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.reparent(NodeId::new(), None).is_err());
    }

    #[test]
    fn test_set_control() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::new(NodeKind::A)).unwrap();
        graph.set_control(a, "a", "text").unwrap();
        assert_eq!(graph.node(a).unwrap().control("a").unwrap().value, "text");
        assert_eq!(
            graph.set_control(a, "b", "x"),
            Err(GraphError::UnknownControl("b".to_string()))
        );
    }

    #[test]
    fn test_apply_layout_skips_removed_nodes() {
        let mut graph = GraphStore::new();
        let p = graph.add_node(Node::new(NodeKind::Parent)).unwrap();
        graph.add_node(Node::new(NodeKind::A).with_parent(p)).unwrap();
        let layout = crate::layout::LayoutEngine::default()
            .run(&graph.snapshot(), &crate::scheduler::CancelToken::never())
            .unwrap();

        graph.remove_node(p).unwrap();
        let survivor = graph.add_node(Node::new(NodeKind::B)).unwrap();
        assert_eq!(graph.apply_layout(&layout), 0);
        assert_eq!(graph.node(survivor).unwrap().extent, None);
    }

    #[test]
    fn test_revision_only_moves_on_success() {
        let mut graph = GraphStore::new();
        let a = graph.add_node(Node::new(NodeKind::A)).unwrap();
        let before = graph.revision();
        assert!(graph.remove_node(NodeId::new()).is_err());
        assert_eq!(graph.revision(), before);
        graph.remove_node(a).unwrap();
        assert!(graph.revision() > before);
    }
}
