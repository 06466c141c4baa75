// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connections between an output port and an input port.

use crate::node::NodeId;
use crate::port::{Port, PortId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed edge from an output port to an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Node owning the output port
    pub from_node: NodeId,
    /// Output port
    pub from_port: PortId,
    /// Node owning the input port
    pub to_node: NodeId,
    /// Input port
    pub to_port: PortId,
}

impl Connection {
    /// Connect `source` (an output) to `target` (an input)
    pub fn between(source: &Port, target: &Port) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node: source.node,
            from_port: source.id,
            to_node: target.node,
            to_port: target.id,
        }
    }

    /// Whether either endpoint belongs to `node_id`
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Whether either endpoint belongs to a node in `nodes`
    pub fn touches_any(&self, nodes: &HashSet<NodeId>) -> bool {
        nodes.contains(&self.from_node) || nodes.contains(&self.to_node)
    }

    /// Whether either endpoint is `port_id`
    pub fn involves_port(&self, port_id: PortId) -> bool {
        self.from_port == port_id || self.to_port == port_id
    }
}
