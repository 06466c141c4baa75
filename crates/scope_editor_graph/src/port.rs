// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Socket type tag deciding which ports may be connected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketType(pub String);

impl SocketType {
    /// The socket shared by every built-in archetype
    pub const DEFAULT: &'static str = "socket";

    /// Create a socket tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SocketType {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SocketType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Owning node
    pub node: NodeId,
    /// Port key, unique per direction within the owning node
    pub key: String,
    /// Port direction
    pub direction: PortDirection,
    /// Socket type tag
    pub socket: SocketType,
}

impl Port {
    /// Create a new input port owned by `node`
    pub fn input(node: NodeId, key: impl Into<String>, socket: SocketType) -> Self {
        Self {
            id: PortId::new(),
            node,
            key: key.into(),
            direction: PortDirection::Input,
            socket,
        }
    }

    /// Create a new output port owned by `node`
    pub fn output(node: NodeId, key: impl Into<String>, socket: SocketType) -> Self {
        Self {
            id: PortId::new(),
            node,
            key: key.into(),
            direction: PortDirection::Output,
            socket,
        }
    }

    /// Whether this is an input port
    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    /// Whether this is an output port
    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_constructors() {
        let node = NodeId::new();
        let input = Port::input(node, "port", SocketType::default());
        let output = Port::output(node, "port", SocketType::default());

        assert!(input.is_input());
        assert!(output.is_output());
        assert_ne!(input.id, output.id);
        assert_eq!(input.socket.as_str(), "socket");
    }
}
