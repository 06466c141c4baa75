// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the fixed archetype schemas.

use crate::port::{Port, PortDirection, PortId, SocketType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default node width used by every archetype
pub const DEFAULT_NODE_WIDTH: f32 = 180.0;

/// Default node height used by every archetype
pub const DEFAULT_NODE_HEIGHT: f32 = 140.0;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node archetype.
///
/// Each variant carries a fixed port and control schema, see
/// [`NodeKind::schema`]. Adding an archetype means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Text source with a single output
    A,
    /// Text sink with a single input
    B,
    /// Scope container with one input and one output
    Parent,
}

/// Port declared by an archetype
#[derive(Debug, Clone, Copy)]
pub struct PortSpec {
    /// Port key
    pub key: &'static str,
    /// Port direction
    pub direction: PortDirection,
    /// Socket tag
    pub socket: &'static str,
}

/// Control declared by an archetype
#[derive(Debug, Clone, Copy)]
pub struct ControlSpec {
    /// Control key
    pub key: &'static str,
    /// Control widget
    pub kind: ControlKind,
    /// Initial value
    pub initial: &'static str,
}

/// Fixed schema of an archetype
#[derive(Debug, Clone, Copy)]
pub struct NodeSchema {
    /// Declared ports
    pub ports: &'static [PortSpec],
    /// Declared controls
    pub controls: &'static [ControlSpec],
}

const A_SCHEMA: NodeSchema = NodeSchema {
    ports: &[PortSpec {
        key: "port",
        direction: PortDirection::Output,
        socket: SocketType::DEFAULT,
    }],
    controls: &[ControlSpec {
        key: "a",
        kind: ControlKind::Text,
        initial: "a",
    }],
};

const B_SCHEMA: NodeSchema = NodeSchema {
    ports: &[PortSpec {
        key: "port",
        direction: PortDirection::Input,
        socket: SocketType::DEFAULT,
    }],
    controls: &[ControlSpec {
        key: "b",
        kind: ControlKind::Text,
        initial: "b",
    }],
};

const PARENT_SCHEMA: NodeSchema = NodeSchema {
    ports: &[
        PortSpec {
            key: "port",
            direction: PortDirection::Input,
            socket: SocketType::DEFAULT,
        },
        PortSpec {
            key: "port",
            direction: PortDirection::Output,
            socket: SocketType::DEFAULT,
        },
    ],
    controls: &[],
};

impl NodeKind {
    /// All archetypes, in palette order
    pub const ALL: [NodeKind; 3] = [NodeKind::A, NodeKind::B, NodeKind::Parent];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Parent => "Parent",
        }
    }

    /// Fixed port and control schema
    pub fn schema(&self) -> &'static NodeSchema {
        match self {
            Self::A => &A_SCHEMA,
            Self::B => &B_SCHEMA,
            Self::Parent => &PARENT_SCHEMA,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Error when a palette label names no archetype
#[derive(Debug, thiserror::Error)]
#[error("Unknown node kind: {0}")]
pub struct UnknownKind(pub String);

/// Control widget kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Free text input
    Text,
}

/// An editable control on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    /// Control key, unique within the node
    pub key: String,
    /// Widget kind
    pub kind: ControlKind,
    /// Current value
    pub value: String,
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Archetype
    pub kind: NodeKind,
    /// Enclosing scope, `None` for root-level nodes
    pub parent: Option<NodeId>,
    /// Declared width and height, the minimum box used by layout
    pub size: [f32; 2],
    /// Top-left position written by the last committed layout
    pub position: [f32; 2],
    /// Effective size from the last committed layout
    pub extent: Option<[f32; 2]>,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Controls
    pub controls: Vec<Control>,
}

impl Node {
    /// Create a new root-level node of the given archetype
    pub fn new(kind: NodeKind) -> Self {
        let id = NodeId::new();
        let schema = kind.schema();

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for spec in schema.ports {
            let socket = SocketType::new(spec.socket);
            match spec.direction {
                PortDirection::Input => inputs.push(Port::input(id, spec.key, socket)),
                PortDirection::Output => outputs.push(Port::output(id, spec.key, socket)),
            }
        }

        let controls = schema
            .controls
            .iter()
            .map(|spec| Control {
                key: spec.key.to_string(),
                kind: spec.kind,
                value: spec.initial.to_string(),
            })
            .collect();

        Self {
            id,
            kind,
            parent: None,
            size: [DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT],
            position: [0.0, 0.0],
            extent: None,
            inputs,
            outputs,
            controls,
        }
    }

    /// Nest inside `parent`
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the declared size
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = [width, height];
        self
    }

    /// Declared width
    pub fn width(&self) -> f32 {
        self.size[0]
    }

    /// Declared height
    pub fn height(&self) -> f32 {
        self.size[1]
    }

    /// Input port by key
    pub fn input(&self, key: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.key == key)
    }

    /// Output port by key
    pub fn output(&self, key: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.key == key)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports().find(|p| p.id == *port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Get a control by key
    pub fn control(&self, key: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.key == key)
    }

    /// Set a control value, returning `false` if the key is unknown
    pub fn set_control(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.controls.iter_mut().find(|c| c.key == key) {
            Some(control) => {
                control.value = value.into();
                true
            }
            None => false,
        }
    }

    /// First port whose id repeats an earlier port of this node
    pub(crate) fn duplicate_port_id(&self) -> Option<&Port> {
        let mut seen = HashSet::new();
        self.ports().find(|port| !seen.insert(port.id))
    }

    /// First port key that appears twice within one direction
    pub(crate) fn duplicate_port_key(&self) -> Option<&str> {
        [&self.inputs, &self.outputs].into_iter().find_map(|ports| {
            ports.iter().enumerate().find_map(|(i, port)| {
                ports[..i]
                    .iter()
                    .any(|earlier| earlier.key == port.key)
                    .then_some(port.key.as_str())
            })
        })
    }
}

/// Catalog of creatable archetypes, keyed by palette label.
///
/// This is what an "add node" context menu lists.
pub struct NodeCatalog {
    kinds: indexmap::IndexMap<&'static str, NodeKind>,
}

impl NodeCatalog {
    /// Catalog holding every built-in archetype
    pub fn new() -> Self {
        Self {
            kinds: NodeKind::ALL.into_iter().map(|k| (k.label(), k)).collect(),
        }
    }

    /// Palette labels in order
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }

    /// Build a fresh node from a palette label
    pub fn create_node(&self, label: &str) -> Option<Node> {
        self.kinds.get(label).map(|kind| Node::new(*kind))
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::new()
    }
}
