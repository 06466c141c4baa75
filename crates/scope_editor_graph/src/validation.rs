// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection validation.
//!
//! The validator is a pure decision function. The graph store consults it
//! before committing a connection, and UI code can call it directly to
//! highlight legal drop targets while a connection is being dragged.

use crate::graph::GraphStore;
use crate::port::{Port, PortId, SocketType};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Declared compatibility between socket tags.
///
/// Identical tags always connect. Each extra pair allows an output with the
/// first tag to feed an input with the second.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocketCompatibility {
    /// Allowed `(output, input)` tag pairs beyond identity
    #[serde(default)]
    pub pairs: IndexSet<(SocketType, SocketType)>,
}

impl SocketCompatibility {
    /// Identity matching only
    pub fn identity() -> Self {
        Self::default()
    }

    /// Allow `from` outputs to feed `to` inputs
    pub fn allow(mut self, from: impl Into<SocketType>, to: impl Into<SocketType>) -> Self {
        self.pairs.insert((from.into(), to.into()));
        self
    }

    /// Whether an output tagged `from` may feed an input tagged `to`
    pub fn is_compatible(&self, from: &SocketType, to: &SocketType) -> bool {
        from == to || self.pairs.contains(&(from.clone(), to.clone()))
    }
}

/// Reason a candidate connection was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionRejection {
    /// Source is not an output or target is not an input
    #[error("Connection must run from an output to an input")]
    WrongDirection,

    /// Both ports belong to the same node
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Socket tags are incompatible
    #[error("Incompatible sockets: {from} -> {to}")]
    TypeMismatch {
        /// Source socket tag
        from: SocketType,
        /// Target socket tag
        to: SocketType,
    },

    /// Target input already has an incoming connection
    #[error("Input port already connected")]
    PortOccupied,

    /// One of the ports does not exist
    #[error("Port not found: {0:?}")]
    UnknownPort(PortId),
}

/// Decides whether a connection between two ports is legal
#[derive(Debug, Clone, Default)]
pub struct ConnectionValidator {
    sockets: SocketCompatibility,
}

impl ConnectionValidator {
    /// Create a validator with the given socket compatibility rules
    pub fn new(sockets: SocketCompatibility) -> Self {
        Self { sockets }
    }

    /// Socket compatibility rules in use
    pub fn sockets(&self) -> &SocketCompatibility {
        &self.sockets
    }

    /// Check a candidate connection between two resolved ports.
    ///
    /// Rules apply in order: direction, self-loop, socket type, occupancy.
    pub fn check(
        &self,
        source: &Port,
        target: &Port,
        target_occupied: bool,
    ) -> Result<(), ConnectionRejection> {
        if !source.is_output() || !target.is_input() {
            return Err(ConnectionRejection::WrongDirection);
        }
        if source.node == target.node {
            return Err(ConnectionRejection::SelfLoop);
        }
        if !self.sockets.is_compatible(&source.socket, &target.socket) {
            return Err(ConnectionRejection::TypeMismatch {
                from: source.socket.clone(),
                to: target.socket.clone(),
            });
        }
        if target_occupied {
            return Err(ConnectionRejection::PortOccupied);
        }
        Ok(())
    }

    /// Check a candidate connection against the current graph
    pub fn can_connect(
        &self,
        graph: &GraphStore,
        source: PortId,
        target: PortId,
    ) -> Result<(), ConnectionRejection> {
        let source_port = graph
            .port(source)
            .ok_or(ConnectionRejection::UnknownPort(source))?;
        let target_port = graph
            .port(target)
            .ok_or(ConnectionRejection::UnknownPort(target))?;
        self.check(source_port, target_port, graph.is_port_occupied(target))
    }
}
