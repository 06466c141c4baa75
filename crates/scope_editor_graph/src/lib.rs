// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scoped node graph core for the Scope Editor.
//!
//! Nodes can be nested inside other nodes ("scopes") and connected through
//! typed ports. This crate owns the data model and the algorithms around it:
//! - Graph store with containment and connection invariants
//! - Scope index (children, ancestry, depth)
//! - Connection validation for live drag feedback
//! - Scope-aware auto layout with cancellable, sequenced requests
//! - Node selection with accumulate semantics
//!
//! ## Architecture
//!
//! Rendering, camera and menus are external collaborators. They read the
//! graph through [`GraphStore`] and send intents through [`Editor`], which
//! wires the components together explicitly.

pub mod config;
pub mod connection;
pub mod editor;
pub mod graph;
pub mod layout;
pub mod node;
pub mod port;
pub mod scheduler;
pub mod scope;
pub mod selection;
pub mod validation;

pub use config::{ConfigError, EditorConfig};
pub use connection::{Connection, ConnectionId};
pub use editor::Editor;
pub use graph::{GraphError, GraphStore, Removal};
pub use layout::{DirectionBias, Layout, LayoutConfig, LayoutEngine, LayoutError, LayoutSnapshot, Rect};
pub use node::{Node, NodeCatalog, NodeId, NodeKind};
pub use port::{Port, PortDirection, PortId, SocketType};
pub use scheduler::{CancelToken, LayoutRequest, LayoutScheduler};
pub use scope::ScopeIndex;
pub use selection::{AccumulatePolicy, Modifiers, SelectionManager};
pub use validation::{ConnectionRejection, ConnectionValidator, SocketCompatibility};
