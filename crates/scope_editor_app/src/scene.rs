// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo scene: two nested scopes with a connection inside each.
//!
//! ```text
//! parent3
//! ├── parent1 ──► b2
//! │   └── a ──► b
//! └── b2
//! ```

use anyhow::{Context, Result};
use scope_editor_graph::{Editor, NodeCatalog, NodeId};

/// IDs of the demo nodes
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub parent1: NodeId,
    pub parent3: NodeId,
    pub a: NodeId,
    pub b: NodeId,
    pub b2: NodeId,
}

impl Scene {
    /// Display name of a demo node
    pub fn name_of(&self, id: NodeId) -> &'static str {
        match id {
            id if id == self.parent1 => "parent1",
            id if id == self.parent3 => "parent3",
            id if id == self.a => "a",
            id if id == self.b => "b",
            id if id == self.b2 => "b2",
            _ => "?",
        }
    }
}

/// Populate `editor` with the demo scene, creating nodes the way the
/// "add node" menu does
pub fn build(editor: &mut Editor) -> Result<Scene> {
    let catalog = NodeCatalog::new();
    let create = |label: &str| {
        catalog
            .create_node(label)
            .with_context(|| format!("Node kind {label} missing from catalog"))
    };

    let parent3 = editor.add_node(create("Parent")?)?;
    let parent1 = editor.add_node(create("Parent")?.with_parent(parent3))?;
    let b2 = editor.add_node(create("B")?.with_parent(parent3))?;
    let a = editor.add_node(create("A")?.with_parent(parent1))?;
    let b = editor.add_node(create("B")?.with_parent(parent1))?;

    let scene = Scene {
        parent1,
        parent3,
        a,
        b,
        b2,
    };
    connect(editor, scene.a, scene.b)?;
    connect(editor, scene.parent1, scene.b2)?;

    tracing::info!(
        nodes = editor.graph().node_count(),
        connections = editor.graph().connection_count(),
        "Built demo scene"
    );
    Ok(scene)
}

fn connect(editor: &mut Editor, from: NodeId, to: NodeId) -> Result<()> {
    let graph = editor.graph();
    let source = graph
        .node(from)
        .and_then(|n| n.output("port"))
        .context("Source has no output")?
        .id;
    let target = graph
        .node(to)
        .and_then(|n| n.input("port"))
        .context("Target has no input")?
        .id;
    editor.add_connection(source, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_structure() {
        let mut editor = Editor::default();
        let scene = build(&mut editor).unwrap();
        let scope = editor.graph().scope();

        assert_eq!(scope.roots(), &[scene.parent3]);
        assert_eq!(scope.children(scene.parent3), &[scene.parent1, scene.b2]);
        assert_eq!(scope.children(scene.parent1), &[scene.a, scene.b]);
        assert_eq!(editor.graph().connection_count(), 2);
        assert_eq!(scene.name_of(scene.b2), "b2");
    }
}
