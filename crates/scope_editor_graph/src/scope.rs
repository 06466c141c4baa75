// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scope (containment) index.
//!
//! Parent pointers live on the nodes themselves; this index mirrors them as
//! ordered child lists so that scope queries never scan the whole graph.
//! The graph store keeps it in step with every mutation.

use crate::node::NodeId;
use std::collections::{HashMap, HashSet};

/// Parent → children index over the nodes of a graph
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    /// Parent of every indexed node
    parents: HashMap<NodeId, Option<NodeId>>,
    /// Direct children, in the order they entered the scope
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Root-level nodes, in insertion order
    roots: Vec<NodeId>,
}

impl ScopeIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(node, parent)` pairs in insertion order
    pub fn from_parents(entries: impl IntoIterator<Item = (NodeId, Option<NodeId>)>) -> Self {
        let mut index = Self::new();
        for (id, parent) in entries {
            index.insert(id, parent);
        }
        index
    }

    pub(crate) fn insert(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.parents.insert(id, parent);
        self.children.entry(id).or_default();
        self.attach(id, parent);
    }

    /// Drop a node from the index. Its children must already be gone.
    pub(crate) fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.parents.remove(&id) {
            self.detach(id, parent);
        }
        self.children.remove(&id);
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        let Some(old) = self.parents.insert(id, parent) else {
            return;
        };
        self.detach(id, old);
        self.attach(id, parent);
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(parent) => self.children.entry(parent).or_default().push(id),
            None => self.roots.push(id),
        }
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
    }

    /// Whether the node is indexed
    pub fn contains(&self, id: NodeId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Number of indexed nodes
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Root-level nodes in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Direct children of `id`, in the order they entered the scope
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parent of `id`, `None` for roots and unknown nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied().flatten()
    }

    /// Walk from the parent of `id` up to its root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            next: self.parent(id),
            remaining: self.parents.len(),
        }
    }

    /// Whether `candidate` is a strict ancestor of `id`
    pub fn is_ancestor(&self, candidate: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == candidate)
    }

    /// Scope nesting depth; roots are 0
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// All descendants of `id` in pre-order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Compare parent and child relations with `other`, ignoring child order
    pub(crate) fn same_relations(&self, other: &ScopeIndex) -> bool {
        let as_set = |ids: &[NodeId]| ids.iter().copied().collect::<HashSet<_>>();
        self.parents == other.parents
            && as_set(&self.roots) == as_set(&other.roots)
            && self
                .parents
                .keys()
                .all(|id| as_set(self.children(*id)) == as_set(other.children(*id)))
    }
}

/// Iterator over the ancestors of a node, nearest first
pub struct Ancestors<'a> {
    index: &'a ScopeIndex,
    next: Option<NodeId>,
    /// Bounds the walk if the parent relation were ever cyclic
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        assert!(self.remaining > 0, "scope index contains a containment cycle");
        self.remaining -= 1;
        self.next = self.index.parent(current);
        Some(current)
    }
}
