// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout request sequencing.
//!
//! Every layout request gets a sequence number. Issuing a new request
//! cancels the older ones, and only the latest issued result is ever
//! applied to the graph, no matter in which order results come back.

use crate::graph::GraphStore;
use crate::layout::{Layout, LayoutSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cancellation flag for one layout request
#[derive(Debug, Clone)]
pub struct CancelToken {
    sequence: u64,
    latest: Arc<AtomicU64>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        Self {
            sequence: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sequence number of the request this token belongs to
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether a newer request has been issued
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::Acquire) != self.sequence
    }
}

/// A layout request ready to be run, possibly on another thread
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    /// Sequence number
    pub sequence: u64,
    /// Graph state to lay out
    pub snapshot: LayoutSnapshot,
    /// Cancellation flag
    pub cancel: CancelToken,
}

/// Issues layout requests and gates their results
#[derive(Debug, Default)]
pub struct LayoutScheduler {
    latest: Arc<AtomicU64>,
    committed: u64,
}

impl LayoutScheduler {
    /// Create a scheduler with no requests issued
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `graph` under a new sequence number, superseding every
    /// earlier request
    pub fn request(&mut self, graph: &GraphStore) -> LayoutRequest {
        let sequence = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(sequence, revision = graph.revision(), "Layout requested");
        LayoutRequest {
            sequence,
            snapshot: graph.snapshot(),
            cancel: CancelToken {
                sequence,
                latest: Arc::clone(&self.latest),
            },
        }
    }

    /// Latest issued sequence number, 0 before the first request
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Sequence number of the last applied result
    pub fn committed(&self) -> u64 {
        self.committed
    }

    /// Whether a result for `sequence` would still be applied
    pub fn is_current(&self, sequence: u64) -> bool {
        sequence == self.latest() && sequence > self.committed
    }

    /// Apply `layout` if it answers the latest request and the graph has not
    /// changed since its snapshot was taken.
    ///
    /// Returns `false` and leaves the graph alone otherwise; after a refused
    /// result for an edited graph the caller requests a fresh layout.
    pub fn commit(&mut self, graph: &mut GraphStore, sequence: u64, layout: &Layout) -> bool {
        if !self.is_current(sequence) {
            tracing::debug!(sequence, latest = self.latest(), "Discarded stale layout");
            return false;
        }
        if layout.revision() != graph.revision() {
            tracing::debug!(
                sequence,
                layout_revision = layout.revision(),
                graph_revision = graph.revision(),
                "Discarded layout of an outdated graph"
            );
            return false;
        }
        let applied = graph.apply_layout(layout);
        self.committed = sequence;
        tracing::debug!(sequence, applied, "Committed layout");
        true
    }
}
