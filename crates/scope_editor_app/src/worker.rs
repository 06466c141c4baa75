// SPDX-License-Identifier: MIT OR Apache-2.0
//! Background layout worker.
//!
//! Layout requests are sent to a dedicated thread and results come back
//! tagged with their sequence number. Requests already superseded when the
//! worker picks them up are answered with `Cancelled` without running.

use scope_editor_graph::{Layout, LayoutEngine, LayoutError, LayoutRequest};
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result of one layout request
#[derive(Debug)]
pub struct LayoutOutcome {
    /// Sequence number of the request
    pub sequence: u64,
    /// Computed layout or the reason there is none
    pub result: Result<Layout, LayoutError>,
}

/// Worker errors
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread could not be started
    #[error("Failed to spawn layout worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The worker thread has exited
    #[error("Layout worker stopped")]
    Stopped,
}

/// Handle to the layout thread
pub struct LayoutWorker {
    request_tx: Option<mpsc::UnboundedSender<LayoutRequest>>,
    result_rx: mpsc::UnboundedReceiver<LayoutOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl LayoutWorker {
    /// Start the worker thread
    pub fn spawn(engine: LayoutEngine) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let handle = std::thread::Builder::new()
            .name("layout-worker".to_string())
            .spawn(move || layout_worker(engine, request_rx, result_tx))?;

        Ok(Self {
            request_tx: Some(request_tx),
            result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request
    pub fn submit(&self, request: LayoutRequest) -> Result<(), WorkerError> {
        let sender = self.request_tx.as_ref().ok_or(WorkerError::Stopped)?;
        sender.send(request).map_err(|_| WorkerError::Stopped)
    }

    /// Wait for the next finished result
    pub fn next_blocking(&mut self) -> Result<LayoutOutcome, WorkerError> {
        self.result_rx.blocking_recv().ok_or(WorkerError::Stopped)
    }
}

impl Drop for LayoutWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Layout worker panicked");
            }
        }
    }
}

fn layout_worker(
    engine: LayoutEngine,
    mut request_rx: mpsc::UnboundedReceiver<LayoutRequest>,
    result_tx: mpsc::UnboundedSender<LayoutOutcome>,
) {
    let rt = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create layout runtime: {e}");
            return;
        }
    };

    rt.block_on(async {
        while let Some(request) = request_rx.recv().await {
            let result = if request.cancel.is_cancelled() {
                tracing::debug!(sequence = request.sequence, "Skipping superseded layout");
                Err(LayoutError::Cancelled)
            } else {
                engine.run(&request.snapshot, &request.cancel)
            };
            let outcome = LayoutOutcome {
                sequence: request.sequence,
                result,
            };
            if result_tx.send(outcome).is_err() {
                break; // Channel closed
            }
        }
    });
}
