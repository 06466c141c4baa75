// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scope Editor - scoped node graph session runner
//!
//! Builds the demo graph, lays it out on a background worker and prints the
//! committed result. Rendering and input belong to the embedding UI; this
//! binary is the assembly step that wires the core components together.

mod app;
mod cli;
mod scene;
mod worker;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("scope_editor=debug,scope_editor_graph=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Scope Editor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = app::run(&args) {
        tracing::error!("Session failed: {e:#}");
        std::process::exit(1);
    }
}
