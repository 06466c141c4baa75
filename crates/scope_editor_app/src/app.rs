// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application assembly: config, editor, background layout and output.

use crate::cli::Args;
use crate::scene::{self, Scene};
use crate::worker::LayoutWorker;
use anyhow::{Context, Result};
use scope_editor_graph::{Editor, EditorConfig, Layout, LayoutError, Modifiers};

/// Run the editor session described by `args`
pub fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if args.print_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    let mut editor = Editor::new(config);
    let scene = scene::build(&mut editor)?;
    let mut worker = LayoutWorker::spawn(editor.engine().clone())?;

    // An edit lands while the first layout is queued; its result must lose
    // against the request issued after the edit.
    worker.submit(editor.request_layout())?;
    editor.set_control(scene.a, "a", "edited")?;
    let latest = editor.request_layout();
    let latest_sequence = latest.sequence;
    worker.submit(latest)?;

    let layout = await_latest(&mut editor, &mut worker, latest_sequence)?;

    // Click b2, then ctrl-click a
    editor.click(scene.b2, Modifiers::default())?;
    editor.click(scene.a, Modifiers { ctrl: true, shift: false })?;
    let selected: Vec<&str> = editor.selection().iter().map(|id| scene.name_of(id)).collect();
    tracing::info!(?selected, "Selection");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        print_summary(&editor, &scene, &layout);
    }
    Ok(())
}

/// Drain worker results until the one for `latest` is committed
fn await_latest(editor: &mut Editor, worker: &mut LayoutWorker, latest: u64) -> Result<Layout> {
    loop {
        let outcome = worker.next_blocking()?;
        match outcome.result {
            Ok(layout) => {
                if editor.commit_layout(outcome.sequence, &layout) {
                    return Ok(layout);
                }
                tracing::info!(sequence = outcome.sequence, "Discarded superseded layout");
            }
            Err(LayoutError::Cancelled) => {
                tracing::info!(sequence = outcome.sequence, "Layout cancelled");
            }
            Err(e) => return Err(e.into()),
        }
        if outcome.sequence >= latest {
            anyhow::bail!("Latest layout request {latest} was not committed");
        }
    }
}

fn print_summary(editor: &Editor, scene: &Scene, layout: &Layout) {
    for id in layout.draw_order() {
        let (Some(node), Some(rect)) = (editor.graph().node(id), layout.rect(id)) else {
            continue;
        };
        let depth = layout.depth(id).unwrap_or_default();
        println!(
            "{:indent$}{} ({}) at ({:.0}, {:.0}) size {:.0}x{:.0}",
            "",
            scene.name_of(id),
            node.kind,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            indent = depth * 2,
        );
    }
    if let Some(bounds) = layout.bounds() {
        println!(
            "fit view to ({:.0}, {:.0}) {:.0}x{:.0}",
            bounds.x, bounds.y, bounds.width, bounds.height
        );
    }
}
