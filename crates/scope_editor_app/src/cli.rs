// SPDX-License-Identifier: MIT OR Apache-2.0
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scope_editor", version, about = "Lay out a scoped node graph")]
pub struct Args {
    /// Editor configuration file (RON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the committed layout as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    pub print_config: bool,
}
