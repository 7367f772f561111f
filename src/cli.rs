use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::tree::MAX_PERMISSION;

/// File-backed hierarchical task tracker.
/// Tasks are addressed by dot-separated paths such as `tower.floor1`.
#[derive(Parser)]
#[command(name = "mcdtask", version, about = "Hierarchical task tracking for game servers")]
pub struct Cli {
    /// Data folder holding mc_task.json, responsible.json and config.json.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Player issuing the command; default target of responsible/unresponsible/player.
    #[arg(long = "as", global = true, value_name = "PLAYER")]
    pub player: Option<String>,

    /// Permission level of the caller, checked against the config's permission table.
    #[arg(long, global = true, default_value_t = MAX_PERMISSION)]
    pub level: u8,

    #[command(subcommand)]
    pub command: Commands,
}
