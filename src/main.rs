//! `mcdtask` - command-line front end for the task tree.
//!
//! ```bash
//! mcdtask add tower.floor1 glass walls
//! mcdtask responsible tower.floor1 Steve Alex
//! mcdtask deadline tower 2
//! mcdtask list --show all --sort deadline
//! mcdtask detail tower
//! ```

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcd_task::cli::Cli;
use mcd_task::cmd::{self, Commands};

fn main() {
    // RUST_LOG overrides; warnings only by default so stdout stays clean.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    // Completions need no data folder.
    if let Commands::Completions { shell } = cli.command {
        cmd::cmd_completions(shell);
        return;
    }

    if let Err(e) = cmd::run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
