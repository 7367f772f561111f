//! Command implementations for the CLI interface.
//!
//! Each handler parses its path argument, calls one `TaskTree` operation and
//! prints the result. Errors bubble up to `main`, which prints them and exits.

use clap::Subcommand;
use clap_complete::{generate, Shell};
use std::path::Path;

use crate::cli::Cli;
use crate::context::TaskContext;
use crate::data_folder::{DataFolder, LEGACY_TASK_FILE};
use crate::display::*;
use crate::error::{Error, Result};
use crate::fields::{DoneFilter, SortKey};
use crate::path::PathKey;

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks below a path (top level by default).
    List {
        /// Parent task path.
        path: Option<String>,
        /// Which tasks to show: undone | done | all.
        #[arg(long, value_enum, default_value_t = DoneFilter::Undone)]
        show: DoneFilter,
        /// Sort key: title | priority | deadline.
        #[arg(long, value_enum, default_value_t = SortKey::Title)]
        sort: SortKey,
    },

    /// Show one task with its responsibles and subtree (the whole tree by default).
    Detail {
        /// Task path, e.g. tower.floor1
        path: Option<String>,
    },

    /// Show tasks with close deadlines or a priority.
    Overview,

    /// Add a task; missing parents are created.
    Add {
        /// Task path, e.g. tower.floor1
        path: String,
        /// Optional description.
        desc: Vec<String>,
    },

    /// Delete a task and everything below it.
    Del {
        /// Task path to delete
        path: String,
    },

    /// Rename the last segment of a task path.
    Rename {
        /// Current task path
        path: String,
        /// New title (no dots)
        new_title: String,
    },

    /// Replace a task's description.
    Change {
        /// Task path
        path: String,
        /// New description.
        desc: Vec<String>,
    },

    /// Mark a task done.
    Done {
        /// Task path
        path: String,
    },

    /// Mark a task not done.
    Undone {
        /// Task path
        path: String,
    },

    /// Set a deadline some days from now, or clear it.
    Deadline {
        /// Task path
        path: String,
        /// Days from now (fractions allowed).
        #[arg(allow_negative_numbers = true, required_unless_present = "clear")]
        days: Option<f64>,
        /// Remove the deadline.
        #[arg(long, conflicts_with = "days")]
        clear: bool,
    },

    /// Set or clear a task's priority.
    Priority {
        /// Task path
        path: String,
        /// Priority value, higher is more important.
        #[arg(allow_negative_numbers = true, required_unless_present = "clear")]
        value: Option<i64>,
        /// Remove the priority.
        #[arg(long, conflicts_with = "value")]
        clear: bool,
    },

    /// Set a task's permission level (0-4).
    Perm {
        /// Task path
        path: String,
        level: u8,
    },

    /// Make players responsible for a task (defaults to --as).
    #[command(alias = "res")]
    Responsible {
        /// Task path
        path: String,
        players: Vec<String>,
    },

    /// Remove players' responsibility for a task (defaults to --as).
    #[command(alias = "unres")]
    Unresponsible {
        /// Task path
        path: String,
        players: Vec<String>,
    },

    /// List the tasks a player is responsible for (defaults to --as).
    Player {
        name: Option<String>,
    },

    /// Move all of a player's responsibilities to a new name.
    RenamePlayer {
        old_name: String,
        new_name: String,
    },

    /// Report a player's overdue tasks, as done when they join.
    Joined {
        name: String,
    },

    /// Feed a server output line to the rename detector.
    ServerLine {
        line: Vec<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Key of this command in the config's permission table.
    pub fn permission_key(&self) -> &'static str {
        match self {
            Commands::List { show: DoneFilter::Done, .. } => "list-done",
            Commands::List { show: DoneFilter::All, .. } => "list-all",
            Commands::List { .. } => "list",
            Commands::Detail { .. } => "detail",
            Commands::Overview => "list",
            Commands::Add { .. } => "add",
            Commands::Del { .. } => "del",
            Commands::Rename { .. } => "rename",
            Commands::Change { .. } => "change",
            Commands::Done { .. } => "done",
            Commands::Undone { .. } => "undone",
            Commands::Deadline { .. } => "deadline",
            Commands::Priority { .. } => "priority",
            Commands::Perm { .. } => "perm",
            Commands::Responsible { .. } => "responsible",
            Commands::Unresponsible { .. } => "unresponsible",
            Commands::Player { .. } => "player",
            Commands::RenamePlayer { .. } => "rename-player",
            Commands::Joined { .. } => "joined",
            Commands::ServerLine { .. } => "server-line",
            Commands::Completions { .. } => "help",
        }
    }
}

/// Open the data folder named on the command line and dispatch the command.
pub fn run(cli: Cli) -> Result<()> {
    let folder = match cli.data_dir {
        Some(dir) => DataFolder::new(dir),
        None => {
            let folder = DataFolder::default();
            folder.adopt_legacy_task_file(Path::new(LEGACY_TASK_FILE))?;
            folder
        }
    };
    let mut ctx = TaskContext::open(folder)?;

    let key = cli.command.permission_key();
    let required = ctx.config.permission_of(key);
    if cli.level < required {
        return Err(Error::PermissionDenied {
            command: key.to_string(),
            required,
        });
    }

    let me = cli.player;
    match cli.command {
        Commands::List { path, show, sort } => cmd_list(&ctx, path, show, sort),
        Commands::Detail { path } => cmd_detail(&ctx, path.as_deref().unwrap_or("")),
        Commands::Overview => cmd_overview(&ctx),
        Commands::Add { path, desc } => cmd_add(&mut ctx, &path, &desc.join(" ")),
        Commands::Del { path } => cmd_del(&mut ctx, &path),
        Commands::Rename { path, new_title } => cmd_rename(&mut ctx, &path, &new_title),
        Commands::Change { path, desc } => cmd_change(&mut ctx, &path, &desc.join(" ")),
        Commands::Done { path } => cmd_done(&mut ctx, &path, true),
        Commands::Undone { path } => cmd_done(&mut ctx, &path, false),
        Commands::Deadline { path, days, clear } => {
            cmd_deadline(&mut ctx, &path, if clear { None } else { days })
        }
        Commands::Priority { path, value, clear } => {
            cmd_priority(&mut ctx, &path, if clear { None } else { value })
        }
        Commands::Perm { path, level } => cmd_perm(&mut ctx, &path, level),
        Commands::Responsible { path, players } => {
            cmd_responsible(&mut ctx, &path, players_or_self(players, me)?)
        }
        Commands::Unresponsible { path, players } => {
            cmd_unresponsible(&mut ctx, &path, players_or_self(players, me)?)
        }
        Commands::Player { name } => {
            let name = name
                .or(me)
                .ok_or_else(|| Error::InvalidArgument("no player name given".into()))?;
            cmd_player(&ctx, &name)
        }
        Commands::RenamePlayer { old_name, new_name } => {
            cmd_rename_player(&mut ctx, &old_name, &new_name)
        }
        Commands::Joined { name } => cmd_joined(&ctx, &name),
        Commands::ServerLine { line } => cmd_server_line(&mut ctx, &line.join(" ")),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn players_or_self(players: Vec<String>, me: Option<String>) -> Result<Vec<String>> {
    if !players.is_empty() {
        return Ok(players);
    }
    me.map(|p| vec![p])
        .ok_or_else(|| Error::InvalidArgument("no players given and no --as player".into()))
}

/// List children of a task (or the top level).
pub fn cmd_list(ctx: &TaskContext, path: Option<String>, show: DoneFilter, sort: SortKey) -> Result<()> {
    let at = PathKey::parse(path.as_deref().unwrap_or(""));
    if at.is_empty() && show == DoneFilter::Undone && ctx.config.default_overview_instead_of_list {
        cmd_overview(ctx)?;
        println!();
    }
    let ids = ctx.tree.list(&at, show, sort)?;
    if ids.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_table(&ctx.tree, &ids, ctx.now());
    Ok(())
}

/// Show everything known about one task, or the whole tree for the root path.
pub fn cmd_detail(ctx: &TaskContext, path: &str) -> Result<()> {
    let path = PathKey::parse(path);
    let id = ctx.tree.resolve(&path)?;
    if path.is_empty() {
        println!("All tasks:");
        if ctx.tree.nodes().is_empty() {
            println!("  -");
        } else {
            print_subtree(&ctx.tree, id, 1);
        }
        return Ok(());
    }
    let task = &ctx.tree.nodes()[id];
    let now = ctx.now();
    let responsibles = ctx.tree.responsibles_of(&path);
    println!("Task:         {}", path);
    println!("Done:         {}", if task.done { "yes" } else { "no" });
    println!("Priority:     {}", format_priority(task.priority));
    println!(
        "Deadline:     {}",
        if task.has_deadline() {
            format!("{} ({})", format_deadline(task.deadline), format_deadline_relative(task.deadline, now))
        } else {
            "-".into()
        }
    );
    println!("Permission:   {}", task.permission);
    println!(
        "Responsible:  {}",
        if responsibles.is_empty() {
            "-".to_string()
        } else {
            responsibles.into_iter().collect::<Vec<_>>().join(", ")
        }
    );
    println!(
        "Description:\n{}\n",
        if task.description.is_empty() { "-" } else { task.description.as_str() }
    );
    println!("Sub-tasks:");
    if task.children().is_empty() {
        println!("  -");
    } else {
        print_subtree(&ctx.tree, id, 1);
    }
    Ok(())
}

/// Print the capped list of urgent and important tasks.
pub fn cmd_overview(ctx: &TaskContext) -> Result<()> {
    let items = ctx.overview();
    println!("Overview:");
    if items.is_empty() {
        println!("  Nothing urgent.");
    } else {
        print_table(&ctx.tree, &items, ctx.now());
    }
    Ok(())
}

pub fn cmd_add(ctx: &mut TaskContext, path: &str, desc: &str) -> Result<()> {
    let path = PathKey::parse(path);
    ctx.tree.add_new_task(&path, desc)?;
    println!("Added task {}", path);
    Ok(())
}

pub fn cmd_del(ctx: &mut TaskContext, path: &str) -> Result<()> {
    let path = PathKey::parse(path);
    ctx.tree.delete_task(&path)?;
    println!("Deleted task {}", path);
    Ok(())
}

pub fn cmd_rename(ctx: &mut TaskContext, path: &str, new_title: &str) -> Result<()> {
    let path = PathKey::parse(path);
    ctx.tree.rename_task(&path, new_title)?;
    println!("Renamed {} to {}", path, path.with_tail(new_title));
    Ok(())
}

pub fn cmd_change(ctx: &mut TaskContext, path: &str, desc: &str) -> Result<()> {
    let path = PathKey::parse(path);
    ctx.tree.edit_description(&path, desc)?;
    println!("Updated description of {}", path);
    Ok(())
}

pub fn cmd_done(ctx: &mut TaskContext, path: &str, done: bool) -> Result<()> {
    let path = PathKey::parse(path);
    if done {
        ctx.tree.mark_done(&path)?;
        println!("Marked {} done", path);
    } else {
        ctx.tree.mark_undone(&path)?;
        println!("Marked {} undone", path);
    }
    Ok(())
}

pub fn cmd_deadline(ctx: &mut TaskContext, path: &str, days: Option<f64>) -> Result<()> {
    let path = PathKey::parse(path);
    match days {
        Some(days) => {
            let deadline = ctx.days_from_now(days);
            ctx.tree.set_deadline(&path, deadline)?;
            println!("Deadline of {} set to {}", path, format_deadline(deadline));
        }
        None => {
            ctx.tree.clear_deadline(&path)?;
            println!("Cleared deadline of {}", path);
        }
    }
    Ok(())
}

pub fn cmd_priority(ctx: &mut TaskContext, path: &str, value: Option<i64>) -> Result<()> {
    let path = PathKey::parse(path);
    ctx.tree.set_priority(&path, value)?;
    println!("Priority of {} set to {}", path, format_priority(value));
    Ok(())
}

pub fn cmd_perm(ctx: &mut TaskContext, path: &str, level: u8) -> Result<()> {
    let path = PathKey::parse(path);
    ctx.tree.set_permission(&path, level)?;
    println!("Permission of {} set to {}", path, level);
    Ok(())
}

pub fn cmd_responsible(ctx: &mut TaskContext, path: &str, players: Vec<String>) -> Result<()> {
    let path = PathKey::parse(path);
    let added = ctx.tree.set_responsible(&path, players.as_slice())?;
    println!("Added {} responsible player(s) to {}", added, path);
    Ok(())
}

pub fn cmd_unresponsible(ctx: &mut TaskContext, path: &str, players: Vec<String>) -> Result<()> {
    let path = PathKey::parse(path);
    let removed = ctx.tree.remove_responsible(&path, players.as_slice())?;
    println!("Removed {} responsible player(s) from {}", removed.len(), path);
    for p in removed {
        println!("  - {}", p);
    }
    Ok(())
}

pub fn cmd_player(ctx: &TaskContext, name: &str) -> Result<()> {
    let ids = ctx.tree.player_tasks(name);
    println!("{} is responsible for {} task(s)", name, ids.len());
    if !ids.is_empty() {
        print_table(&ctx.tree, &ids, ctx.now());
    }
    Ok(())
}

pub fn cmd_rename_player(ctx: &mut TaskContext, old_name: &str, new_name: &str) -> Result<()> {
    ctx.tree.rename_player(old_name, new_name)?;
    println!("Moved responsibilities of {} to {}", old_name, new_name);
    Ok(())
}

pub fn cmd_joined(ctx: &TaskContext, name: &str) -> Result<()> {
    let overdue = ctx.on_player_joined(name);
    if overdue.is_empty() {
        println!("No overdue tasks for {}", name);
    } else {
        println!("{} has {} overdue task(s):", name, overdue.len());
        print_table(&ctx.tree, &overdue, ctx.now());
    }
    Ok(())
}

pub fn cmd_server_line(ctx: &mut TaskContext, line: &str) -> Result<()> {
    if let Some((old, new)) = ctx.on_server_line(line)? {
        println!("Moved responsibilities of {} to {}", old, new);
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
