//! Runtime context handed to every command handler.
//!
//! Bundles the loaded tree, the config and the clock, and hosts the hooks the
//! plugin host calls outside of commands (server log lines, player joins).

use tracing::{debug, info};

use crate::clock::{days_from_now, Clock, SystemClock};
use crate::config::Config;
use crate::data_folder::DataFolder;
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::TaskTree;

const RENAME_SUFFIX: &str = " joined the game";
const RENAME_MARKER: &str = " (formerly known as ";

/// Parse `"{new} (formerly known as {old}) joined the game"` into `(old, new)`.
pub fn parse_player_rename(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_suffix(RENAME_SUFFIX)?;
    let rest = rest.strip_suffix(')')?;
    let (new_name, old_name) = rest.split_once(RENAME_MARKER)?;
    let (new_name, old_name) = (new_name.trim(), old_name.trim());
    if new_name.is_empty() || old_name.is_empty() || new_name.contains(' ') || old_name.contains(' ') {
        return None;
    }
    Some((old_name, new_name))
}

pub struct TaskContext {
    pub folder: DataFolder,
    pub config: Config,
    pub tree: TaskTree,
    clock: Box<dyn Clock>,
}

impl TaskContext {
    /// Load config and tree from `folder` using wall-clock time.
    pub fn open(folder: DataFolder) -> Result<Self> {
        Self::open_with_clock(folder, Box::new(SystemClock))
    }

    pub fn open_with_clock(folder: DataFolder, clock: Box<dyn Clock>) -> Result<Self> {
        folder.create_if_not_exists()?;
        let config = Config::load(&folder.config_file())?;
        let tree = TaskTree::load(folder.task_file(), folder.responsible_file())?;
        Ok(TaskContext {
            folder,
            config,
            tree,
            clock,
        })
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Timestamp `days` after the context's current time.
    pub fn days_from_now(&self, days: f64) -> f64 {
        days_from_now(self.clock.as_ref(), days)
    }

    /// Undone tasks with close deadlines, then undone prioritised tasks,
    /// without repeats and capped at the configured amount.
    pub fn overview(&self) -> Vec<NodeId> {
        let cap = self.config.overview_maximum_task_amount;
        let mut items = self.tree.seek_for_item_with_deadline_approaching(
            self.config.deadline_warning_threshold(),
            self.now(),
            false,
        );
        for id in self.tree.seek_for_item_with_priority(false) {
            if !items.contains(&id) {
                items.push(id);
            }
        }
        items.truncate(cap);
        debug!(items = items.len(), cap, "built overview");
        items
    }

    /// Overdue tasks to remind `player` of when they join.
    pub fn on_player_joined(&self, player: &str) -> Vec<NodeId> {
        self.tree.overdue_tasks_of(player, self.now())
    }

    /// Feed one server output line. Returns the `(old, new)` names when it
    /// caused a player rename.
    pub fn on_server_line(&mut self, line: &str) -> Result<Option<(String, String)>> {
        if !self.config.detect_player_rename {
            return Ok(None);
        }
        let Some((old_name, new_name)) = parse_player_rename(line) else {
            return Ok(None);
        };
        if !self.tree.assignments().has_player(old_name) {
            return Ok(None);
        }
        self.tree.rename_player(old_name, new_name)?;
        info!(old = %old_name, new = %new_name, "inherited responsibilities after rename");
        Ok(Some((old_name.to_string(), new_name.to_string())))
    }
}
