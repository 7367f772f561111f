//! Plugin configuration.
//!
//! Stored as `config.json` in the data folder. Every field has a default, so
//! a partial or missing file still yields a full config.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::SECONDS_PER_DAY;
use crate::db;
use crate::error::Result;

/// Level required by commands absent from the permission table.
pub const DEFAULT_PERMISSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum permission level per command name.
    #[serde(default = "default_permission")]
    pub permission: BTreeMap<String, u8>,

    /// Follow "X (formerly known as Y)" join messages and move Y's tasks to X.
    #[serde(default = "default_true")]
    pub detect_player_rename: bool,

    /// Show the overview when `list` is called without arguments.
    #[serde(default = "default_true")]
    pub default_overview_instead_of_list: bool,

    /// Deadlines closer than this many days show up in the overview.
    #[serde(default = "default_warning_threshold")]
    pub overview_deadline_warning_threshold: f64,

    /// Cap on overview entries.
    #[serde(default = "default_overview_amount")]
    pub overview_maximum_task_amount: usize,
}

fn default_permission() -> BTreeMap<String, u8> {
    [
        ("help", 0),
        ("list", 0),
        ("detail", 0),
        ("list-all", 0),
        ("list-done", 0),
        ("player", 2),
        ("responsible", 2),
        ("unresponsible", 2),
    ]
    .into_iter()
    .map(|(cmd, lvl)| (cmd.to_string(), lvl))
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_warning_threshold() -> f64 {
    1.0
}

fn default_overview_amount() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            permission: default_permission(),
            detect_player_rename: default_true(),
            default_overview_instead_of_list: default_true(),
            overview_deadline_warning_threshold: default_warning_threshold(),
            overview_maximum_task_amount: default_overview_amount(),
        }
    }
}

impl Config {
    /// Load `path`, writing the defaults there first if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        db::load_or_init(path, Config::default)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        db::save_json(path, self)
    }

    pub fn permission_of(&self, command: &str) -> u8 {
        self.permission
            .get(command)
            .copied()
            .unwrap_or(DEFAULT_PERMISSION)
    }

    /// Warning threshold in seconds.
    pub fn deadline_warning_threshold(&self) -> f64 {
        self.overview_deadline_warning_threshold * SECONDS_PER_DAY
    }
}
