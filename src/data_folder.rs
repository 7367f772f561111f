//! Data folder layout.
//!
//! All files live in one folder (`./config/task` by default):
//! `mc_task.json` for the tree, `responsible.json` for assignments and
//! `config.json` for settings.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};

pub const DEFAULT_DATA_FOLDER: &str = "./config/task";
pub const TASK_FILE: &str = "mc_task.json";
pub const RESPONSIBLE_FILE: &str = "responsible.json";
pub const CONFIG_FILE: &str = "config.json";
/// Where older plugin versions kept the task file.
pub const LEGACY_TASK_FILE: &str = "./plugins/task/mc_task.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFolder {
    pub root: PathBuf,
}

impl Default for DataFolder {
    fn default() -> Self {
        DataFolder::new(DEFAULT_DATA_FOLDER)
    }
}

impl DataFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataFolder { root: root.into() }
    }

    pub fn task_file(&self) -> PathBuf {
        self.root.join(TASK_FILE)
    }

    pub fn responsible_file(&self) -> PathBuf {
        self.root.join(RESPONSIBLE_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Create the folder if it does not exist.
    pub fn create_if_not_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))
    }

    /// Copy a task file from `legacy` when this folder has none yet.
    /// Returns whether a file was adopted.
    pub fn adopt_legacy_task_file(&self, legacy: &Path) -> Result<bool> {
        let target = self.task_file();
        if target.exists() || !legacy.is_file() {
            return Ok(false);
        }
        self.create_if_not_exists()?;
        fs::copy(legacy, &target).map_err(|e| Error::io(legacy, e))?;
        warn!(from = %legacy.display(), to = %target.display(), "adopted legacy task file");
        Ok(true)
    }
}
