//! On-disk task record.
//!
//! The task file stores the whole tree as one nested record per node. This is
//! the serialization shape only; the live tree is the arena in [`crate::node`].

use serde::{Deserialize, Serialize};

/// Title given to the root record of a fresh task file.
pub const ROOT_TITLE: &str = "TaskManager";

/// One node of the task file, with its sub-tasks inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(default)]
    pub deadline: f64,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub permission: u8,
    #[serde(default)]
    pub sub_tasks: Vec<TaskRecord>,
}

impl TaskRecord {
    /// Empty record for a node titled `title`.
    pub fn new(title: impl Into<String>) -> Self {
        TaskRecord {
            title: title.into(),
            done: false,
            description: String::new(),
            deadline: 0.0,
            priority: None,
            permission: 0,
            sub_tasks: Vec::new(),
        }
    }
}

impl Default for TaskRecord {
    fn default() -> Self {
        TaskRecord::new(ROOT_TITLE)
    }
}
