//! Value enums shared by the command layer and the tree queries.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Alphabetical by title.
    #[default]
    Title,
    /// Highest priority first, unprioritised last.
    Priority,
    /// Soonest deadline first, no deadline last.
    Deadline,
}

/// Which children of a node a listing shows.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum DoneFilter {
    #[default]
    Undone,
    Done,
    All,
}
