//! # mcd_task - hierarchical task tracking for game servers
//!
//! Players and operators create, rename, annotate, complete and assign tasks
//! organised as a tree. Tasks are addressed by dot-separated paths:
//!
//! - `tower` - a top-level task
//!   - `tower.floor1` - a sub-task of `tower`
//!     - `tower.floor1.walls`
//!
//! ## Key Pieces
//!
//! - [`path::PathKey`] - parsed dot-path
//! - [`node::NodeArena`] - the tree itself, nodes addressed by [`node::NodeId`]
//! - [`assignment::AssignmentIndex`] - which player is responsible for which path
//! - [`tree::TaskTree`] - the two above plus the save-after-every-mutation policy
//! - [`context::TaskContext`] - tree, config and clock as handed to commands
//!
//! ## Storage
//!
//! Data lives in one folder (`./config/task` by default) as three JSON files:
//! `mc_task.json` (nested task records), `responsible.json`
//! (`{player: [path, ...]}`) and `config.json`. Missing files are created on
//! first load; malformed files are reported, never overwritten.
//!
//! ```no_run
//! use mcd_task::context::TaskContext;
//! use mcd_task::data_folder::DataFolder;
//! use mcd_task::path::PathKey;
//!
//! # fn main() -> mcd_task::Result<()> {
//! let mut ctx = TaskContext::open(DataFolder::new("./config/task"))?;
//! let floor = PathKey::parse("tower.floor1");
//! ctx.tree.add_task(&floor, "glass walls")?;
//! ctx.tree.set_responsible(&floor, &["Steve"])?;
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod cli;
pub mod clock;
pub mod cmd;
pub mod config;
pub mod context;
pub mod data_folder;
pub mod db;
pub mod display;
pub mod error;
pub mod fields;
pub mod node;
pub mod path;
pub mod task;
pub mod tree;

pub use error::{Error, Result};
