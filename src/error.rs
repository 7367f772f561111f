//! Error types for the task store.
//!
//! Tree and assignment errors are recoverable at the command boundary: the
//! caller turns them into a reply and carries on. Only persistence failures
//! (`Io`, `Malformed`, `Json`) indicate the on-disk state may lag behind memory.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Exit codes used by the `mcdtask` binary.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const PERSISTENCE_FAILED: i32 = 1;
    pub const USER_ERROR: i32 = 2;
}

/// Path of a task that could not be resolved, plus the deepest ancestor that could.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub path: String,
    pub father: String,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.father.is_empty() {
            write!(f, "{} not found", self.path)
        } else {
            write!(f, "{} has no sub-task named {}", self.father, self.path)
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    TaskNotFound(NotFound),

    #[error("Task {0} already exists")]
    TaskAlreadyExists(String),

    #[error("Illegal task name: {0:?}")]
    IllegalTaskName(String),

    #[error("{player} is already responsible for {path}")]
    DuplicateAssignment { player: String, path: String },

    #[error("{player} is not responsible for {path}")]
    AssignmentNotFound { player: String, path: String },

    #[error("Player {0} has no assignments")]
    PlayerNotFound(String),

    #[error("Empty task path")]
    EmptyPath,

    #[error("Invalid permission level {0}, expected 0-4")]
    InvalidPermission(u8),

    #[error("Permission denied: {command} requires level {required}")]
    PermissionDenied { command: String, required: u8 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn not_found(path: impl Into<String>, father: impl Into<String>) -> Self {
        Error::TaskNotFound(NotFound {
            path: path.into(),
            father: father.into(),
        })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from bad input rather than a failed write or read.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Error::Io { .. } | Error::Malformed { .. } | Error::Json(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_user_error() {
            exit_codes::USER_ERROR
        } else {
            exit_codes::PERSISTENCE_FAILED
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
