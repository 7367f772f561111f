//! The task tree: node arena plus responsibility index, saved after every mutation.
//!
//! Every mutating call resolves and validates its path before touching
//! anything, then writes both files before returning. Use [`TaskTree::batch`]
//! to group several mutations into a single write.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::assignment::AssignmentIndex;
use crate::db;
use crate::error::{Error, Result};
use crate::fields::{DoneFilter, SortKey};
use crate::node::{NodeArena, NodeId, TaskNode};
use crate::path::{PathKey, DELIMITER};
use crate::task::TaskRecord;

/// Highest per-node permission level accepted by [`TaskTree::set_permission`].
pub const MAX_PERMISSION: u8 = 4;

/// Reject titles that are empty, would encode a path separator, or carry
/// surrounding whitespace that path parsing would strip.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() || title != title.trim() || title.contains(DELIMITER) {
        return Err(Error::IllegalTaskName(title.to_string()));
    }
    Ok(())
}

#[derive(Debug)]
pub struct TaskTree {
    nodes: NodeArena,
    assignments: AssignmentIndex,
    task_file: PathBuf,
    responsible_file: PathBuf,
    autosave: bool,
}

impl TaskTree {
    /// Load both files, creating whichever is missing.
    pub fn load(task_file: impl Into<PathBuf>, responsible_file: impl Into<PathBuf>) -> Result<Self> {
        let task_file = task_file.into();
        let responsible_file = responsible_file.into();
        let record: TaskRecord = db::load_or_init(&task_file, TaskRecord::default)?;
        let assignments: AssignmentIndex = db::load_or_init(&responsible_file, AssignmentIndex::new)?;
        let nodes = NodeArena::from_record(&record);
        info!(
            tasks = nodes.len() - 1,
            players = assignments.players().count(),
            "loaded task tree"
        );
        Ok(TaskTree {
            nodes,
            assignments,
            task_file,
            responsible_file,
            autosave: true,
        })
    }

    pub fn task_file(&self) -> &Path {
        &self.task_file
    }

    pub fn responsible_file(&self) -> &Path {
        &self.responsible_file
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn assignments(&self) -> &AssignmentIndex {
        &self.assignments
    }

    /// Write both files now.
    pub fn save(&self) -> Result<()> {
        db::save_json(&self.task_file, &self.nodes.to_record(self.nodes.root()))?;
        db::save_json(&self.responsible_file, &self.assignments)
    }

    fn commit(&self) -> Result<()> {
        if self.autosave {
            self.save()
        } else {
            Ok(())
        }
    }

    /// Run `f` with per-call saving suspended and write once afterwards.
    ///
    /// The write happens even when `f` fails, so the files always match what is
    /// in memory.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let previous = std::mem::replace(&mut self.autosave, false);
        let outcome = f(self);
        self.autosave = previous;
        let saved = self.commit();
        let value = outcome?;
        saved?;
        Ok(value)
    }

    // --- queries ---

    pub fn resolve(&self, path: &PathKey) -> Result<NodeId> {
        self.nodes.resolve(path)
    }

    pub fn get(&self, path: &PathKey) -> Result<&TaskNode> {
        Ok(&self.nodes[self.resolve(path)?])
    }

    /// The node `id` names, or `None` if it has been deleted since.
    pub fn node(&self, id: NodeId) -> Option<&TaskNode> {
        self.nodes.get(id)
    }

    pub fn exists(&self, path: &PathKey) -> bool {
        self.nodes.exists(path)
    }

    pub fn full_path(&self, id: NodeId) -> Option<PathKey> {
        self.nodes.contains(id).then(|| self.nodes.full_path(id))
    }

    /// Children of the node at `path`, filtered and sorted.
    pub fn list(&self, path: &PathKey, filter: DoneFilter, key: SortKey) -> Result<Vec<NodeId>> {
        Ok(self.nodes.list_children(self.resolve(path)?, filter, key))
    }

    /// Top-level tasks that are not done, by title.
    pub fn list_undone(&self) -> Vec<NodeId> {
        self.nodes.list_children(self.nodes.root(), DoneFilter::Undone, SortKey::Title)
    }

    /// Top-level tasks that are done, by title.
    pub fn list_done(&self) -> Vec<NodeId> {
        self.nodes.list_children(self.nodes.root(), DoneFilter::Done, SortKey::Title)
    }

    pub fn seek_for_item_with_priority(&self, include_done: bool) -> Vec<NodeId> {
        self.nodes.seek_with_priority(self.nodes.root(), include_done)
    }

    pub fn seek_for_item_with_deadline_approaching(
        &self,
        threshold: f64,
        now: f64,
        include_done: bool,
    ) -> Vec<NodeId> {
        self.nodes
            .seek_with_deadline_approaching(self.nodes.root(), threshold, now, include_done)
    }

    pub fn responsibles_of(&self, path: &PathKey) -> BTreeSet<String> {
        self.assignments.responsibles_of(path)
    }

    pub fn tasks_of(&self, player: &str) -> BTreeSet<String> {
        self.assignments.tasks_of(player)
    }

    /// Nodes `player` is responsible for that still exist, in path order.
    pub fn player_tasks(&self, player: &str) -> Vec<NodeId> {
        self.tasks_of(player)
            .iter()
            .filter_map(|t| self.resolve(&PathKey::parse(t)).ok())
            .collect()
    }

    /// Undone tasks of `player` whose deadline passed before `now`.
    pub fn overdue_tasks_of(&self, player: &str, now: f64) -> Vec<NodeId> {
        let mut overdue: Vec<NodeId> = self
            .player_tasks(player)
            .into_iter()
            .filter(|&id| {
                let node = &self.nodes[id];
                !node.done && node.has_deadline() && now > node.deadline
            })
            .collect();
        overdue.sort_by(|&a, &b| self.nodes[a].deadline.total_cmp(&self.nodes[b].deadline));
        overdue
    }

    // --- mutations ---

    /// Create `path` and any missing ancestors. An existing node is left as is.
    pub fn add_task(&mut self, path: &PathKey, description: &str) -> Result<NodeId> {
        for title in path.segments() {
            validate_title(title)?;
        }
        let root = self.nodes.root();
        let id = self.nodes.add_task(root, path.clone(), description)?;
        self.commit()?;
        Ok(id)
    }

    /// Like [`add_task`](Self::add_task) but fails when `path` already exists.
    pub fn add_new_task(&mut self, path: &PathKey, description: &str) -> Result<NodeId> {
        if self.exists(path) {
            return Err(Error::TaskAlreadyExists(path.to_string()));
        }
        self.add_task(path, description)
    }

    /// Remove the node at `path` with its subtree and every assignment on them.
    pub fn delete_task(&mut self, path: &PathKey) -> Result<()> {
        let mut parent_path = path.clone();
        let title = parent_path.pop_tail()?;
        let parent = self.resolve(&parent_path)?;
        self.nodes.delete_child(parent, &title)?;
        self.assignments.remove_task(path);
        info!(%path, "deleted task");
        self.commit()
    }

    /// Retitle the node at `path`, carrying assignments on it and below it.
    pub fn rename_task(&mut self, path: &PathKey, new_title: &str) -> Result<()> {
        validate_title(new_title)?;
        let id = self.resolve(path)?;
        let parent = self.nodes[id].parent().ok_or(Error::EmptyPath)?;
        if self.nodes[id].title == new_title {
            return Ok(());
        }
        if self.nodes.child(parent, new_title).is_some() {
            return Err(Error::TaskAlreadyExists(path.with_tail(new_title).to_string()));
        }
        self.nodes[id].title = new_title.to_string();
        self.assignments.rename_task(path, new_title);
        info!(%path, %new_title, "renamed task");
        self.commit()
    }

    fn update(&mut self, path: &PathKey, f: impl FnOnce(&mut TaskNode)) -> Result<()> {
        let id = self.resolve(path)?;
        f(&mut self.nodes[id]);
        debug!(%path, "updated task");
        self.commit()
    }

    pub fn set_deadline(&mut self, path: &PathKey, timestamp: f64) -> Result<()> {
        self.update(path, |n| n.deadline = timestamp)
    }

    pub fn clear_deadline(&mut self, path: &PathKey) -> Result<()> {
        self.set_deadline(path, 0.0)
    }

    pub fn edit_description(&mut self, path: &PathKey, text: &str) -> Result<()> {
        self.update(path, |n| n.description = text.to_string())
    }

    pub fn set_priority(&mut self, path: &PathKey, priority: Option<i64>) -> Result<()> {
        self.update(path, |n| n.priority = priority)
    }

    pub fn mark_done(&mut self, path: &PathKey) -> Result<()> {
        self.update(path, |n| n.done = true)
    }

    pub fn mark_undone(&mut self, path: &PathKey) -> Result<()> {
        self.update(path, |n| n.done = false)
    }

    pub fn set_permission(&mut self, path: &PathKey, level: u8) -> Result<()> {
        if level > MAX_PERMISSION {
            return Err(Error::InvalidPermission(level));
        }
        self.update(path, |n| n.permission = level)
    }

    /// Assign each player to `path`; returns how many assignments were new.
    pub fn set_responsible<S: AsRef<str>>(&mut self, path: &PathKey, players: &[S]) -> Result<usize> {
        self.resolve(path)?;
        let mut added = 0;
        for player in players {
            match self.assignments.assign(player.as_ref(), path) {
                Ok(()) => added += 1,
                Err(Error::DuplicateAssignment { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        self.commit()?;
        Ok(added)
    }

    /// Unassign each player from `path`; returns the players actually removed.
    pub fn remove_responsible<S: AsRef<str>>(
        &mut self,
        path: &PathKey,
        players: &[S],
    ) -> Result<BTreeSet<String>> {
        self.resolve(path)?;
        let mut removed = BTreeSet::new();
        for player in players {
            match self.assignments.unassign(player.as_ref(), path) {
                Ok(()) => {
                    removed.insert(player.as_ref().to_string());
                }
                Err(Error::AssignmentNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        self.commit()?;
        Ok(removed)
    }

    pub fn rename_player(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.assignments.rename_player(old_name, new_name)?;
        info!(old = %old_name, new = %new_name, "player renamed");
        self.commit()
    }
}
