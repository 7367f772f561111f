//! Player responsibilities.
//!
//! Maps a player name to the set of task paths (as strings) the player is
//! responsible for. The index does not know about the tree: entries for
//! deleted or renamed tasks are rewritten by [`crate::tree::TaskTree`], never
//! discovered here.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::path::{covers, PathKey};

/// `{player: [path, ...]}`, persisted as its own file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentIndex {
    players: BTreeMap<String, BTreeSet<String>>,
}

impl AssignmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `player` responsible for `path`.
    pub fn assign(&mut self, player: &str, path: &PathKey) -> Result<()> {
        let path = path.to_string();
        let tasks = self.players.entry(player.to_string()).or_default();
        if !tasks.insert(path.clone()) {
            return Err(Error::DuplicateAssignment {
                player: player.to_string(),
                path,
            });
        }
        debug!(%player, %path, "assigned");
        Ok(())
    }

    /// Drop `player`'s responsibility for `path`.
    pub fn unassign(&mut self, player: &str, path: &PathKey) -> Result<()> {
        let path = path.to_string();
        let removed = self
            .players
            .get_mut(player)
            .map(|tasks| tasks.remove(&path))
            .unwrap_or(false);
        if !removed {
            return Err(Error::AssignmentNotFound {
                player: player.to_string(),
                path,
            });
        }
        debug!(%player, %path, "unassigned");
        Ok(())
    }

    /// Carry every entry on `old` or below it over to `old` with its last
    /// segment replaced by `new_title`.
    pub fn rename_task(&mut self, old: &PathKey, new_title: &str) {
        if old.is_empty() {
            return;
        }
        let prefix = old.to_string();
        let replacement = old.with_tail(new_title).to_string();
        let mut rewritten = 0usize;
        for tasks in self.players.values_mut() {
            let stale: Vec<String> = tasks.iter().filter(|t| covers(&prefix, t)).cloned().collect();
            for entry in stale {
                tasks.remove(&entry);
                tasks.insert(format!("{replacement}{}", &entry[prefix.len()..]));
                rewritten += 1;
            }
        }
        debug!(old = %prefix, new = %replacement, rewritten, "renamed task in assignments");
    }

    /// Forget every entry on `path` or below it.
    pub fn remove_task(&mut self, path: &PathKey) {
        if path.is_empty() {
            return;
        }
        let prefix = path.to_string();
        for tasks in self.players.values_mut() {
            tasks.retain(|t| !covers(&prefix, t));
        }
        debug!(path = %prefix, "removed task from assignments");
    }

    /// Move all of `old_name`'s entries to `new_name`, merging with any the new
    /// name already has.
    pub fn rename_player(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let tasks = self
            .players
            .remove(old_name)
            .ok_or_else(|| Error::PlayerNotFound(old_name.to_string()))?;
        self.players.entry(new_name.to_string()).or_default().extend(tasks);
        debug!(old = %old_name, new = %new_name, "renamed player in assignments");
        Ok(())
    }

    /// Players responsible for exactly `path`.
    pub fn responsibles_of(&self, path: &PathKey) -> BTreeSet<String> {
        let path = path.to_string();
        self.players
            .iter()
            .filter(|(_, tasks)| tasks.contains(&path))
            .map(|(player, _)| player.clone())
            .collect()
    }

    /// Paths `player` is responsible for; empty for unknown players.
    pub fn tasks_of(&self, player: &str) -> BTreeSet<String> {
        self.players.get(player).cloned().unwrap_or_default()
    }

    pub fn has_player(&self, player: &str) -> bool {
        self.players.contains_key(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.players.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathKey {
        PathKey::parse(s)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn assign_twice_is_rejected() {
        let mut idx = AssignmentIndex::new();
        idx.assign("Alice", &p("tower")).unwrap();
        assert!(matches!(
            idx.assign("Alice", &p("tower")),
            Err(Error::DuplicateAssignment { .. })
        ));
        assert_eq!(idx.responsibles_of(&p("tower")), set(&["Alice"]));
    }

    #[test]
    fn unassign_missing_is_rejected() {
        let mut idx = AssignmentIndex::new();
        assert!(matches!(
            idx.unassign("Bob", &p("tower")),
            Err(Error::AssignmentNotFound { .. })
        ));
        idx.assign("Bob", &p("tower")).unwrap();
        idx.unassign("Bob", &p("tower")).unwrap();
        assert!(idx.tasks_of("Bob").is_empty());
        assert!(idx.has_player("Bob"));
    }

    #[test]
    fn rename_task_carries_descendants_only() {
        let mut idx = AssignmentIndex::new();
        for path in ["parent.child", "parent.child.grandchild", "parent.children", "parent"] {
            idx.assign("A", &p(path)).unwrap();
        }
        idx.rename_task(&p("parent.child"), "renamed");
        assert_eq!(
            idx.tasks_of("A"),
            set(&["parent", "parent.children", "parent.renamed", "parent.renamed.grandchild"])
        );
    }

    #[test]
    fn remove_task_prunes_subtree() {
        let mut idx = AssignmentIndex::new();
        idx.assign("A", &p("tower")).unwrap();
        idx.assign("A", &p("tower.floor1")).unwrap();
        idx.assign("B", &p("towers")).unwrap();
        idx.remove_task(&p("tower"));
        assert!(idx.tasks_of("A").is_empty());
        assert_eq!(idx.tasks_of("B"), set(&["towers"]));
    }

    #[test]
    fn rename_player_moves_and_merges() {
        let mut idx = AssignmentIndex::new();
        idx.assign("old", &p("a")).unwrap();
        idx.assign("new", &p("b")).unwrap();
        idx.rename_player("old", "new").unwrap();
        assert!(!idx.has_player("old"));
        assert_eq!(idx.tasks_of("new"), set(&["a", "b"]));
        assert!(matches!(idx.rename_player("ghost", "x"), Err(Error::PlayerNotFound(_))));
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut idx = AssignmentIndex::new();
        idx.assign("Steve", &p("tower.floor1")).unwrap();
        let json = serde_json::to_value(&idx).unwrap();
        assert_eq!(json, serde_json::json!({"Steve": ["tower.floor1"]}));
        let back: AssignmentIndex = serde_json::from_value(json).unwrap();
        assert_eq!(back, idx);
    }
}
