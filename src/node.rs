//! Task nodes and the arena that owns them.
//!
//! Nodes live in a flat slot table addressed by [`NodeId`]. Each node keeps the
//! ids of its children in insertion order and the id of its parent, which is
//! only used to rebuild full paths. The root is the node without a parent; its
//! full path is the empty [`PathKey`].

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fields::{DoneFilter, SortKey};
use crate::path::PathKey;
use crate::task::TaskRecord;

/// Handle of a node inside a [`NodeArena`].
///
/// A slot freed by a delete is reused with a new generation, so an id kept
/// past the delete never names the node that takes its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// A single task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    /// Own path segment, unique among siblings.
    pub title: String,
    pub done: bool,
    /// Free text; empty means none.
    pub description: String,
    /// UNIX timestamp in seconds; `0` means no deadline.
    pub deadline: f64,
    pub priority: Option<i64>,
    pub permission: u8,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl TaskNode {
    fn new(title: impl Into<String>, description: impl Into<String>, parent: Option<NodeId>) -> Self {
        TaskNode {
            title: title.into(),
            done: false,
            description: description.into(),
            deadline: 0.0,
            priority: None,
            permission: 0,
            children: Vec::new(),
            parent,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline != 0.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<TaskNode>,
}

/// Owner of every node of one task tree.
#[derive(Debug, Clone)]
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl Default for NodeArena {
    fn default() -> Self {
        NodeArena::new(crate::task::ROOT_TITLE)
    }
}

impl Index<NodeId> for NodeArena {
    type Output = TaskNode;

    fn index(&self, id: NodeId) -> &TaskNode {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node id {id:?}"),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut TaskNode {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node id {id:?}"),
        }
    }
}

impl NodeArena {
    /// Arena holding only a root titled `root_title`.
    pub fn new(root_title: &str) -> Self {
        NodeArena {
            slots: vec![Slot {
                generation: 0,
                node: Some(TaskNode::new(root_title, "", None)),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node `id` names, or `None` once it has been deleted.
    pub fn get(&self, id: NodeId) -> Option<&TaskNode> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TaskNode> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self[self.root].children.is_empty()
    }

    fn alloc(&mut self, node: TaskNode) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
        else {
            return;
        };
        if let Some(node) = slot.node.take() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            for child in node.children {
                self.release(child);
            }
        }
    }

    /// Immediate child of `parent` titled `title`.
    pub fn child(&self, parent: NodeId, title: &str) -> Option<NodeId> {
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self[c].title == title)
    }

    fn attach(&mut self, parent: NodeId, title: &str, description: &str) -> NodeId {
        let id = self.alloc(TaskNode::new(title, description, Some(parent)));
        self[parent].children.push(id);
        id
    }

    /// Create every missing node along `path` below `at` and return the last one.
    ///
    /// Existing segments are reused untouched. Only a node created for the final
    /// segment receives `description`.
    pub fn add_task(&mut self, at: NodeId, mut path: PathKey, description: &str) -> Result<NodeId> {
        let title = path.pop_head()?;
        let last = path.is_empty();
        let next = match self.child(at, &title) {
            Some(existing) => existing,
            None => {
                let desc = if last { description } else { "" };
                let id = self.attach(at, &title, desc);
                debug!(parent = %self.full_path(at), %title, "created task node");
                id
            }
        };
        if last {
            Ok(next)
        } else {
            self.add_task(next, path, description)
        }
    }

    /// Resolve `path` relative to `at`.
    pub fn resolve_from(&self, at: NodeId, path: &PathKey) -> Result<NodeId> {
        let mut current = at;
        let mut rest = path.clone();
        while let Some(title) = rest.head() {
            match self.child(current, title) {
                Some(next) => {
                    current = next;
                    rest.pop_head()?;
                }
                None => {
                    return Err(Error::not_found(
                        rest.to_string(),
                        self.full_path(current).to_string(),
                    ))
                }
            }
        }
        Ok(current)
    }

    /// Resolve `path` from the root. The empty path is the root.
    pub fn resolve(&self, path: &PathKey) -> Result<NodeId> {
        self.resolve_from(self.root, path)
    }

    /// Whether `path` names an existing non-root node.
    pub fn exists(&self, path: &PathKey) -> bool {
        let mut parent = path.clone();
        let Ok(title) = parent.pop_tail() else {
            return false;
        };
        self.resolve(&parent)
            .map(|p| self.child(p, &title).is_some())
            .unwrap_or(false)
    }

    /// Detach the child `title` of `parent`, dropping its whole subtree.
    pub fn delete_child(&mut self, parent: NodeId, title: &str) -> Result<()> {
        let pos = self[parent]
            .children
            .iter()
            .position(|&c| self[c].title == title)
            .ok_or_else(|| Error::not_found(title, self.full_path(parent).to_string()))?;
        let removed = self[parent].children.remove(pos);
        self.release(removed);
        debug!(parent = %self.full_path(parent), %title, "deleted task node");
        Ok(())
    }

    /// Immediate children split into (undone, done), each in insertion order.
    pub fn split_children_by_done(&self, id: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
        self[id].children.iter().copied().partition(|&c| !self[c].done)
    }

    /// Undone children by title, then done children by title.
    pub fn sorted_children(&self, id: NodeId) -> Vec<NodeId> {
        let (mut undone, mut done) = self.split_children_by_done(id);
        self.sort(&mut undone, SortKey::Title);
        self.sort(&mut done, SortKey::Title);
        undone.extend(done);
        undone
    }

    /// Immediate children matching `filter`, ordered by `key`.
    pub fn list_children(&self, id: NodeId, filter: DoneFilter, key: SortKey) -> Vec<NodeId> {
        let (mut undone, mut done) = self.split_children_by_done(id);
        self.sort(&mut undone, key);
        self.sort(&mut done, key);
        match filter {
            DoneFilter::Undone => undone,
            DoneFilter::Done => done,
            DoneFilter::All => {
                undone.extend(done);
                undone
            }
        }
    }

    /// Stable sort of `ids` by `key`, ties broken by title.
    pub fn sort(&self, ids: &mut [NodeId], key: SortKey) {
        ids.sort_by(|&a, &b| {
            let (a, b) = (&self[a], &self[b]);
            let primary = match key {
                SortKey::Title => Ordering::Equal,
                SortKey::Priority => match (a.priority, b.priority) {
                    (Some(x), Some(y)) => y.cmp(&x),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
                SortKey::Deadline => match (a.has_deadline(), b.has_deadline()) {
                    (true, true) => a.deadline.total_cmp(&b.deadline),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => Ordering::Equal,
                },
            };
            primary.then_with(|| a.title.cmp(&b.title))
        });
    }

    /// Every node strictly below `id`, depth first in insertion order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self[next].children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `id` with a priority, highest first.
    pub fn seek_with_priority(&self, id: NodeId, include_done: bool) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = self
            .descendants(id)
            .into_iter()
            .filter(|&n| self[n].priority.is_some() && (include_done || !self[n].done))
            .collect();
        found.sort_by(|&a, &b| self[b].priority.cmp(&self[a].priority));
        found
    }

    /// Descendants of `id` whose deadline is set and less than `threshold`
    /// seconds after `now` (overdue ones included), soonest first.
    pub fn seek_with_deadline_approaching(
        &self,
        id: NodeId,
        threshold: f64,
        now: f64,
        include_done: bool,
    ) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = self
            .descendants(id)
            .into_iter()
            .filter(|&n| {
                let node = &self[n];
                node.has_deadline()
                    && node.deadline - now < threshold
                    && (include_done || !node.done)
            })
            .collect();
        found.sort_by(|&a, &b| self[a].deadline.total_cmp(&self[b].deadline));
        found
    }

    /// Path from the root to `id`.
    pub fn full_path(&self, id: NodeId) -> PathKey {
        let mut path = PathKey::root();
        let mut current = id;
        while let Some(parent) = self[current].parent {
            path.prepend(self[current].title.clone());
            current = parent;
        }
        path
    }

    /// Nested record of `id` and its subtree.
    pub fn to_record(&self, id: NodeId) -> TaskRecord {
        let node = &self[id];
        TaskRecord {
            title: node.title.clone(),
            done: node.done,
            description: node.description.clone(),
            deadline: node.deadline,
            priority: node.priority,
            permission: node.permission,
            sub_tasks: node.children.iter().map(|&c| self.to_record(c)).collect(),
        }
    }

    /// Rebuild an arena from a nested record; the record itself becomes the root.
    ///
    /// A repeated sibling title keeps its first occurrence.
    pub fn from_record(record: &TaskRecord) -> Self {
        let mut arena = NodeArena::new(&record.title);
        let root = arena.root;
        arena.fill(root, record);
        for sub in &record.sub_tasks {
            arena.load_child(root, sub);
        }
        arena
    }

    fn fill(&mut self, id: NodeId, record: &TaskRecord) {
        let node = &mut self[id];
        node.done = record.done;
        node.description = record.description.clone();
        node.deadline = record.deadline;
        node.priority = record.priority;
        node.permission = record.permission;
    }

    fn load_child(&mut self, parent: NodeId, record: &TaskRecord) {
        if self.child(parent, &record.title).is_some() {
            warn!(
                parent = %self.full_path(parent),
                title = %record.title,
                "dropping duplicate sibling while loading task file"
            );
            return;
        }
        let id = self.attach(parent, &record.title, "");
        self.fill(id, record);
        for sub in &record.sub_tasks {
            self.load_child(id, sub);
        }
    }
}
