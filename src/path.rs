//! Dot-separated task paths.
//!
//! A `PathKey` addresses a node from the root of the task tree, e.g.
//! `tower.floor1`. The empty key is the root itself.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{Error, Result};

/// Separator between path segments.
pub const DELIMITER: char = '.';

/// Ordered sequence of task titles.
///
/// `pop_head`/`pop_tail` consume in place, so clone first when the original
/// key is still needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathKey {
    segments: VecDeque<String>,
}

impl PathKey {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self::default()
    }

    /// Split `s` on `.`. Leading/trailing dots and empty segments are dropped,
    /// so `""` yields the root path rather than a single empty segment.
    /// Segments are trimmed: `"a . b"` parses to `a.b`.
    pub fn parse(s: &str) -> Self {
        let segments = s
            .split(DELIMITER)
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(str::to_string)
            .collect();
        PathKey { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn head(&self) -> Option<&str> {
        self.segments.front().map(String::as_str)
    }

    pub fn tail(&self) -> Option<&str> {
        self.segments.back().map(String::as_str)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Remove and return the first segment.
    pub fn pop_head(&mut self) -> Result<String> {
        self.segments.pop_front().ok_or(Error::EmptyPath)
    }

    /// Remove and return the last segment.
    pub fn pop_tail(&mut self) -> Result<String> {
        self.segments.pop_back().ok_or(Error::EmptyPath)
    }

    pub fn append(&mut self, segment: impl Into<String>) -> &mut Self {
        self.segments.push_back(segment.into());
        self
    }

    pub fn prepend(&mut self, segment: impl Into<String>) -> &mut Self {
        self.segments.push_front(segment.into());
        self
    }

    /// Copy of this path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.append(segment);
        out
    }

    /// Copy of this path without its last segment. The root's parent is the root.
    pub fn parent(&self) -> Self {
        let mut out = self.clone();
        out.segments.pop_back();
        out
    }

    /// Copy of this path with its last segment replaced by `title`.
    pub fn with_tail(&self, title: &str) -> Self {
        self.parent().join(title)
    }

    /// Whether `other` is this path or lies below it.
    pub fn covers(&self, other: &str) -> bool {
        covers(&self.to_string(), other)
    }
}

/// String form of [`PathKey::covers`]: `candidate` equals `prefix` or starts
/// with `prefix` followed by the delimiter.
pub fn covers(prefix: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => !prefix.is_empty() && rest.starts_with(DELIMITER),
        None => false,
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{DELIMITER}")?;
            }
            f.write_str(seg)?;
        }
        Ok(())
    }
}

impl From<&str> for PathKey {
    fn from(s: &str) -> Self {
        PathKey::parse(s)
    }
}

impl From<String> for PathKey {
    fn from(s: String) -> Self {
        PathKey::parse(&s)
    }
}

impl<S: Into<String>> FromIterator<S> for PathKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PathKey {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}
