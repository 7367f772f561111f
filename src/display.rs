//! Plain-text rendering used by the command handlers.

use chrono::{Local, TimeZone};

use crate::clock::SECONDS_PER_DAY;
use crate::node::NodeId;
use crate::tree::TaskTree;

/// Format a deadline relative to `now` ("in 3d", "in 5h", "2d late").
pub fn format_deadline_relative(deadline: f64, now: f64) -> String {
    if deadline == 0.0 {
        return "-".into();
    }
    let delta = deadline - now;
    let days = (delta.abs() / SECONDS_PER_DAY).floor() as i64;
    let hours = (delta.abs() / 3600.0).floor() as i64;
    let amount = if days > 0 {
        format!("{days}d")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{}m", (delta.abs() / 60.0).floor() as i64)
    };
    if delta >= 0.0 {
        format!("in {amount}")
    } else {
        format!("{amount} late")
    }
}

/// Format a deadline as local date and time.
pub fn format_deadline(deadline: f64) -> String {
    if deadline == 0.0 {
        return "-".into();
    }
    let secs = deadline.floor() as i64;
    match Local.timestamp_opt(secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".into(),
    }
}

pub fn format_priority(p: Option<i64>) -> String {
    p.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

pub fn format_done(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks as a table, one row per node, named by full path.
pub fn print_table(tree: &TaskTree, ids: &[NodeId], now: f64) {
    println!("{:<4} {:<4} {:<12} {}", "Done", "Pri", "Deadline", "Task");
    for &id in ids {
        let Some(node) = tree.node(id) else {
            continue;
        };
        let desc = if node.description.is_empty() {
            String::new()
        } else {
            format!("  {}", truncate(&node.description, 40))
        };
        println!(
            "{:<4} {:<4} {:<12} {}{}",
            format_done(node.done),
            format_priority(node.priority),
            format_deadline_relative(node.deadline, now),
            tree.nodes().full_path(id),
            desc
        );
    }
}

/// Depth-first print of the subtree below `id`.
pub fn print_subtree(tree: &TaskTree, id: NodeId, depth: usize) {
    for child in tree.nodes().sorted_children(id) {
        let node = &tree.nodes()[child];
        println!("{}- {} {}", "  ".repeat(depth), format_done(node.done), node.title);
        print_subtree(tree, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_deadlines() {
        let now = 10_000_000.0;
        assert_eq!(format_deadline_relative(0.0, now), "-");
        assert_eq!(format_deadline_relative(now + 3.5 * 86_400.0, now), "in 3d");
        assert_eq!(format_deadline_relative(now + 7_300.0, now), "in 2h");
        assert_eq!(format_deadline_relative(now + 90.0, now), "in 1m");
        assert_eq!(format_deadline_relative(now - 2.0 * 86_400.0, now), "2d late");
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long description", 6), "a lon…");
    }

    #[test]
    fn absent_values_render_as_dash() {
        assert_eq!(format_priority(None), "-");
        assert_eq!(format_priority(Some(5)), "5");
        assert_eq!(format_deadline(0.0), "-");
    }
}
