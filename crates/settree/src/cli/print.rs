use colored::Colorize;
use settree_core::{Child, Leaf, Node, TreeDiff};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const VALUE_WIDTH: usize = 30;
const VALID_MARKER: &str = "✓";
const INVALID_MARKER: &str = "✗";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

pub(super) fn print_message(level: MessageLevel, content: &str) {
    match level {
        MessageLevel::Info => println!("{}", content.dimmed()),
        MessageLevel::Success => println!("{}", content.green()),
        MessageLevel::Warning => println!("{}", content.yellow()),
        MessageLevel::Error => println!("{}", content.red()),
    }
}

/// One row of `settree show`.
#[derive(Debug, Clone)]
pub struct LeafRow {
    pub path: String,
    pub value: String,
    /// Why the leaf is invalid, if it is.
    pub problem: Option<String>,
}

pub(super) fn print_leaf_rows(rows: &[LeafRow]) {
    if rows.is_empty() {
        println!("No settings found.");
        return;
    }
    let path_width = rows.iter().map(|r| r.path.width()).max().unwrap_or(0);
    for row in rows {
        println!("{}", format_leaf_row(row, path_width));
    }
}

fn format_leaf_row(row: &LeafRow, path_width: usize) -> String {
    let padding = path_width.saturating_sub(row.path.width());
    let value = truncate_to_width(&row.value, VALUE_WIDTH);
    let value_padding = VALUE_WIDTH.saturating_sub(value.width());
    let status = match &row.problem {
        None => VALID_MARKER.green().to_string(),
        Some(problem) => {
            let available = LINE_WIDTH.saturating_sub(path_width + VALUE_WIDTH + 6);
            format!(
                "{} {}",
                INVALID_MARKER.red(),
                truncate_to_width(problem, available).red()
            )
        }
    };
    format!(
        "{}{}  {}{}  {}",
        row.path.bold(),
        " ".repeat(padding),
        value,
        " ".repeat(value_padding),
        status
    )
}

pub(super) fn print_paths(paths: &[String]) {
    for path in paths {
        println!("{}", path);
    }
}

pub(super) fn print_leaf(path: &str, leaf: &Leaf) {
    println!("{}", path.bold());
    for line in leaf_details(leaf) {
        println!("  {}", line);
    }
}

fn leaf_details(leaf: &Leaf) -> Vec<String> {
    let join = |items: Vec<String>| items.join(", ");
    let mut lines = vec![format!("value: {} ({})", leaf.value(), leaf.value().kind())];
    if let Some(kinds) = leaf.valid_value_types() {
        lines.push(format!(
            "types: {}",
            join(kinds.iter().map(|k| k.to_string()).collect())
        ));
    }
    if let Some(allowed) = leaf.allowed_values() {
        lines.push(format!(
            "allowed: {}",
            join(allowed.iter().map(|v| v.to_string()).collect())
        ));
    }
    if let Some(forbidden) = leaf.forbidden_values() {
        lines.push(format!(
            "forbidden: {}",
            join(forbidden.iter().map(|v| v.to_string()).collect())
        ));
    }
    if let Some(validators) = leaf.validators() {
        lines.push(format!(
            "validators: {}",
            join(validators.iter().map(|v| v.to_string()).collect())
        ));
    }
    if leaf.validator_function().is_some() {
        lines.push("validator function: yes".to_string());
    }
    for (key, value) in leaf.params().iter() {
        lines.push(format!("{} = {}", key.dimmed(), value));
    }
    lines
}

pub(super) fn print_node(path: &str, node: &Node) {
    println!("{}", path.bold());
    for (key, value) in node.params().iter() {
        println!("  {} = {}", key.dimmed(), value);
    }
    for (name, child) in node.iter() {
        match child {
            Child::Node(sub) => println!("  {}/ {}", name.blue(), format!("({})", sub.len()).dimmed()),
            Child::Leaf(leaf) => println!("  {} = {}", name, leaf.value()),
        }
    }
}

pub(super) fn print_diff(diff: &TreeDiff) {
    if diff.is_empty() {
        println!("{}", "No differences.".dimmed());
        return;
    }
    for line in diff_lines(diff) {
        println!("{}", line);
    }
}

fn diff_lines(diff: &TreeDiff) -> Vec<String> {
    let changed = diff.changed.iter().map(|p| format!("~ {}", p).yellow());
    let removed = diff.only_in_self.iter().map(|p| format!("- {}", p).red());
    let added = diff.only_in_other.iter().map(|p| format!("+ {}", p).green());
    changed
        .chain(removed)
        .chain(added)
        .map(|line| line.to_string())
        .collect()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}
