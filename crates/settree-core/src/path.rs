//! POSIX-style setting paths.
//!
//! Paths are `/`-separated and case-sensitive. Before resolution a path is
//! normalized: empty and `.` segments are dropped, `..` removes the previous
//! segment (and is a no-op at the root). Whether the raw path ended in a
//! separator is kept, since it selects between an object and its value.
//!
//! The raw path `//` is special: it always addresses the root node object.

use crate::error::{Result, SettingsError};

pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";
pub const ROOT_ALIAS: &str = "//";

/// A normalized path, split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingPath {
    segments: Vec<String>,
    trailing: bool,
    root_alias: bool,
}

impl SettingPath {
    pub fn parse(raw: &str) -> Self {
        let mut segments: Vec<String> = Vec::new();
        for part in raw.split(SEPARATOR) {
            match part {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name.to_string()),
            }
        }
        Self {
            segments,
            trailing: raw.ends_with(SEPARATOR),
            root_alias: raw == ROOT_ALIAS,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the raw path ended in a separator.
    pub fn has_trailing_separator(&self) -> bool {
        self.trailing
    }

    /// Whether the raw path was exactly `//`.
    pub fn is_root_alias(&self) -> bool {
        self.root_alias
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split into the first segment and the remaining ones.
    pub fn split_first(&self) -> Option<(&str, &[String])> {
        self.segments
            .split_first()
            .map(|(head, rest)| (head.as_str(), rest))
    }

    /// The canonical absolute form, without a trailing separator.
    pub fn to_canonical(&self) -> String {
        if self.segments.is_empty() {
            ROOT.to_string()
        } else {
            format!("{}{}", SEPARATOR, self.segments.join(ROOT))
        }
    }
}

/// Normalize `raw` to its canonical absolute form (`a/./b/` → `/a/b`).
pub fn normalize(raw: &str) -> String {
    SettingPath::parse(raw).to_canonical()
}

/// Append a child name to an absolute path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with(SEPARATOR) {
        format!("{}{}", parent, name)
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// True when `path` equals `prefix` or lies underneath it.
pub fn is_within(path: &str, prefix: &str) -> bool {
    if prefix == ROOT {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Check that `name` can be used as a single child name.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "child names cannot be empty"
    } else if name.contains(SEPARATOR) {
        "child names cannot contain '/'"
    } else if name == "." || name == ".." {
        "'.' and '..' are reserved"
    } else {
        return Ok(());
    };
    Err(SettingsError::invalid_path(name, reason))
}
