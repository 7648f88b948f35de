//! Whole-tree validation.
//!
//! Every leaf is checked against a single flat snapshot of the tree it lives
//! in, so a validator function can look at any other setting. Scoped queries
//! (`find_invalid_at`, `path_is_valid`) still check against the full snapshot
//! and only filter the results by path.

use crate::error::{Result, SettingsError};
use crate::leaf::Invalidity;
use crate::node::{Child, Node};
use crate::path;
use crate::values::FlatValues;
use tracing::trace;

/// A leaf that failed validation and the first check it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEntry {
    pub path: String,
    pub reason: Invalidity,
}

impl Node {
    /// Check every leaf, in tree order.
    pub fn validate(&self) -> Vec<InvalidEntry> {
        let snapshot = self.flat_values();
        let mut out = Vec::new();
        self.collect_invalid(path::ROOT, &snapshot, &mut out);
        out
    }

    fn collect_invalid(&self, prefix: &str, snapshot: &FlatValues, out: &mut Vec<InvalidEntry>) {
        for (name, child) in self.iter() {
            let child_path = path::join(prefix, name);
            match child {
                Child::Leaf(leaf) => {
                    if let Err(reason) = leaf.check(snapshot) {
                        trace!(path = %child_path, %reason, "invalid leaf");
                        out.push(InvalidEntry {
                            path: child_path,
                            reason,
                        });
                    }
                }
                Child::Node(node) => node.collect_invalid(&child_path, snapshot, out),
            }
        }
    }

    /// Paths of every invalid leaf.
    pub fn find_invalid(&self) -> Vec<String> {
        self.validate().into_iter().map(|entry| entry.path).collect()
    }

    /// Like [`Node::validate`], keeping only leaves at or below `path`.
    ///
    /// `path` must name a node or a leaf.
    pub fn validate_at(&self, path: &str) -> Result<Vec<InvalidEntry>> {
        self.require_entry(path)?;
        let prefix = path::normalize(path);
        Ok(self
            .validate()
            .into_iter()
            .filter(|entry| path::is_within(&entry.path, &prefix))
            .collect())
    }

    /// Paths of invalid leaves at or below `path`.
    pub fn find_invalid_at(&self, path: &str) -> Result<Vec<String>> {
        Ok(self
            .validate_at(path)?
            .into_iter()
            .map(|entry| entry.path)
            .collect())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Whether every leaf at or below `path` is valid.
    pub fn path_is_valid(&self, path: &str) -> Result<bool> {
        Ok(self.find_invalid_at(path)?.is_empty())
    }

    fn require_entry(&self, path: &str) -> Result<()> {
        let parsed = path::SettingPath::parse(path);
        if parsed.is_root() || self.node(path).is_ok() || self.leaf(path).is_ok() {
            Ok(())
        } else {
            Err(SettingsError::not_found(path))
        }
    }
}
