//! # Nodes and Path Resolution
//!
//! A [`Node`] is an ordered, named collection of children, each either a
//! [`Leaf`] or another `Node`. Children are owned exclusively by their parent,
//! so the structure is always a tree. Insertion order is kept and is the
//! display order.
//!
//! ## Path Semantics
//!
//! | Path | `get` returns |
//! |------|---------------|
//! | `/` or `//` | the root node itself |
//! | `.` or `""` | names of the root's children |
//! | `/a/b` | value of leaf `b`, or child names of node `b` |
//! | `/a/b/` | leaf or node object `b` |
//! | `/a/leaf/key` | extra parameter `key` of `leaf` |
//!
//! `set` with a [`Leaf`] or `Node` stores it unconditionally and creates
//! missing intermediate nodes on the way. `set` with a plain value only ever
//! overwrites the value of an existing leaf (or a leaf's extra parameter).
//! Neither `set` nor `delete` accept the root.

use crate::error::{Result, SettingsError};
use crate::leaf::Leaf;
use crate::params::ExtraParameters;
use crate::path::{self, SettingPath};
use crate::value::SettingValue;
use std::collections::BTreeSet;

/// A child of a node.
#[derive(Debug, Clone)]
pub enum Child {
    Leaf(Leaf),
    Node(Node),
}

impl Child {
    pub fn kind(&self) -> EntryKind {
        match self {
            Child::Leaf(_) => EntryKind::Leaf,
            Child::Node(_) => EntryKind::Node,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Child::Leaf(leaf) => Some(leaf),
            Child::Node(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Child::Leaf(leaf) => Some(leaf),
            Child::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Leaf(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Leaf(_) => None,
        }
    }
}

impl From<Leaf> for Child {
    fn from(leaf: Leaf) -> Self {
        Child::Leaf(leaf)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Node,
    Leaf,
    /// An extra parameter of a leaf.
    Parameter,
}

/// Filter for [`Node::list_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    #[default]
    All,
    Node,
    Leaf,
}

impl ListKind {
    fn accepts(&self, kind: EntryKind) -> bool {
        match self {
            ListKind::All => true,
            ListKind::Node => kind == EntryKind::Node,
            ListKind::Leaf => kind == EntryKind::Leaf,
        }
    }
}

/// Result of [`Node::get`].
#[derive(Debug, Clone)]
pub enum Resolved<'a> {
    /// Value of a leaf (path without trailing separator).
    Value(&'a SettingValue),
    /// Child names of a node (path without trailing separator).
    Children(Vec<String>),
    /// A leaf object (path with trailing separator).
    Leaf(&'a Leaf),
    /// A node object (path with trailing separator, or `//`).
    Node(&'a Node),
    /// An extra parameter of a leaf.
    Parameter(&'a SettingValue),
}

impl<'a> Resolved<'a> {
    /// The value for `Value` and `Parameter` results.
    pub fn value(&self) -> Option<&'a SettingValue> {
        match self {
            Resolved::Value(v) | Resolved::Parameter(v) => Some(v),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[String]> {
        match self {
            Resolved::Children(names) => Some(names),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&'a Leaf> {
        match self {
            Resolved::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            Resolved::Node(node) => Some(node),
            _ => None,
        }
    }
}

/// What [`Node::set`] writes at a path.
#[derive(Debug, Clone)]
pub enum Assign {
    /// A plain value, written into an existing leaf or leaf parameter.
    Value(SettingValue),
    /// A leaf or node, stored as a child.
    Child(Child),
}

impl From<Leaf> for Assign {
    fn from(leaf: Leaf) -> Self {
        Assign::Child(Child::Leaf(leaf))
    }
}

impl From<Node> for Assign {
    fn from(node: Node) -> Self {
        Assign::Child(Child::Node(node))
    }
}

impl From<Child> for Assign {
    fn from(child: Child) -> Self {
        Assign::Child(child)
    }
}

macro_rules! assign_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Assign {
                fn from(v: $ty) -> Self {
                    Assign::Value(v.into())
                }
            }
        )*
    };
}

assign_from_value!(SettingValue, bool, i32, i64, u32, f32, f64, String, &str, Vec<u8>);

/// What [`Node::delete`] removed.
#[derive(Debug, Clone)]
pub enum Removed {
    Child(Child),
    Parameter(SettingValue),
}

/// Leaf-level differences between two trees, each list sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// Leaves present in both trees whose values differ.
    pub changed: Vec<String>,
    /// Leaves only present in this tree.
    pub only_in_self: Vec<String>,
    /// Leaves only present in the other tree.
    pub only_in_other: Vec<String>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.only_in_self.is_empty() && self.only_in_other.is_empty()
    }

    /// The same diff seen from the other tree.
    pub fn reversed(self) -> Self {
        Self {
            changed: self.changed,
            only_in_self: self.only_in_other,
            only_in_other: self.only_in_self,
        }
    }
}

/// A named, ordered container of leaves and nodes.
#[derive(Debug, Clone, Default)]
pub struct Node {
    children: Vec<(String, Child)>,
    params: ExtraParameters,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a node by setting each `(path, child)` pair in order.
    ///
    /// Paths may be nested (`"net/port"`); intermediate nodes are created.
    pub fn from_children<P, C, I>(children: I) -> Result<Self>
    where
        P: AsRef<str>,
        C: Into<Child>,
        I: IntoIterator<Item = (P, C)>,
    {
        let mut node = Self::new();
        for (path, child) in children {
            node.set(path.as_ref(), Assign::Child(child.into()))?;
        }
        Ok(node)
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Child)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Child)> {
        self.children
            .iter_mut()
            .map(|(name, child)| (name.as_str(), child))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn child(&self, name: &str) -> Option<&Child> {
        self.position(name).map(|i| &self.children[i].1)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Child> {
        self.position(name).map(move |i| &mut self.children[i].1)
    }

    /// Insert or replace a direct child, returning the one it replaced.
    ///
    /// A replaced child keeps its position in the display order.
    pub fn insert(&mut self, name: &str, child: impl Into<Child>) -> Result<Option<Child>> {
        path::validate_name(name)?;
        let child = child.into();
        match self.position(name) {
            Some(i) => Ok(Some(std::mem::replace(&mut self.children[i].1, child))),
            None => {
                self.children.push((name.to_string(), child));
                Ok(None)
            }
        }
    }

    /// Detach a direct child.
    pub fn remove(&mut self, name: &str) -> Option<Child> {
        self.position(name).map(|i| self.children.remove(i).1)
    }

    pub fn params(&self) -> &ExtraParameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ExtraParameters {
        &mut self.params
    }

    pub fn param(&self, key: &str) -> Option<&SettingValue> {
        self.params.get(key)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.params.set(key, value);
    }

    pub fn remove_param(&mut self, key: &str) -> Result<SettingValue> {
        self.params
            .remove(key)
            .ok_or_else(|| SettingsError::not_found(key))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|(n, _)| n == name)
    }

    fn child_names(&self) -> Vec<String> {
        self.keys().map(str::to_string).collect()
    }

    // ------------------------------------------------------------------
    // Path-addressed access
    // ------------------------------------------------------------------

    /// Resolve a path. See the module docs for the trailing-separator rules.
    pub fn get(&self, path: &str) -> Result<Resolved<'_>> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            // `/` and `//` both end in a separator; `""` and `.` do not.
            return if parsed.is_root_alias() || parsed.has_trailing_separator() {
                Ok(Resolved::Node(self))
            } else {
                Ok(Resolved::Children(self.child_names()))
            };
        }
        self.get_in(parsed.segments(), parsed.has_trailing_separator(), path)
    }

    fn get_in(&self, segments: &[String], trailing: bool, full: &str) -> Result<Resolved<'_>> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(SettingsError::not_found(full));
        };
        let child = self
            .child(head)
            .ok_or_else(|| SettingsError::not_found(full))?;

        match (child, rest) {
            (Child::Leaf(leaf), []) if trailing => Ok(Resolved::Leaf(leaf)),
            (Child::Leaf(leaf), []) => Ok(Resolved::Value(leaf.value())),
            (Child::Node(node), []) if trailing => Ok(Resolved::Node(node)),
            (Child::Node(node), []) => Ok(Resolved::Children(node.child_names())),
            (Child::Node(node), rest) => node.get_in(rest, trailing, full),
            (Child::Leaf(leaf), [key]) => leaf
                .param(key)
                .map(Resolved::Parameter)
                .ok_or_else(|| SettingsError::not_found(full)),
            (Child::Leaf(_), _) => Err(SettingsError::not_found(full)),
        }
    }

    /// Write a value, leaf or node at a path.
    pub fn set(&mut self, path: &str, item: impl Into<Assign>) -> Result<()> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            return Err(SettingsError::invalid_path(path, "the root cannot be replaced"));
        }
        self.set_in(parsed.segments(), item.into(), path)
    }

    fn set_in(&mut self, segments: &[String], item: Assign, full: &str) -> Result<()> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(SettingsError::not_found(full));
        };

        if rest.is_empty() {
            return match item {
                Assign::Child(child) => self.insert(head, child).map(|_| ()),
                Assign::Value(value) => match self.child_mut(head) {
                    Some(Child::Leaf(leaf)) => {
                        leaf.set_value(value);
                        Ok(())
                    }
                    Some(Child::Node(_)) => Err(SettingsError::TypeMismatch(format!(
                        "{} is a node and cannot hold a value",
                        full
                    ))),
                    None => Err(SettingsError::not_found(full)),
                },
            };
        }

        if !self.contains_key(head) {
            return match item {
                Assign::Child(_) => {
                    let mut created = Node::new();
                    created.set_in(rest, item, full)?;
                    self.insert(head, created).map(|_| ())
                }
                Assign::Value(_) => Err(SettingsError::not_found(full)),
            };
        }

        match self.child_mut(head) {
            Some(Child::Node(node)) => node.set_in(rest, item, full),
            Some(Child::Leaf(leaf)) => match (rest, item) {
                ([key], Assign::Value(value)) => {
                    leaf.set_param(key.clone(), value);
                    Ok(())
                }
                ([_], Assign::Child(_)) => Err(SettingsError::TypeMismatch(format!(
                    "{} is a leaf parameter and can only hold a value",
                    full
                ))),
                _ => Err(SettingsError::not_found(full)),
            },
            None => Err(SettingsError::not_found(full)),
        }
    }

    /// Remove the child or leaf parameter at a path and hand it back.
    pub fn delete(&mut self, path: &str) -> Result<Removed> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            return Err(SettingsError::invalid_path(path, "the root cannot be deleted"));
        }
        self.delete_in(parsed.segments(), path)
    }

    fn delete_in(&mut self, segments: &[String], full: &str) -> Result<Removed> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(SettingsError::not_found(full));
        };

        if rest.is_empty() {
            return self
                .remove(head)
                .map(Removed::Child)
                .ok_or_else(|| SettingsError::not_found(full));
        }

        match self.child_mut(head) {
            Some(Child::Node(node)) => node.delete_in(rest, full),
            Some(Child::Leaf(leaf)) => match rest {
                [key] => leaf
                    .params_mut()
                    .remove(key)
                    .map(Removed::Parameter)
                    .ok_or_else(|| SettingsError::not_found(full)),
                _ => Err(SettingsError::not_found(full)),
            },
            None => Err(SettingsError::not_found(full)),
        }
    }

    /// Whether a path resolves to anything (node, leaf or leaf parameter).
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// Classify what a path points at.
    pub fn kind_of(&self, path: &str) -> Result<EntryKind> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            return Ok(EntryKind::Node);
        }
        if let Some(child) = self.locate(parsed.segments()) {
            return Ok(child.kind());
        }
        match self.get(path)? {
            Resolved::Parameter(_) => Ok(EntryKind::Parameter),
            _ => Err(SettingsError::not_found(path)),
        }
    }

    fn locate(&self, segments: &[String]) -> Option<&Child> {
        let (head, rest) = segments.split_first()?;
        let child = self.child(head)?;
        if rest.is_empty() {
            return Some(child);
        }
        match child {
            Child::Node(node) => node.locate(rest),
            Child::Leaf(_) => None,
        }
    }

    fn locate_mut(&mut self, segments: &[String]) -> Option<&mut Child> {
        let (head, rest) = segments.split_first()?;
        let child = self.child_mut(head)?;
        if rest.is_empty() {
            return Some(child);
        }
        match child {
            Child::Node(node) => node.locate_mut(rest),
            Child::Leaf(_) => None,
        }
    }

    /// The leaf at a path.
    pub fn leaf(&self, path: &str) -> Result<&Leaf> {
        let parsed = SettingPath::parse(path);
        match self.locate(parsed.segments()) {
            Some(Child::Leaf(leaf)) => Ok(leaf),
            Some(Child::Node(_)) => Err(not_a_leaf(path)),
            None if parsed.is_root() => Err(not_a_leaf(path)),
            None => Err(SettingsError::not_found(path)),
        }
    }

    pub fn leaf_mut(&mut self, path: &str) -> Result<&mut Leaf> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            return Err(not_a_leaf(path));
        }
        match self.locate_mut(parsed.segments()) {
            Some(Child::Leaf(leaf)) => Ok(leaf),
            Some(Child::Node(_)) => Err(not_a_leaf(path)),
            None => Err(SettingsError::not_found(path)),
        }
    }

    /// The node at a path; `/` is this node.
    pub fn node(&self, path: &str) -> Result<&Node> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            return Ok(self);
        }
        match self.locate(parsed.segments()) {
            Some(Child::Node(node)) => Ok(node),
            Some(Child::Leaf(_)) => Err(not_a_node(path)),
            None => Err(SettingsError::not_found(path)),
        }
    }

    pub fn node_mut(&mut self, path: &str) -> Result<&mut Node> {
        let parsed = SettingPath::parse(path);
        if parsed.is_root() {
            return Ok(self);
        }
        match self.locate_mut(parsed.segments()) {
            Some(Child::Node(node)) => Ok(node),
            Some(Child::Leaf(_)) => Err(not_a_node(path)),
            None => Err(SettingsError::not_found(path)),
        }
    }

    // ------------------------------------------------------------------
    // Enumeration and comparison
    // ------------------------------------------------------------------

    /// Child names of the node at `path`; a leaf has none.
    pub fn list_children(&self, path: &str) -> Result<Vec<String>> {
        match self.kind_of(path)? {
            EntryKind::Node => Ok(self.node(path)?.child_names()),
            EntryKind::Leaf | EntryKind::Parameter => Ok(Vec::new()),
        }
    }

    /// Absolute paths of every descendant of the given kind, sorted.
    pub fn list_all(&self, kind: ListKind) -> Vec<String> {
        self.list_under(path::ROOT, kind)
    }

    /// Like [`Node::list_all`], rooted at `path`. Returned paths include the
    /// `path` prefix.
    pub fn list_all_at(&self, path: &str, kind: ListKind) -> Result<Vec<String>> {
        match self.kind_of(path)? {
            EntryKind::Node => Ok(self.node(path)?.list_under(&path::normalize(path), kind)),
            EntryKind::Leaf | EntryKind::Parameter => Ok(Vec::new()),
        }
    }

    fn list_under(&self, prefix: &str, kind: ListKind) -> Vec<String> {
        let mut entries = Vec::new();
        self.collect_entries(prefix, &mut entries);
        let mut paths: Vec<String> = entries
            .into_iter()
            .filter(|(_, k)| kind.accepts(*k))
            .map(|(p, _)| p)
            .collect();
        paths.sort();
        paths
    }

    fn collect_entries(&self, prefix: &str, out: &mut Vec<(String, EntryKind)>) {
        for (name, child) in self.iter() {
            let child_path = path::join(prefix, name);
            if let Child::Node(node) = child {
                node.collect_entries(&child_path, out);
            }
            out.push((child_path, child.kind()));
        }
    }

    /// Compare the leaves of two trees by path and value.
    ///
    /// A path that is a leaf in one tree and a node in the other counts as
    /// "only in" for the side where it is a leaf.
    pub fn diff(&self, other: &Node) -> TreeDiff {
        let mine = self.flat_values();
        let theirs = other.flat_values();
        let mine_paths: BTreeSet<&String> = mine.keys().collect();
        let their_paths: BTreeSet<&String> = theirs.keys().collect();

        let changed = mine_paths
            .intersection(&their_paths)
            .filter(|p| mine[p.as_str()] != theirs[p.as_str()])
            .map(|p| p.to_string())
            .collect();

        TreeDiff {
            changed,
            only_in_self: mine_paths
                .difference(&their_paths)
                .map(|p| p.to_string())
                .collect(),
            only_in_other: their_paths
                .difference(&mine_paths)
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

fn not_a_leaf(path: &str) -> SettingsError {
    SettingsError::TypeMismatch(format!("{} is a node, not a leaf", path))
}

fn not_a_node(path: &str) -> SettingsError {
    SettingsError::TypeMismatch(format!("{} is a leaf, not a node", path))
}
