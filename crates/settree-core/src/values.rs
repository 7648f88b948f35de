//! # Bulk Values
//!
//! A tree's leaf values can be extracted and applied as a whole, in one of two
//! shapes:
//!
//! - **Flat**: canonical absolute leaf path → value (`{"/net/port": 80}`).
//!   Also the snapshot handed to validator functions.
//! - **Nested**: a mapping that mirrors the node structure
//!   (`{"net": {"port": 80}}`).
//!
//! Applying values is transactional. [`Node::set_values`] stages the values on
//! a deep copy, validates the copy as a whole, and only then touches the live
//! tree. Keys that match nothing are ignored, as are values aimed at nodes.

use crate::leaf::Leaf;
use crate::node::{Child, Node};
use crate::path;
use crate::validation::InvalidEntry;
use crate::value::SettingValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Canonical absolute leaf path → value.
pub type FlatValues = BTreeMap<String, SettingValue>;

/// Child name → value or nested mapping.
pub type NestedValues = BTreeMap<String, ValueEntry>;

/// One entry of a [`NestedValues`] mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueEntry {
    Value(SettingValue),
    Map(NestedValues),
}

macro_rules! entry_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ValueEntry {
                fn from(v: $ty) -> Self {
                    ValueEntry::Value(v.into())
                }
            }
        )*
    };
}

entry_from_value!(SettingValue, bool, i32, i64, u32, f32, f64, String, &str, Vec<u8>);

/// Which shape [`Node::get_values`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueForm {
    #[default]
    Nested,
    Flat,
}

/// Values in either shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Flat(FlatValues),
    Nested(NestedValues),
}

impl Values {
    pub fn form(&self) -> ValueForm {
        match self {
            Values::Flat(_) => ValueForm::Flat,
            Values::Nested(_) => ValueForm::Nested,
        }
    }

    pub fn into_flat(self) -> FlatValues {
        match self {
            Values::Flat(flat) => flat,
            Values::Nested(nested) => flatten(&nested),
        }
    }

    pub fn into_nested(self) -> NestedValues {
        match self {
            Values::Flat(flat) => nest(&flat),
            Values::Nested(nested) => nested,
        }
    }
}

impl From<FlatValues> for Values {
    fn from(flat: FlatValues) -> Self {
        Values::Flat(flat)
    }
}

impl From<NestedValues> for Values {
    fn from(nested: NestedValues) -> Self {
        Values::Nested(nested)
    }
}

/// Turn a nested mapping into canonical flat paths.
pub fn flatten(nested: &NestedValues) -> FlatValues {
    let mut flat = FlatValues::new();
    flatten_into(nested, path::ROOT, &mut flat);
    flat
}

fn flatten_into(nested: &NestedValues, prefix: &str, out: &mut FlatValues) {
    for (name, entry) in nested {
        let entry_path = path::join(prefix, name);
        match entry {
            ValueEntry::Value(value) => {
                out.insert(entry_path, value.clone());
            }
            ValueEntry::Map(map) => flatten_into(map, &entry_path, out),
        }
    }
}

/// Turn flat paths into a nested mapping.
///
/// Paths are normalized first. A path that runs through an earlier value
/// replaces that value with a mapping.
pub fn nest(flat: &FlatValues) -> NestedValues {
    let mut nested = NestedValues::new();
    for (raw, value) in flat {
        let parsed = path::SettingPath::parse(raw);
        insert_nested(&mut nested, parsed.segments(), value);
    }
    nested
}

fn insert_nested(level: &mut NestedValues, segments: &[String], value: &SettingValue) {
    match segments {
        [] => {}
        [last] => {
            level.insert(last.clone(), ValueEntry::Value(value.clone()));
        }
        [head, rest @ ..] => {
            let entry = level
                .entry(head.clone())
                .or_insert_with(|| ValueEntry::Map(NestedValues::new()));
            if let ValueEntry::Value(_) = entry {
                *entry = ValueEntry::Map(NestedValues::new());
            }
            if let ValueEntry::Map(map) = entry {
                insert_nested(map, rest, value);
            }
        }
    }
}

/// Something that can write leaf values into a tree.
///
/// Implemented for both value shapes so [`Node::set_values`] accepts either.
pub trait ValueSource {
    /// Write matching values into `tree`, returning how many leaves were set.
    fn stage(&self, tree: &mut Node) -> usize;
}

impl ValueSource for FlatValues {
    fn stage(&self, tree: &mut Node) -> usize {
        let mut staged = 0;
        for (path, value) in self {
            match tree.leaf_mut(path) {
                Ok(leaf) => {
                    leaf.set_value(value.clone());
                    staged += 1;
                }
                Err(err) => trace!(%path, %err, "skipping value"),
            }
        }
        staged
    }
}

impl ValueSource for NestedValues {
    fn stage(&self, tree: &mut Node) -> usize {
        stage_nested(tree, self)
    }
}

impl ValueSource for Values {
    fn stage(&self, tree: &mut Node) -> usize {
        match self {
            Values::Flat(flat) => flat.stage(tree),
            Values::Nested(nested) => nested.stage(tree),
        }
    }
}

fn stage_nested(node: &mut Node, values: &NestedValues) -> usize {
    let mut staged = 0;
    for (name, child) in node.iter_mut() {
        let Some(entry) = values.get(name) else {
            continue;
        };
        match (child, entry) {
            (Child::Node(sub), ValueEntry::Map(map)) => staged += stage_nested(sub, map),
            (Child::Leaf(leaf), ValueEntry::Value(value)) => {
                leaf.set_value(value.clone());
                staged += 1;
            }
            (Child::Node(_), ValueEntry::Value(_)) => {
                trace!(child = name, "skipping value aimed at a node");
            }
            (Child::Leaf(_), ValueEntry::Map(_)) => {
                trace!(child = name, "skipping mapping aimed at a leaf");
            }
        }
    }
    staged
}

impl Node {
    /// Every leaf value, keyed by canonical absolute path.
    pub fn flat_values(&self) -> FlatValues {
        let mut flat = FlatValues::new();
        self.collect_flat(path::ROOT, &mut flat);
        flat
    }

    fn collect_flat(&self, prefix: &str, out: &mut FlatValues) {
        for (name, child) in self.iter() {
            let child_path = path::join(prefix, name);
            match child {
                Child::Leaf(leaf) => {
                    out.insert(child_path, leaf.value().clone());
                }
                Child::Node(node) => node.collect_flat(&child_path, out),
            }
        }
    }

    /// Every leaf value, as a mapping mirroring the node structure.
    ///
    /// Empty nodes appear as empty mappings.
    pub fn nested_values(&self) -> NestedValues {
        self.iter()
            .map(|(name, child)| {
                let entry = match child {
                    Child::Leaf(leaf) => ValueEntry::Value(leaf.value().clone()),
                    Child::Node(node) => ValueEntry::Map(node.nested_values()),
                };
                (name.to_string(), entry)
            })
            .collect()
    }

    pub fn get_values(&self, form: ValueForm) -> Values {
        match form {
            ValueForm::Flat => Values::Flat(self.flat_values()),
            ValueForm::Nested => Values::Nested(self.nested_values()),
        }
    }

    /// Apply values as one transaction.
    ///
    /// The values are staged on a copy of the tree and the copy is validated.
    /// If every leaf is valid, or `force` is set, the live tree receives the
    /// values; otherwise it is left exactly as it was. Returns whether the
    /// staged tree was valid.
    pub fn set_values<V: ValueSource + ?Sized>(&mut self, values: &V, force: bool) -> bool {
        self.set_values_with_report(values, force).is_empty()
    }

    /// Same transaction as [`Node::set_values`], returning the invalid leaves
    /// of the staged tree instead of a flag. An empty report means the values
    /// were valid and committed.
    pub fn set_values_with_report<V: ValueSource + ?Sized>(
        &mut self,
        values: &V,
        force: bool,
    ) -> Vec<InvalidEntry> {
        let mut staged = self.clone();
        let touched = values.stage(&mut staged);
        let report = staged.validate();
        let valid = report.is_empty();

        if valid || force {
            values.stage(self);
            debug!(touched, valid, force, "committed values");
        } else {
            debug!(touched, invalid = report.len(), "rejected values, tree unchanged");
        }
        report
    }

    /// Set one leaf value, keeping it only if the whole tree stays valid.
    ///
    /// Returns whether the tree was valid with the new value. Without `force`
    /// an invalid value is reverted before returning.
    pub fn set_setting_by_path(
        &mut self,
        path: &str,
        value: impl Into<SettingValue>,
        force: bool,
    ) -> crate::Result<bool> {
        let previous = self.leaf_mut(path)?.replace_value(value.into());
        let valid = self.is_valid();
        if !valid && !force {
            self.leaf_mut(path)?.set_value(previous);
            debug!(path, "reverted invalid value");
        }
        Ok(valid)
    }

    /// Take over the leaf values of another tree where paths match.
    pub fn adopt_values(&mut self, other: &Node, force: bool) -> bool {
        self.set_values(&other.nested_values(), force)
    }

    /// Name used by consumers that persist settings; same as
    /// [`Node::get_values`].
    pub fn extract_values(&self, form: ValueForm) -> Values {
        self.get_values(form)
    }

    /// Name used by consumers that load persisted settings; same as
    /// [`Node::set_values`].
    pub fn apply_values<V: ValueSource + ?Sized>(&mut self, values: &V, force: bool) -> bool {
        self.set_values(values, force)
    }
}

/// Build a tree of unconstrained leaves from a nested mapping.
impl From<&NestedValues> for Node {
    fn from(values: &NestedValues) -> Self {
        let mut node = Node::new();
        for (name, entry) in values {
            let child = match entry {
                ValueEntry::Value(value) => Child::Leaf(Leaf::new(value.clone())),
                ValueEntry::Map(map) => Child::Node(Node::from(map)),
            };
            if let Err(err) = node.insert(name, child) {
                trace!(%err, "skipping entry");
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Validator;

    fn v(x: impl Into<SettingValue>) -> SettingValue {
        x.into()
    }

    fn sample() -> Node {
        Node::from_children([
            ("a", Child::from(Leaf::new(1))),
            ("b/c", Leaf::new("x").into()),
            ("b/empty", Node::new().into()),
        ])
        .unwrap()
    }

    #[test]
    fn test_flat_values_use_canonical_paths() {
        let flat = sample().flat_values();
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["/a", "/b/c"]);
    }

    #[test]
    fn test_nested_values_mirror_structure() {
        let nested = sample().nested_values();
        let expected: NestedValues = [
            ("a".to_string(), ValueEntry::from(1)),
            (
                "b".to_string(),
                ValueEntry::Map(
                    [
                        ("c".to_string(), ValueEntry::from("x")),
                        ("empty".to_string(), ValueEntry::Map(NestedValues::new())),
                    ]
                    .into_iter()
                    .collect(),
                ),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(nested, expected);
    }

    #[test]
    fn test_get_values_by_form() {
        let tree = sample();
        assert_eq!(tree.get_values(ValueForm::Flat).form(), ValueForm::Flat);
        assert_eq!(tree.get_values(ValueForm::Nested).form(), ValueForm::Nested);
        assert_eq!(
            tree.get_values(ValueForm::Nested).into_flat(),
            tree.flat_values()
        );
    }

    #[test]
    fn test_into_nested_from_flat_paths() {
        let flat: FlatValues = [("/a".to_string(), v(1)), ("/b/c".to_string(), v("x"))]
            .into_iter()
            .collect();
        let values = Values::from(flat);
        assert_eq!(values.form(), ValueForm::Flat);
        let nested = values.into_nested();
        assert_eq!(nested["a"], ValueEntry::from(1));
        assert!(matches!(&nested["b"], ValueEntry::Map(map) if map["c"] == ValueEntry::from("x")));
    }

    #[test]
    fn test_flatten_and_nest_agree() {
        let tree = sample();
        let flat = tree.flat_values();
        assert_eq!(flatten(&nest(&flat)), flat);
    }

    #[test]
    fn test_nest_normalizes_paths() {
        let flat: FlatValues = [("a/./b/".to_string(), v(1))].into_iter().collect();
        assert_eq!(flatten(&nest(&flat)).keys().collect::<Vec<_>>(), vec!["/a/b"]);
    }

    #[test]
    fn test_set_values_nested_ignores_unknown_and_mismatched_entries() {
        let mut tree = sample();
        let values: NestedValues = [
            ("a".to_string(), ValueEntry::from(2)),
            ("zz".to_string(), ValueEntry::from(3)),
            ("b".to_string(), ValueEntry::from(4)),
        ]
        .into_iter()
        .collect();
        assert!(tree.set_values(&values, false));
        assert_eq!(tree.get("/a").unwrap().value(), Some(&v(2)));
        assert_eq!(tree.get("/b/c").unwrap().value(), Some(&v("x")));
        assert!(!tree.contains("/zz"));
    }

    #[test]
    fn test_set_values_flat_ignores_missing_and_node_paths() {
        let mut tree = sample();
        let values: FlatValues = [
            ("/b/c".to_string(), v("y")),
            ("/missing".to_string(), v(1)),
            ("/b".to_string(), v(1)),
        ]
        .into_iter()
        .collect();
        assert!(tree.set_values(&values, false));
        assert_eq!(tree.get("/b/c").unwrap().value(), Some(&v("y")));
        assert_eq!(tree.list_all(crate::ListKind::All).len(), 4);
    }

    #[test]
    fn test_set_values_rejects_invalid_batch_atomically() {
        let mut tree = Node::from_children([
            ("x", Leaf::new(1).with_validators([Validator::LessThan(v(10))]).unwrap()),
            ("y", Leaf::new(1)),
        ])
        .unwrap();
        let values: FlatValues = [("/x".to_string(), v(50)), ("/y".to_string(), v(2))]
            .into_iter()
            .collect();

        assert!(!tree.set_values(&values, false));
        assert_eq!(tree.get("/x").unwrap().value(), Some(&v(1)));
        assert_eq!(tree.get("/y").unwrap().value(), Some(&v(1)));

        assert!(!tree.set_values(&values, true));
        assert_eq!(tree.get("/x").unwrap().value(), Some(&v(50)));
        assert_eq!(tree.get("/y").unwrap().value(), Some(&v(2)));
    }

    #[test]
    fn test_set_values_with_report_explains_rejection() {
        let mut tree = Node::from_children([
            ("x", Leaf::new(1).with_validators([Validator::LessThan(v(10))]).unwrap()),
            ("y", Leaf::new(1).with_forbidden([0])),
        ])
        .unwrap();
        let values: FlatValues = [("/x".to_string(), v(50)), ("/y".to_string(), v(0))]
            .into_iter()
            .collect();

        let report = tree.set_values_with_report(&values, false);
        let paths: Vec<&str> = report.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/x", "/y"]);
        assert_eq!(tree.get("/x").unwrap().value(), Some(&v(1)));

        let report = tree.set_values_with_report(&values, true);
        assert_eq!(report.len(), 2);
        assert_eq!(tree.get("/y").unwrap().value(), Some(&v(0)));

        let fixed: FlatValues = [("/x".to_string(), v(2)), ("/y".to_string(), v(3))]
            .into_iter()
            .collect();
        assert!(tree.set_values_with_report(&fixed, false).is_empty());
        assert!(tree.is_valid());
    }

    #[test]
    fn test_set_setting_by_path_reverts_unless_forced() {
        let mut tree =
            Node::from_children([("n", Leaf::new(5).with_forbidden([0]))]).unwrap();
        assert!(!tree.set_setting_by_path("/n", 0, false).unwrap());
        assert_eq!(tree.get("/n").unwrap().value(), Some(&v(5)));
        assert!(!tree.set_setting_by_path("/n", 0, true).unwrap());
        assert_eq!(tree.get("/n").unwrap().value(), Some(&v(0)));
        assert!(tree.set_setting_by_path("/n", 7, false).unwrap());
        assert!(tree.set_setting_by_path("/missing", 1, false).is_err());
    }

    #[test]
    fn test_adopt_values_copies_matching_leaves() {
        let mut tree = sample();
        let other = Node::from_children([("a", Leaf::new(9)), ("q", Leaf::new(1))]).unwrap();
        assert!(tree.adopt_values(&other, false));
        assert_eq!(tree.get("/a").unwrap().value(), Some(&v(9)));
        assert!(!tree.contains("/q"));
    }

    #[test]
    fn test_tree_from_nested_values() {
        let tree = Node::from(&sample().nested_values());
        assert!(tree.diff(&sample()).is_empty());
        assert_eq!(tree.kind_of("/b/empty").unwrap(), crate::EntryKind::Node);
    }
}
