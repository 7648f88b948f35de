//! # Schema Documents
//!
//! A schema describes the structure and constraints of a tree. Children are
//! listed in display order, each with a `name`:
//!
//! ```yaml
//! children:
//!   - name: network
//!     params: { display_name: Network }
//!     children:
//!       - name: port
//!         value: 8080
//!         types: [int]
//!         validators:
//!           - { name: Between, params: [1, 65535] }
//!       - name: mode
//!         value: tcp
//!         allowed: [tcp, udp]
//! ```
//!
//! An entry with a `value` is a leaf, an entry with `children` is a node.
//! Validator functions only exist in code and have no schema form.

use serde::{Deserialize, Serialize};
use settree_core::{Child, Leaf, Node, Result, SettingValue, ValueKind};
use std::collections::BTreeMap;

/// The root of a schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeSchema {
    #[serde(default)]
    pub children: Vec<EntrySchema>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, SettingValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySchema {
    Leaf(LeafSchema),
    Node(NodeSchema),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSchema {
    pub name: String,
    pub children: Vec<EntrySchema>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, SettingValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafSchema {
    pub name: String,
    pub value: SettingValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ValueKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<SettingValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden: Option<Vec<SettingValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators: Option<Vec<ValidatorSchema>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, SettingValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorSchema {
    pub name: String,
    #[serde(default)]
    pub params: Vec<SettingValue>,
}

impl TreeSchema {
    /// Build the tree this schema describes.
    ///
    /// Fails on bad child names and on validators with an unknown name,
    /// the wrong arity, or non-numeric parameters.
    pub fn build(&self) -> Result<Node> {
        build_node(&self.children, &self.params)
    }
}

impl EntrySchema {
    pub fn name(&self) -> &str {
        match self {
            EntrySchema::Leaf(leaf) => &leaf.name,
            EntrySchema::Node(node) => &node.name,
        }
    }
}

impl LeafSchema {
    pub fn build(&self) -> Result<Leaf> {
        let mut leaf = Leaf::new(self.value.clone());
        leaf.set_valid_value_types(self.types.clone());
        leaf.set_allowed_values(self.allowed.clone());
        leaf.set_forbidden_values(self.forbidden.clone());
        if let Some(validators) = &self.validators {
            let specs: Vec<(&str, Vec<SettingValue>)> = validators
                .iter()
                .map(|v| (v.name.as_str(), v.params.clone()))
                .collect();
            leaf.set_validator_specs(specs.as_slice())?;
        }
        for (key, value) in &self.params {
            leaf.set_param(key.clone(), value.clone());
        }
        Ok(leaf)
    }
}

fn build_node(children: &[EntrySchema], params: &BTreeMap<String, SettingValue>) -> Result<Node> {
    let mut node = Node::new();
    for entry in children {
        let child = match entry {
            EntrySchema::Leaf(leaf) => Child::Leaf(leaf.build()?),
            EntrySchema::Node(sub) => Child::Node(build_node(&sub.children, &sub.params)?),
        };
        node.insert(entry.name(), child)?;
    }
    for (key, value) in params {
        node.set_param(key.clone(), value.clone());
    }
    Ok(node)
}
