//! Auxiliary metadata attached to leaves and nodes.
//!
//! Extra parameters carry things like a display name, a tooltip or an ordering
//! key for whatever UI sits on top of the tree. The tree stores and returns
//! them but never validates them.

use crate::value::SettingValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraParameters {
    entries: BTreeMap<String, SettingValue>,
}

impl ExtraParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    /// Insert or overwrite a parameter, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Option<SettingValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for ExtraParameters
where
    K: Into<String>,
    V: Into<SettingValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
