//! Setting value types.
//!
//! A leaf holds exactly one [`SettingValue`]. The set of kinds is closed; type
//! constraints on a leaf are expressed over the [`ValueKind`] tag rather than
//! over Rust types.
//!
//! ## Comparison Rules
//!
//! | Left | Right | Equality / ordering |
//! |------|-------|---------------------|
//! | `Int` / `Float` | `Int` / `Float` | numeric (`1 == 1.0`) |
//! | `Bool` | `Bool` | `false < true` |
//! | `Text` | `Text` | lexicographic |
//! | `Bytes` | `Bytes` | lexicographic |
//! | anything else | | never equal, unordered |

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The run-time kind of a [`SettingValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
}

impl ValueKind {
    pub const ALL: [ValueKind; 5] = [
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Text,
        ValueKind::Bytes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Bytes => "bytes",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(ValueKind::Bool),
            "int" | "integer" => Ok(ValueKind::Int),
            "float" => Ok(ValueKind::Float),
            "text" | "str" | "string" => Ok(ValueKind::Text),
            "bytes" => Ok(ValueKind::Bytes),
            other => {
                let known: Vec<&str> = ValueKind::ALL.iter().map(ValueKind::name).collect();
                Err(SettingsError::TypeMismatch(format!(
                    "unknown value kind '{}' (expected one of: {})",
                    other,
                    known.join(", ")
                )))
            }
        }
    }
}

/// Runtime representation of a setting value.
///
/// Serializes untagged, so a JSON `10` reads back as `Int`, `10.5` as
/// `Float`, and an array of small integers as `Bytes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SettingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Bool(_) => ValueKind::Bool,
            SettingValue::Int(_) => ValueKind::Int,
            SettingValue::Float(_) => ValueKind::Float,
            SettingValue::Text(_) => ValueKind::Text,
            SettingValue::Bytes(_) => ValueKind::Bytes,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    /// Numeric view of the value, for `Int` and `Float` only.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(v) => Some(*v as f64),
            SettingValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Parse `raw` as a value of the given kind.
    ///
    /// Bytes are read as a hex string, with or without a `0x` prefix.
    pub fn parse_as(kind: ValueKind, raw: &str) -> Result<Self, SettingsError> {
        let mismatch = || {
            SettingsError::TypeMismatch(format!("cannot read '{}' as {}", raw, kind.name()))
        };
        match kind {
            ValueKind::Bool => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(SettingValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(SettingValue::Bool(false)),
                _ => Err(mismatch()),
            },
            ValueKind::Int => raw
                .trim()
                .parse()
                .map(SettingValue::Int)
                .map_err(|_| mismatch()),
            ValueKind::Float => raw
                .trim()
                .parse()
                .map(SettingValue::Float)
                .map_err(|_| mismatch()),
            ValueKind::Text => Ok(SettingValue::Text(raw.to_string())),
            ValueKind::Bytes => {
                let hex = raw.trim();
                let hex = hex.strip_prefix("0x").unwrap_or(hex);
                if hex.len() % 2 != 0 || !hex.is_ascii() {
                    return Err(mismatch());
                }
                (0..hex.len())
                    .step_by(2)
                    .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| mismatch()))
                    .collect::<Result<Vec<u8>, _>>()
                    .map(SettingValue::Bytes)
            }
        }
    }
}

impl PartialEq for SettingValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SettingValue::Bool(a), SettingValue::Bool(b)) => a == b,
            (SettingValue::Int(a), SettingValue::Int(b)) => a == b,
            (SettingValue::Text(a), SettingValue::Text(b)) => a == b,
            (SettingValue::Bytes(a), SettingValue::Bytes(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
            _ => false,
        }
    }
}

impl PartialOrd for SettingValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (SettingValue::Bool(a), SettingValue::Bool(b)) => a.partial_cmp(b),
            (SettingValue::Int(a), SettingValue::Int(b)) => a.partial_cmp(b),
            (SettingValue::Text(a), SettingValue::Text(b)) => a.partial_cmp(b),
            (SettingValue::Bytes(a), SettingValue::Bytes(b)) => a.partial_cmp(b),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{}", v),
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{:?}", v),
            SettingValue::Text(v) => f.write_str(v),
            SettingValue::Bytes(v) => {
                f.write_str("0x")?;
                for byte in v {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        SettingValue::Int(v.into())
    }
}

impl From<u32> for SettingValue {
    fn from(v: u32) -> Self {
        SettingValue::Int(v.into())
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Float(v)
    }
}

impl From<f32> for SettingValue {
    fn from(v: f32) -> Self {
        SettingValue::Float(v.into())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Text(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SettingValue {
    fn from(v: Vec<u8>) -> Self {
        SettingValue::Bytes(v)
    }
}

impl From<&[u8]> for SettingValue {
    fn from(v: &[u8]) -> Self {
        SettingValue::Bytes(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(SettingValue::from(true).kind(), ValueKind::Bool);
        assert_eq!(SettingValue::from(3).kind(), ValueKind::Int);
        assert_eq!(SettingValue::from(3.5).kind(), ValueKind::Float);
        assert_eq!(SettingValue::from("x").kind(), ValueKind::Text);
        assert_eq!(SettingValue::from(vec![1u8, 2]).kind(), ValueKind::Bytes);
    }

    #[test]
    fn test_int_and_float_compare_numerically() {
        assert_eq!(SettingValue::Int(2), SettingValue::Float(2.0));
        assert!(SettingValue::Int(2) < SettingValue::Float(2.5));
        assert!(SettingValue::Float(-1.0) < SettingValue::Int(0));
    }

    #[test]
    fn test_different_kinds_are_not_equal_or_ordered() {
        assert_ne!(SettingValue::from("1"), SettingValue::Int(1));
        assert_ne!(SettingValue::Bool(true), SettingValue::Int(1));
        assert_eq!(
            SettingValue::from("a").partial_cmp(&SettingValue::Int(1)),
            None
        );
    }

    #[test]
    fn test_text_orders_lexicographically() {
        assert!(SettingValue::from("abc") < SettingValue::from("abd"));
    }

    #[test]
    fn test_value_kind_parses_aliases() {
        assert_eq!("integer".parse::<ValueKind>().unwrap(), ValueKind::Int);
        assert_eq!("String".parse::<ValueKind>().unwrap(), ValueKind::Text);
        let err = "list".parse::<ValueKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch: unknown value kind 'list' (expected one of: bool, int, float, text, bytes)"
        );
    }

    #[test]
    fn test_parse_as_reads_each_kind() {
        assert_eq!(
            SettingValue::parse_as(ValueKind::Bool, "yes").unwrap(),
            SettingValue::Bool(true)
        );
        assert_eq!(
            SettingValue::parse_as(ValueKind::Int, " 42 ").unwrap(),
            SettingValue::Int(42)
        );
        assert_eq!(
            SettingValue::parse_as(ValueKind::Float, "0.25").unwrap(),
            SettingValue::Float(0.25)
        );
        assert_eq!(
            SettingValue::parse_as(ValueKind::Bytes, "0x0aff").unwrap(),
            SettingValue::Bytes(vec![0x0a, 0xff])
        );
        assert!(SettingValue::parse_as(ValueKind::Int, "4.5").is_err());
        assert!(SettingValue::parse_as(ValueKind::Bytes, "abc").is_err());
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(SettingValue::Float(10.0).to_string(), "10.0");
        assert_eq!(SettingValue::Bytes(vec![1, 171]).to_string(), "0x01ab");
        assert_eq!(SettingValue::from("hi").to_string(), "hi");
    }

    #[test]
    fn test_json_round_trip_keeps_kinds() {
        let values = vec![
            SettingValue::Bool(false),
            SettingValue::Int(7),
            SettingValue::Float(7.5),
            SettingValue::from("seven"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[false,7,7.5,"seven"]"#);
        let back: Vec<SettingValue> = serde_json::from_str(&json).unwrap();
        let kinds: Vec<_> = back.iter().map(SettingValue::kind).collect();
        assert_eq!(
            kinds,
            vec![ValueKind::Bool, ValueKind::Int, ValueKind::Float, ValueKind::Text]
        );
    }
}
