//! Simple parametric validators.
//!
//! A fixed vocabulary of numeric predicates that can be attached to a leaf.
//! Parameters must be numeric (`Int` or `Float`); the leaf value is compared
//! with the rules in [`crate::value`], so a non-numeric value simply fails any
//! ordering check.
//!
//! | Name | Params | Valid iff |
//! |------|--------|-----------|
//! | `GreaterThan` | X | V > X |
//! | `GreaterThanOrEqualTo` | X | V ≥ X |
//! | `LessThan` | X | V < X |
//! | `LessThanOrEqualTo` | X | V ≤ X |
//! | `NotEqual` | X | V ≠ X |
//! | `Between` | X, Y | min(X,Y) ≤ V ≤ max(X,Y) |
//! | `NotBetween` | X, Y | V ≤ min(X,Y) or V ≥ max(X,Y) |

use crate::error::{Result, SettingsError};
use crate::value::SettingValue;
use serde::Serialize;
use std::fmt;

/// The predicate a validator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidatorKind {
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    NotEqual,
    Between,
    NotBetween,
}

/// Registry entry describing a validator's name and parameter count.
#[derive(Debug, Clone)]
pub struct ValidatorSpec {
    pub name: &'static str,
    pub kind: ValidatorKind,
    pub arity: usize,
}

impl ValidatorSpec {
    const fn new(name: &'static str, kind: ValidatorKind, arity: usize) -> Self {
        Self { name, kind, arity }
    }
}

/// Every validator the engine knows about.
pub const VALIDATORS: &[ValidatorSpec] = &[
    ValidatorSpec::new("GreaterThan", ValidatorKind::GreaterThan, 1),
    ValidatorSpec::new("GreaterThanOrEqualTo", ValidatorKind::GreaterThanOrEqualTo, 1),
    ValidatorSpec::new("LessThan", ValidatorKind::LessThan, 1),
    ValidatorSpec::new("LessThanOrEqualTo", ValidatorKind::LessThanOrEqualTo, 1),
    ValidatorSpec::new("NotEqual", ValidatorKind::NotEqual, 1),
    ValidatorSpec::new("Between", ValidatorKind::Between, 2),
    ValidatorSpec::new("NotBetween", ValidatorKind::NotBetween, 2),
];

/// Look up a validator spec by name.
pub fn get_spec(name: &str) -> Option<&'static ValidatorSpec> {
    VALIDATORS.iter().find(|spec| spec.name == name)
}

/// A validator with its parameters bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    GreaterThan(SettingValue),
    GreaterThanOrEqualTo(SettingValue),
    LessThan(SettingValue),
    LessThanOrEqualTo(SettingValue),
    NotEqual(SettingValue),
    Between(SettingValue, SettingValue),
    NotBetween(SettingValue, SettingValue),
}

impl Validator {
    /// Build a validator from its registry name and a parameter list.
    ///
    /// Fails with [`SettingsError::InvalidValidator`] for an unknown name, the
    /// wrong number of parameters, or a non-numeric parameter.
    pub fn from_parts(name: &str, params: &[SettingValue]) -> Result<Self> {
        let spec = get_spec(name)
            .ok_or_else(|| SettingsError::InvalidValidator(format!("unknown validator '{}'", name)))?;
        if params.len() != spec.arity {
            return Err(SettingsError::InvalidValidator(format!(
                "{} takes {} parameter(s), got {}",
                spec.name,
                spec.arity,
                params.len()
            )));
        }
        let p = |i: usize| params[i].clone();
        let validator = match spec.kind {
            ValidatorKind::GreaterThan => Validator::GreaterThan(p(0)),
            ValidatorKind::GreaterThanOrEqualTo => Validator::GreaterThanOrEqualTo(p(0)),
            ValidatorKind::LessThan => Validator::LessThan(p(0)),
            ValidatorKind::LessThanOrEqualTo => Validator::LessThanOrEqualTo(p(0)),
            ValidatorKind::NotEqual => Validator::NotEqual(p(0)),
            ValidatorKind::Between => Validator::Between(p(0), p(1)),
            ValidatorKind::NotBetween => Validator::NotBetween(p(0), p(1)),
        };
        validator.check_params()?;
        Ok(validator)
    }

    pub fn kind(&self) -> ValidatorKind {
        match self {
            Validator::GreaterThan(_) => ValidatorKind::GreaterThan,
            Validator::GreaterThanOrEqualTo(_) => ValidatorKind::GreaterThanOrEqualTo,
            Validator::LessThan(_) => ValidatorKind::LessThan,
            Validator::LessThanOrEqualTo(_) => ValidatorKind::LessThanOrEqualTo,
            Validator::NotEqual(_) => ValidatorKind::NotEqual,
            Validator::Between(..) => ValidatorKind::Between,
            Validator::NotBetween(..) => ValidatorKind::NotBetween,
        }
    }

    pub fn name(&self) -> &'static str {
        VALIDATORS
            .iter()
            .find(|spec| spec.kind == self.kind())
            .map(|spec| spec.name)
            .unwrap_or("Unknown")
    }

    pub fn params(&self) -> Vec<&SettingValue> {
        match self {
            Validator::GreaterThan(x)
            | Validator::GreaterThanOrEqualTo(x)
            | Validator::LessThan(x)
            | Validator::LessThanOrEqualTo(x)
            | Validator::NotEqual(x) => vec![x],
            Validator::Between(x, y) | Validator::NotBetween(x, y) => vec![x, y],
        }
    }

    /// Ensure every parameter is numeric.
    pub fn check_params(&self) -> Result<()> {
        match self.params().into_iter().find(|p| !p.is_numeric()) {
            Some(bad) => Err(SettingsError::InvalidValidator(format!(
                "{} parameters must be numeric, got {} '{}'",
                self.name(),
                bad.kind(),
                bad
            ))),
            None => Ok(()),
        }
    }

    /// Apply the predicate to a value.
    pub fn check(&self, value: &SettingValue) -> bool {
        match self {
            Validator::GreaterThan(x) => value > x,
            Validator::GreaterThanOrEqualTo(x) => value >= x,
            Validator::LessThan(x) => value < x,
            Validator::LessThanOrEqualTo(x) => value <= x,
            Validator::NotEqual(x) => value != x,
            Validator::Between(x, y) => {
                let (lo, hi) = bounds(x, y);
                value >= lo && value <= hi
            }
            Validator::NotBetween(x, y) => {
                let (lo, hi) = bounds(x, y);
                value <= lo || value >= hi
            }
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params().iter().map(|p| p.to_string()).collect();
        write!(f, "{}({})", self.name(), params.join(", "))
    }
}

/// Order a pair of range parameters as (min, max).
fn bounds<'a>(x: &'a SettingValue, y: &'a SettingValue) -> (&'a SettingValue, &'a SettingValue) {
    if y < x {
        (y, x)
    } else {
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: impl Into<SettingValue>) -> SettingValue {
        x.into()
    }

    #[test]
    fn test_registry_has_every_kind() {
        assert_eq!(VALIDATORS.len(), 7);
        assert_eq!(get_spec("Between").unwrap().arity, 2);
        assert_eq!(get_spec("NotEqual").unwrap().arity, 1);
        assert!(get_spec("between").is_none());
    }

    #[test]
    fn test_from_parts_rejects_unknown_name() {
        let err = Validator::from_parts("Bigger", &[v(1)]).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValidator(_)));
    }

    #[test]
    fn test_from_parts_rejects_wrong_arity() {
        assert!(Validator::from_parts("Between", &[v(1)]).is_err());
        assert!(Validator::from_parts("LessThan", &[v(1), v(2)]).is_err());
        assert!(Validator::from_parts("LessThan", &[]).is_err());
    }

    #[test]
    fn test_from_parts_rejects_non_numeric_params() {
        assert!(Validator::from_parts("LessThan", &[v("ten")]).is_err());
        assert!(Validator::from_parts("Between", &[v(1), v(true)]).is_err());
    }

    #[test]
    fn test_from_parts_builds_matching_variant() {
        let validator = Validator::from_parts("NotBetween", &[v(1), v(2.5)]).unwrap();
        assert_eq!(validator, Validator::NotBetween(v(1), v(2.5)));
        assert_eq!(validator.name(), "NotBetween");
        assert_eq!(validator.to_string(), "NotBetween(1, 2.5)");
    }

    #[test]
    fn test_ordering_validators() {
        assert!(Validator::GreaterThan(v(1)).check(&v(2)));
        assert!(!Validator::GreaterThan(v(1)).check(&v(1)));
        assert!(Validator::GreaterThanOrEqualTo(v(1)).check(&v(1.0)));
        assert!(Validator::LessThan(v(10)).check(&v(9.99)));
        assert!(!Validator::LessThan(v(10)).check(&v(10)));
        assert!(Validator::LessThanOrEqualTo(v(10)).check(&v(10)));
        assert!(Validator::NotEqual(v(3)).check(&v(4)));
        assert!(!Validator::NotEqual(v(3)).check(&v(3.0)));
    }

    #[test]
    fn test_between_includes_bounds_in_either_order() {
        for validator in [Validator::Between(v(0), v(10)), Validator::Between(v(10), v(0))] {
            assert!(validator.check(&v(0)));
            assert!(validator.check(&v(10)));
            assert!(validator.check(&v(5)));
            assert!(!validator.check(&v(-1)));
            assert!(!validator.check(&v(10.5)));
        }
    }

    #[test]
    fn test_not_between_includes_bounds() {
        let validator = Validator::NotBetween(v(10), v(0));
        assert!(validator.check(&v(0)));
        assert!(validator.check(&v(10)));
        assert!(validator.check(&v(-3)));
        assert!(!validator.check(&v(5)));
    }

    #[test]
    fn test_non_numeric_values_fail_ordering_checks() {
        assert!(!Validator::GreaterThan(v(0)).check(&v("5")));
        assert!(!Validator::Between(v(0), v(9)).check(&v(true)));
        assert!(Validator::NotEqual(v(0)).check(&v("0")));
    }
}
