//! # Leaves
//!
//! A [`Leaf`] is a single setting: one [`SettingValue`] plus the constraints
//! that decide whether that value is acceptable. Leaves never hold children.
//!
//! ## Validity
//!
//! [`Leaf::check`] runs the constraints in a fixed order and stops at the
//! first failure:
//!
//! 1. **Kinds**: the value's [`ValueKind`] must be in `valid_value_types`
//! 2. **Allowed**: the value must equal an entry of `allowed_values`
//! 3. **Forbidden**: the value must not equal any entry of `forbidden_values`
//! 4. **Validators**: every simple [`Validator`], in order
//! 5. **Function**: the [`ValidatorFn`], which sees the whole tree's values
//!
//! Unset constraints are skipped. Contradictory constraints are accepted and
//! just produce a leaf that is never valid.
//!
//! The validator function may fail, either by returning an error or by
//! panicking. Both are treated as "invalid" and never reach the caller. A
//! panic still goes through the process panic hook first, so its message is
//! printed unless the embedder installs a quieter hook.

use crate::error::{Result, SettingsError};
use crate::params::ExtraParameters;
use crate::validator::Validator;
use crate::value::{SettingValue, ValueKind};
use crate::values::FlatValues;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Error type a validator function may return.
pub type ValidatorError = Box<dyn std::error::Error + Send + Sync>;

type ValidatorCallback =
    dyn Fn(&SettingValue, &FlatValues) -> std::result::Result<bool, ValidatorError> + Send + Sync;

/// A user-supplied predicate over a leaf's value and the values of every
/// leaf in the tree, keyed by absolute path.
#[derive(Clone)]
pub struct ValidatorFn(Arc<ValidatorCallback>);

impl ValidatorFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SettingValue, &FlatValues) -> std::result::Result<bool, ValidatorError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a predicate that cannot fail.
    pub fn from_predicate<F>(f: F) -> Self
    where
        F: Fn(&SettingValue, &FlatValues) -> bool + Send + Sync + 'static,
    {
        Self::new(move |value, all| Ok(f(value, all)))
    }

    /// Run the function, folding panics into an error.
    ///
    /// The process panic hook still runs before the panic is caught.
    pub fn call(
        &self,
        value: &SettingValue,
        all: &FlatValues,
    ) -> std::result::Result<bool, ValidatorError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.0)(value, all))) {
            Ok(result) => result,
            Err(payload) => Err(panic_message(payload.as_ref()).into()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match detail {
        Some(detail) => format!("validator function panicked: {}", detail),
        None => "validator function panicked".to_string(),
    }
}

impl fmt::Debug for ValidatorFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidatorFn(..)")
    }
}

/// Why a leaf's value was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Invalidity {
    /// The value's kind is not one of the accepted kinds.
    WrongKind(ValueKind),
    /// The value is not in the allowed list.
    NotAllowed,
    /// The value is in the forbidden list.
    Forbidden,
    /// A simple validator rejected the value.
    Validator(Validator),
    /// The validator function returned `false`.
    Rejected,
    /// The validator function failed.
    FunctionFailed(String),
}

impl fmt::Display for Invalidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invalidity::WrongKind(kind) => write!(f, "{} values are not accepted", kind),
            Invalidity::NotAllowed => write!(f, "value is not one of the allowed values"),
            Invalidity::Forbidden => write!(f, "value is forbidden"),
            Invalidity::Validator(validator) => write!(f, "failed {}", validator),
            Invalidity::Rejected => write!(f, "rejected by validator function"),
            Invalidity::FunctionFailed(msg) => write!(f, "validator function failed: {}", msg),
        }
    }
}

/// A single setting.
#[derive(Debug, Clone)]
pub struct Leaf {
    value: SettingValue,
    valid_value_types: Option<Vec<ValueKind>>,
    allowed_values: Option<Vec<SettingValue>>,
    forbidden_values: Option<Vec<SettingValue>>,
    validators: Option<Vec<Validator>>,
    validator_function: Option<ValidatorFn>,
    params: ExtraParameters,
}

impl Leaf {
    /// Create an unconstrained leaf.
    pub fn new(value: impl Into<SettingValue>) -> Self {
        Self {
            value: value.into(),
            valid_value_types: None,
            allowed_values: None,
            forbidden_values: None,
            validators: None,
            validator_function: None,
            params: ExtraParameters::new(),
        }
    }

    pub fn with_types(mut self, kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        self.set_valid_value_types(Some(kinds.into_iter().collect()));
        self
    }

    pub fn with_allowed<V: Into<SettingValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.set_allowed_values(Some(values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_forbidden<V: Into<SettingValue>>(
        mut self,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.set_forbidden_values(Some(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Attach simple validators, checking their parameters.
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Result<Self> {
        self.set_validators(Some(validators.into_iter().collect()))?;
        Ok(self)
    }

    pub fn with_validator_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&SettingValue, &FlatValues) -> bool + Send + Sync + 'static,
    {
        self.validator_function = Some(ValidatorFn::from_predicate(f));
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn value(&self) -> &SettingValue {
        &self.value
    }

    /// Overwrite the value without consulting any constraint.
    pub fn set_value(&mut self, value: impl Into<SettingValue>) {
        self.value = value.into();
    }

    /// Overwrite the value, returning the previous one.
    pub fn replace_value(&mut self, value: SettingValue) -> SettingValue {
        std::mem::replace(&mut self.value, value)
    }

    pub fn valid_value_types(&self) -> Option<&[ValueKind]> {
        self.valid_value_types.as_deref()
    }

    pub fn set_valid_value_types(&mut self, kinds: Option<Vec<ValueKind>>) {
        self.valid_value_types = kinds;
    }

    /// Set accepted kinds from their names (`"int"`, `"float"`, ...).
    pub fn set_valid_value_type_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let kinds = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<ValueKind>>>()?;
        self.valid_value_types = Some(kinds);
        Ok(())
    }

    pub fn allowed_values(&self) -> Option<&[SettingValue]> {
        self.allowed_values.as_deref()
    }

    pub fn set_allowed_values(&mut self, values: Option<Vec<SettingValue>>) {
        self.allowed_values = values;
    }

    pub fn forbidden_values(&self) -> Option<&[SettingValue]> {
        self.forbidden_values.as_deref()
    }

    pub fn set_forbidden_values(&mut self, values: Option<Vec<SettingValue>>) {
        self.forbidden_values = values;
    }

    pub fn validators(&self) -> Option<&[Validator]> {
        self.validators.as_deref()
    }

    /// Replace the simple validators. Every parameter must be numeric.
    pub fn set_validators(&mut self, validators: Option<Vec<Validator>>) -> Result<()> {
        if let Some(list) = &validators {
            for validator in list {
                validator.check_params()?;
            }
        }
        self.validators = validators;
        Ok(())
    }

    /// Replace the simple validators from `(name, params)` pairs.
    ///
    /// Nothing changes if any entry is rejected.
    pub fn set_validator_specs<S: AsRef<str>>(&mut self, specs: &[(S, Vec<SettingValue>)]) -> Result<()> {
        let validators = specs
            .iter()
            .map(|(name, params)| Validator::from_parts(name.as_ref(), params))
            .collect::<Result<Vec<_>>>()?;
        self.validators = Some(validators);
        Ok(())
    }

    pub fn validator_function(&self) -> Option<&ValidatorFn> {
        self.validator_function.as_ref()
    }

    pub fn set_validator_function(&mut self, f: Option<ValidatorFn>) {
        self.validator_function = f;
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

    /// Remove a parameter; a missing key is a lookup failure.
    pub fn remove_param(&mut self, key: &str) -> Result<SettingValue> {
        self.params
            .remove(key)
            .ok_or_else(|| SettingsError::not_found(key))
    }

    /// Whether any constraint is set at all.
    pub fn is_constrained(&self) -> bool {
        self.valid_value_types.is_some()
            || self.allowed_values.is_some()
            || self.forbidden_values.is_some()
            || self.validators.is_some()
            || self.validator_function.is_some()
    }

    /// Run every constraint against the current value.
    ///
    /// `all` holds the values of every leaf in the tree being validated, keyed
    /// by absolute path; only the validator function looks at it.
    pub fn check(&self, all: &FlatValues) -> std::result::Result<(), Invalidity> {
        let value = &self.value;

        if let Some(kinds) = &self.valid_value_types {
            if !kinds.contains(&value.kind()) {
                return Err(Invalidity::WrongKind(value.kind()));
            }
        }

        if let Some(allowed) = &self.allowed_values {
            if !allowed.contains(value) {
                return Err(Invalidity::NotAllowed);
            }
        }

        if let Some(forbidden) = &self.forbidden_values {
            if forbidden.contains(value) {
                return Err(Invalidity::Forbidden);
            }
        }

        if let Some(validators) = &self.validators {
            if let Some(failed) = validators.iter().find(|v| !v.check(value)) {
                return Err(Invalidity::Validator(failed.clone()));
            }
        }

        if let Some(function) = &self.validator_function {
            return match function.call(value, all) {
                Ok(true) => Ok(()),
                Ok(false) => Err(Invalidity::Rejected),
                Err(e) => Err(Invalidity::FunctionFailed(e.to_string())),
            };
        }

        Ok(())
    }

    pub fn is_valid(&self, all: &FlatValues) -> bool {
        self.check(all).is_ok()
    }
}
