use thiserror::Error;

/// Structural errors raised by tree and leaf operations.
///
/// Validity is never reported through this type: a value that fails its
/// constraints is a normal `false` from the validation queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Setting not found: {path}")]
    NotFound { path: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid validator: {0}")]
    InvalidValidator(String),
}

impl SettingsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        SettingsError::NotFound { path: path.into() }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SettingsError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for the lookup-failure family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SettingsError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
