//! # Settree Architecture
//!
//! Settree is a **UI-agnostic settings library**. It stores an application's
//! settings as a tree addressed by POSIX-style paths, checks them against
//! per-setting constraints, and applies bulk updates as all-or-nothing
//! transactions. The `settree` binary is one client of it; a GUI or a config
//! loader would be another.
//!
//! ## The Tree
//!
//! ```text
//! Node (root)
//!  ├── "network"  Node
//!  │    ├── "port"   Leaf { value: 8080, validators: [Between(1, 65535)] }
//!  │    └── "host"   Leaf { value: "localhost", types: [text] }
//!  └── "debug"    Leaf { value: false, params: { display_name: "Debug" } }
//! ```
//!
//! - A [`Node`] owns an ordered set of named children.
//! - A [`Leaf`] holds one [`SettingValue`] plus its constraints.
//! - Both carry [`ExtraParameters`]: opaque metadata for whatever UI sits on
//!   top.
//!
//! ## Layers
//!
//! 1. **Values** ([`value`], [`validator`]): the scalar value model and the
//!    fixed vocabulary of numeric validators.
//! 2. **Leaves** ([`leaf`]): constraint checking for a single value.
//! 3. **Structure** ([`node`], [`path`]): path parsing, resolution,
//!    insertion, deletion, enumeration, and diffing.
//! 4. **Whole-tree operations** ([`values`], [`validation`]): value
//!    extraction, transactional application, and validation against a flat
//!    snapshot of the tree.
//!
//! ## Key Principle: No I/O
//!
//! Nothing in this crate reads files, writes to stdout/stderr or exits the
//! process. Diagnostics go through `tracing`; the subscriber is the caller's
//! business.
//!
//! The one exception is a panicking validator function. The panic is caught
//! and the leaf reported invalid, but the process-wide panic hook runs first
//! and by default prints the message to stderr. Embedders that want silence
//! install their own hook with `std::panic::set_hook`.
//!
//! ## Module Overview
//!
//! - [`error`]: Error types
//! - [`value`]: `SettingValue` and `ValueKind`
//! - [`path`]: Path parsing and normalization
//! - [`validator`]: Simple parametric validators and their registry
//! - [`params`]: Extra parameters on leaves and nodes
//! - [`leaf`]: Leaves, validator functions, and validity checks
//! - [`node`]: Nodes and path-addressed access
//! - [`values`]: Flat and nested value maps, transactional updates
//! - [`validation`]: Whole-tree validation

pub mod error;
pub mod leaf;
pub mod node;
pub mod params;
pub mod path;
pub mod validation;
pub mod validator;
pub mod value;
pub mod values;

pub use error::{Result, SettingsError};
pub use leaf::{Invalidity, Leaf, ValidatorError, ValidatorFn};
pub use node::{Assign, Child, EntryKind, ListKind, Node, Removed, Resolved, TreeDiff};
pub use params::ExtraParameters;
pub use validation::InvalidEntry;
pub use validator::{Validator, ValidatorKind, VALIDATORS};
pub use value::{SettingValue, ValueKind};
pub use values::{FlatValues, NestedValues, ValueEntry, ValueForm, ValueSource, Values};
