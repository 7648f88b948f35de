//! # CLI Behavior
//!
//! This is **one possible UI client** for settree, not the library itself.
//! The CLI is the only place that knows about terminal I/O, files and exit
//! codes.
//!
//! ## Loading
//!
//! Every invocation builds the tree from the schema document, then applies
//! the values document (if one is configured and exists) on top of it. The
//! values are loaded even if they leave the tree invalid, so `check` and
//! `show` can report what is wrong with them.
//!
//! ## Changing Values
//!
//! `set` and `apply` are transactional: the change is checked against the
//! whole tree and rejected unless the tree stays valid. `--force` commits
//! anyway. Only committed changes are written back to the values document.
//!
//! ## Exit Codes
//!
//! - `0`: success
//! - `1`: error (bad path, unreadable file, invalid schema, ...)
//! - `2`: the tree is invalid (`check`), or a change was rejected or forced
//!   into an invalid tree (`set`, `apply`)
//!
//! ## Module Structure
//!
//! - `commands`: Context setup and per-command handlers
//! - `print`: Output formatting (tables, colors, messages)
//! - `setup`: Argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::{run, Outcome};
