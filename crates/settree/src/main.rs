//! # Settree CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/settree-core/`: the UI-agnostic settings tree library
//! - `crates/settree/`: this CLI tool, one client of that library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/settree/src/)                            │
//! │  - clap argument parsing (cli/setup.rs)                     │
//! │  - Context setup + dispatch (cli/commands.rs)               │
//! │  - Terminal rendering (cli/print.rs)                        │
//! │  - Config (config.rs), schema (schema.rs), files            │
//! │    (document.rs)                                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Library (crates/settree-core)                              │
//! │  - Paths, leaves, nodes, validation, transactions           │
//! │  - No knowledge of stdout/stderr, files or process exits    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Testing Approach
//!
//! - **Library**: unit tests next to each module plus whole-tree property
//!   tests in `crates/settree-core/tests/`.
//! - **CLI modules**: unit tests for argument parsing, schema building,
//!   config defaults and output formatting.
//! - **End to end**: `tests/cli_e2e.rs` runs the binary against temporary
//!   schema and values files.

mod cli;
mod config;
mod document;
mod schema;

use cli::Outcome;

fn main() {
    match cli::run() {
        Ok(Outcome::Valid) => {}
        Ok(Outcome::Invalid) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
