use crate::document::Format;
use clap::{Parser, Subcommand, ValueEnum};
use settree_core::ListKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "settree",
    bin_name = "settree",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Inspect, validate and update settings trees", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Schema document describing the tree (overrides config)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub schema: Option<PathBuf>,

    /// Values document to load and save (overrides config)
    #[arg(long, global = true, help_heading = "Options")]
    pub values: Option<PathBuf>,

    /// Output format for dumped values (overrides config)
    #[arg(short, long, global = true, value_enum, help_heading = "Options")]
    pub format: Option<Format>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[default]
    All,
    Node,
    Leaf,
}

impl From<KindArg> for ListKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::All => ListKind::All,
            KindArg::Node => ListKind::Node,
            KindArg::Leaf => ListKind::Leaf,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show leaves with their values and validity
    #[command(display_order = 1)]
    Show {
        /// Limit to this path
        path: Option<String>,
    },

    /// Print the value, child names or parameter at a path
    #[command(display_order = 2)]
    Get {
        /// Path (a trailing '/' shows the leaf or node itself)
        path: String,
    },

    /// Set a single leaf value, keeping it only if the tree stays valid
    #[command(display_order = 3)]
    Set {
        path: String,
        value: String,

        /// Keep the value even if the tree becomes invalid
        #[arg(long)]
        force: bool,
    },

    /// Apply a values document as one transaction
    #[command(display_order = 4)]
    Apply {
        /// JSON or YAML document, nested or keyed by path
        file: PathBuf,

        /// Commit even if the tree becomes invalid
        #[arg(long)]
        force: bool,
    },

    /// Print all leaf values
    #[command(display_order = 5)]
    Dump {
        /// Key values by absolute path instead of nesting them
        #[arg(long)]
        flat: bool,
    },

    /// List invalid leaves (exit status 2 if any)
    #[command(display_order = 6)]
    Check {
        /// Only check leaves at or below this path
        path: Option<String>,
    },

    /// Compare current values with a values document
    #[command(display_order = 7)]
    Diff { file: PathBuf },

    /// List paths in the tree
    #[command(alias = "ls", display_order = 8)]
    List {
        /// Only list entries of this kind
        #[arg(short, long, value_enum, default_value_t = KindArg::All)]
        kind: KindArg,

        /// Root of the listing
        path: Option<String>,
    },
}
