//! # CLI Layer
//!
//! The CLI layer is the **only** place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Reads and writes files
//! - Handles argument parsing
//! - Decides exit codes
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Load config, build the tree from its schema, and load
//!    persisted values into it
//! 3. **Dispatch**: Route commands to handlers
//! 4. **Output Formatting**: Tables, messages and documents via `print` and
//!    `document`
//! 5. **Persistence**: Write the values document after a committed change

use super::print::{self, LeafRow, MessageLevel};
use super::setup::{Cli, Commands, KindArg};
use crate::config::SettreeConfig;
use crate::document::{self, Format};
use crate::schema::TreeSchema;
use anyhow::{bail, Context as _, Result};
use clap::Parser;
use settree_core::path;
use settree_core::{
    EntryKind, InvalidEntry, Node, Resolved, SettingValue, ValueForm, ValueKind, Values,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "SETTREE_LOG";

/// How the process should end after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exit status 0.
    Valid,
    /// Exit status 2: the tree is (or would have been) invalid.
    Invalid,
}

pub fn run() -> Result<Outcome> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let config = SettreeConfig::load_from(&cwd)?;
    let mut ctx = Context::new(&cli, &config)?;

    match cli.command {
        None => show(&ctx, None),
        Some(Commands::Show { path }) => show(&ctx, path.as_deref()),
        Some(Commands::Get { path }) => get(&ctx, &path),
        Some(Commands::Set { path, value, force }) => set(&mut ctx, &path, &value, force),
        Some(Commands::Apply { file, force }) => apply(&mut ctx, &file, force),
        Some(Commands::Dump { flat }) => dump(&ctx, flat),
        Some(Commands::Check { path }) => check(&ctx, path.as_deref()),
        Some(Commands::Diff { file }) => diff(&ctx, &file),
        Some(Commands::List { kind, path }) => list(&ctx, kind, path.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// The loaded tree plus what the handlers need to render and persist it.
struct Context {
    tree: Node,
    values_path: Option<PathBuf>,
    format: Format,
    form: ValueForm,
}

impl Context {
    fn new(cli: &Cli, config: &SettreeConfig) -> Result<Self> {
        let schema_path = cli
            .schema
            .clone()
            .or_else(|| config.schema.clone())
            .context("no schema given: pass --schema or set `schema` in settree.toml")?;
        let schema: TreeSchema = document::read(&schema_path)?;
        let mut tree = schema
            .build()
            .with_context(|| format!("invalid schema {}", schema_path.display()))?;

        let values_path = cli.values.clone().or_else(|| config.values.clone());
        if let Some(path) = values_path.as_deref().filter(|p| p.exists()) {
            let values = document::read_values(path)?;
            let valid = tree.apply_values(&values, true);
            debug!(path = %path.display(), valid, "loaded values");
        }

        let format = match cli.format {
            Some(format) => format,
            None => config.format()?,
        };

        Ok(Self {
            tree,
            values_path,
            format,
            form: config.form()?,
        })
    }

    fn save(&self) -> Result<()> {
        if let Some(path) = &self.values_path {
            document::write(path, &self.tree.get_values(self.form))?;
            info!(path = %path.display(), "saved values");
            print::print_message(
                MessageLevel::Info,
                &format!("Saved values to {}", path.display()),
            );
        }
        Ok(())
    }
}

fn show(ctx: &Context, path: Option<&str>) -> Result<Outcome> {
    let root = path.unwrap_or(path::ROOT);
    ctx.tree.kind_of(root)?;
    let prefix = path::normalize(root);

    let problems: HashMap<String, String> = ctx
        .tree
        .validate()
        .into_iter()
        .map(|entry| (entry.path, entry.reason.to_string()))
        .collect();

    let rows: Vec<LeafRow> = ctx
        .tree
        .flat_values()
        .into_iter()
        .filter(|(p, _)| path::is_within(p, &prefix))
        .map(|(p, value)| LeafRow {
            problem: problems.get(&p).cloned(),
            value: value.to_string(),
            path: p,
        })
        .collect();

    print::print_leaf_rows(&rows);
    Ok(Outcome::Valid)
}

fn get(ctx: &Context, raw: &str) -> Result<Outcome> {
    match ctx.tree.get(raw)? {
        Resolved::Value(value) | Resolved::Parameter(value) => println!("{}", value),
        Resolved::Children(names) => print::print_paths(&names),
        Resolved::Leaf(leaf) => print::print_leaf(&path::normalize(raw), leaf),
        Resolved::Node(node) => print::print_node(&path::normalize(raw), node),
    }
    Ok(Outcome::Valid)
}

fn set(ctx: &mut Context, raw_path: &str, raw_value: &str, force: bool) -> Result<Outcome> {
    match ctx.tree.kind_of(raw_path)? {
        EntryKind::Leaf => {}
        EntryKind::Node => bail!("{} is a node; only leaves hold values", raw_path),
        EntryKind::Parameter => bail!(
            "{} is a leaf parameter; parameters are defined in the schema",
            raw_path
        ),
    }

    let target = path::normalize(raw_path);
    let hint = ctx.tree.leaf(&target)?.value().kind();
    let value = parse_value(raw_value, Some(hint));
    let valid = ctx.tree.set_setting_by_path(&target, value.clone(), force)?;

    if valid {
        ctx.save()?;
        print::print_message(MessageLevel::Success, &format!("{} = {}", target, value));
        return Ok(Outcome::Valid);
    }

    if force {
        ctx.save()?;
        print::print_message(
            MessageLevel::Warning,
            &format!("{} = {} (forced; the tree is now invalid)", target, value),
        );
        print_invalid(&ctx.tree.validate());
    } else {
        let mut staged = ctx.tree.clone();
        staged.set(&target, value.clone())?;
        print::print_message(
            MessageLevel::Error,
            &format!("Rejected {} = {}: the tree would be invalid", target, value),
        );
        print_invalid(&staged.validate());
    }
    Ok(Outcome::Invalid)
}

fn apply(ctx: &mut Context, file: &Path, force: bool) -> Result<Outcome> {
    let values = document::read_values(file)?;
    for key in values.keys().filter(|p| ctx.tree.leaf(p).is_err()) {
        print::print_message(MessageLevel::Warning, &format!("Ignoring {}: no such setting", key));
    }

    let report = ctx.tree.set_values_with_report(&values, force);
    let applied = values.keys().filter(|p| ctx.tree.leaf(p).is_ok()).count();

    if report.is_empty() {
        ctx.save()?;
        print::print_message(
            MessageLevel::Success,
            &format!("Applied {} value(s) from {}", applied, file.display()),
        );
        return Ok(Outcome::Valid);
    }

    if force {
        ctx.save()?;
        print::print_message(
            MessageLevel::Warning,
            &format!(
                "Applied {} value(s) from {} (forced; the tree is now invalid)",
                applied,
                file.display()
            ),
        );
    } else {
        print::print_message(
            MessageLevel::Error,
            &format!("Rejected {}: the tree would be invalid", file.display()),
        );
    }
    print_invalid(&report);
    Ok(Outcome::Invalid)
}

fn dump(ctx: &Context, flat: bool) -> Result<Outcome> {
    let form = if flat { ValueForm::Flat } else { ctx.form };
    print!(
        "{}",
        document::render(&ctx.tree.get_values(form), ctx.format)?
    );
    Ok(Outcome::Valid)
}

fn check(ctx: &Context, path: Option<&str>) -> Result<Outcome> {
    let report = ctx.tree.validate_at(path.unwrap_or(path::ROOT))?;
    if report.is_empty() {
        print::print_message(MessageLevel::Success, "All settings are valid.");
        return Ok(Outcome::Valid);
    }
    print_invalid(&report);
    Ok(Outcome::Invalid)
}

fn diff(ctx: &Context, file: &Path) -> Result<Outcome> {
    let values = Values::from(document::read_values(file)?).into_nested();
    let other = Node::from(&values);
    print::print_diff(&ctx.tree.diff(&other));
    Ok(Outcome::Valid)
}

fn list(ctx: &Context, kind: KindArg, path: Option<&str>) -> Result<Outcome> {
    let paths = ctx
        .tree
        .list_all_at(path.unwrap_or(path::ROOT), kind.into())?;
    print::print_paths(&paths);
    Ok(Outcome::Valid)
}

fn print_invalid(report: &[InvalidEntry]) {
    for entry in report {
        print::print_message(
            MessageLevel::Error,
            &format!("{}: {}", entry.path, entry.reason),
        );
    }
}

/// Read a command-line value, preferring the kind the leaf already holds.
fn parse_value(raw: &str, hint: Option<ValueKind>) -> SettingValue {
    hint.and_then(|kind| SettingValue::parse_as(kind, raw).ok())
        .unwrap_or_else(|| infer_value(raw))
}

fn infer_value(raw: &str) -> SettingValue {
    match raw {
        "true" => return SettingValue::Bool(true),
        "false" => return SettingValue::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return SettingValue::Int(int);
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => SettingValue::Float(float),
        _ => SettingValue::Text(raw.to_string()),
    }
}
