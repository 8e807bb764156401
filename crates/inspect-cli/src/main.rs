//! # inspect-cli
//!
//! Command-line inspector that prints JSON data as a tree annotated with
//! display metadata from schema documents.

mod config;
mod render;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use config::InspectConfig;
use inspect_ir::{Cursor, Value};
use inspect_schema::{create_context, Schema, SchemaContext, SchemaLoader, SchemaSet};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inspect")]
#[command(about = "Schema-aware value inspector")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a JSON file as an annotated tree
    Tree {
        /// Input JSON file
        data: PathBuf,

        /// Schema document (YAML or JSON)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Definition to use as the root schema
        #[arg(short, long, requires = "schema")]
        root: Option<String>,

        /// Additional schema documents to register for name lookups
        #[arg(short, long)]
        extra: Vec<PathBuf>,

        /// Start rendering at this node (e.g. `$.items.0`)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Show the schema resolved for a path
    Resolve {
        /// Path to resolve (e.g. `$.items.0.name`)
        path: String,

        /// Schema document (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Definition to use as the root schema
        #[arg(short, long)]
        root: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => InspectConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => InspectConfig::default(),
    };

    let loader = SchemaLoader::default();
    match cli.command {
        Commands::Tree {
            data,
            schema,
            root,
            extra,
            path,
        } => {
            tracing::info!("Inspecting {}", data.display());
            let value = read_data(&data)?;

            // Sets own the definitions that references resolve through
            let primary = match &schema {
                Some(file) => Some(load_set(&loader, file, root.as_deref())?),
                None => None,
            };
            let extras = extra
                .iter()
                .map(|file| load_set(&loader, file, None))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let ctx = build_context(primary.as_ref(), &extras);

            let cursor = match &path {
                Some(path) => Cursor::new(&value)
                    .navigate(path)
                    .with_context(|| format!("locating {path}"))?,
                None => Cursor::new(&value),
            };
            for line in render::render_tree(cursor.value(), cursor.path(), &ctx, &config) {
                println!("{line}");
            }
        }
        Commands::Resolve { path, schema, root } => {
            let set = load_set(&loader, &schema, root.as_deref())?;
            if set.root().is_none() {
                bail!("{} has no root definition; pass --root", schema.display());
            }

            let ctx = set.context();
            let node = ctx.get_context_for_path(&path);
            match node.schema() {
                Some(resolved) => {
                    let annotations = node.get_annotations();
                    let formatter = if annotations.pretty.is_some() { "yes" } else { "no" };
                    println!("path: {path}");
                    println!("tag: {}", resolved.tag());
                    println!("display name: {}", annotations.display_name().unwrap_or("-"));
                    println!("description: {}", annotations.description.as_deref().unwrap_or("-"));
                    println!("formatter: {formatter}");
                }
                None => println!("no schema for {path}"),
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_data(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Value::from(json))
}

fn load_set(loader: &SchemaLoader, file: &Path, root: Option<&str>) -> anyhow::Result<SchemaSet> {
    let set = loader
        .load_from_file(file)
        .with_context(|| format!("loading schema {}", file.display()))?;
    match root {
        Some(name) => Ok(set.with_root(name)?),
        None => Ok(set),
    }
}

fn build_context(primary: Option<&SchemaSet>, extras: &[SchemaSet]) -> SchemaContext {
    let root = primary.and_then(SchemaSet::root);
    let auxiliary: Vec<Schema> = primary
        .into_iter()
        .chain(extras)
        .flat_map(SchemaSet::schemas)
        .filter(|schema| root.as_ref() != Some(schema))
        .collect();
    create_context(root.as_ref(), &auxiliary)
}
