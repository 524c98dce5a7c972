use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vellum",
    about = "Vellum: compare versions of CMS documents field by field",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate an application config
    Check(CheckArgs),
    /// List the data leaves of a collection or global schema
    Walk(WalkArgs),
    /// Diff two snapshot files of the same collection or global
    Diff(DiffArgs),
    /// Start the comparison server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    #[arg(short, long, default_value = "vellum.toml")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct WalkArgs {
    /// Collection (or, with --global, global) slug
    pub slug: String,
    #[arg(short, long, default_value = "vellum.toml")]
    pub config: PathBuf,
    #[arg(long)]
    pub global: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Collection (or, with --global, global) slug
    pub slug: String,
    /// Snapshot of the version under inspection
    pub base: PathBuf,
    /// Snapshot to compare against
    pub comparison: PathBuf,
    #[arg(short, long, default_value = "vellum.toml")]
    pub config: PathBuf,
    #[arg(long)]
    pub global: bool,
    /// Comma-separated locales to compare (default: all configured)
    #[arg(long, value_delimiter = ',')]
    pub locales: Vec<String>,
    #[arg(long)]
    pub hide_unchanged: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Server config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<String>,
    /// Application config with collections and globals
    #[arg(long)]
    pub app: Option<PathBuf>,
    /// Seed the in-memory store from a JSON file
    #[arg(long)]
    pub seed: Option<PathBuf>,
    #[arg(long)]
    pub cors: bool,
}
