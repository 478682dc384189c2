use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sdiff",
    about = "sdiff: semantic diff of API schema snapshots",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare the schemas of two servers or snapshot files
    Diff(DiffArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// Left source: server location or snapshot file
    pub source1: String,

    /// Right source: server location or snapshot file
    pub source2: String,

    /// Base URL for relative locations such as /dev; without a value the
    /// configured default is used
    #[arg(short, long, num_args = 0..=1, value_name = "URL")]
    pub base_url: Option<Option<String>>,

    /// Treat both sources as complete URLs, ignoring any base URL
    #[arg(short, long)]
    pub absolute: bool,

    /// Write the raw delta (jsondiffpatch JSON) to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write an HTML visualization; without a value the file name is derived
    /// from both servers' version and revision
    #[arg(short, long, num_args = 0..=1, value_name = "FILE")]
    pub generate: Option<Option<PathBuf>>,

    /// Neither read nor write the schema cache
    #[arg(long)]
    pub no_cache: bool,

    /// Override the cache directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// HTTP basic-auth user
    #[arg(long, env = "SDIFF_USERNAME")]
    pub username: Option<String>,

    /// HTTP basic-auth password
    #[arg(long, env = "SDIFF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}
