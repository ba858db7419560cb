//! CLI parse: clap types for layout3d. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// layout3d CLI - Generate 3D layout hierarchies from 2D floor plans
#[derive(Parser, Debug)]
#[command(name = "layout3d")]
#[command(about = "Generate hierarchical 3D layouts from 2D floor plans")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Queue a generation job per plan file and report every job
    Generate {
        /// Plan files (JSON floor plans)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Give up waiting for the whole batch after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Generate one plan and print its layout outline
    Outline {
        file: PathBuf,
    },
    /// Generate one plan and look up a node by id
    Find {
        file: PathBuf,
        /// Node id, e.g. room-1 or item-3
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

impl Commands {
    /// Stable command name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Generate { .. } => "generate",
            Commands::Outline { .. } => "outline",
            Commands::Find { .. } => "find",
            Commands::Config => "config",
        }
    }
}
