use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for BattleKeep
#[derive(Parser, Debug)]
#[command(
    name = "battlekeep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keyed registry of battle state trackers",
    long_about = "Tracks battle state from protocol logs. Replay a saved log, or serve a keyed \
                  registry of battles over a JSON-lines stdin/stdout protocol."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a protocol log and print the resulting battle state
    Replay(ReplayArgs),
    /// Serve the battle engine over stdin/stdout, one JSON request per line
    Serve,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Replay arguments
#[derive(ClapArgs, Debug)]
pub struct ReplayArgs {
    /// Protocol log file, one message per line
    pub file: PathBuf,

    /// Session key (random when omitted)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Stop once this turn has begun
    #[arg(short, long)]
    pub turn: Option<u32>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Create a project configuration file
    Init {
        /// Directory to create `.battlekeep/config.toml` in
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}
