//! # pathstate CLI Module
//!
//! This module implements the CLI interface for pathstate.
//!
//! ## Available Commands
//!
//! - `run` - Replay a scenario file against a fresh store
//! - `path` - Read, test or write a key path in a JSON document
//! - `compare` - Structural `includes` / `matches` of two JSON values

mod commands;

use clap::{Parser, Subcommand};
use pathstate_core::StateError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// pathstate - path-addressed reactive state
///
/// Drive the state core from the command line: replay scenarios, resolve key
/// paths in JSON documents and compare values structurally.
#[derive(Parser, Debug)]
#[command(name = "pathstate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scenario file
    Run {
        /// Path to the scenario file (TOML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Scenario format (toml, json); inferred from the extension if omitted
        #[arg(short = 't', long)]
        format: Option<String>,
    },

    /// Resolve a key path in a JSON document
    Path {
        /// Path to the JSON document
        #[arg(short, long)]
        file: PathBuf,

        /// Dotted key path, e.g. "cart.items.0.qty" or "tags[]"
        #[arg(short, long)]
        key: String,

        /// JSON literal to write at the key; prints the updated document
        #[arg(short, long, conflicts_with = "has")]
        set: Option<String>,

        /// Only report whether the key is present
        #[arg(long)]
        has: bool,
    },

    /// Compare two JSON literals structurally
    Compare {
        /// The value searched in
        value: String,

        /// The structure searched for
        search: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StateError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Run { file, format } => {
            cmd_run(&file, format.as_deref(), json_mode, cli.verbose)
        }
        Commands::Path {
            file,
            key,
            set,
            has,
        } => cmd_path(&file, &key, set.as_deref(), has, json_mode),
        Commands::Compare { value, search } => cmd_compare(&value, &search, json_mode),
    }
}
