//! pom-lint CLI tool.
//!
//! Usage:
//! ```bash
//! pom-lint check [OPTIONS] [PATH]
//! pom-lint fix [OPTIONS] [PATH]
//! pom-lint list-rules
//! pom-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter and auto-fixer for Maven build descriptors
#[derive(Parser)]
#[command(name = "pom-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every pom.xml under a directory
    Check {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific checkers (comma-separated names or codes)
        #[arg(long)]
        checkers: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Version every catalog BOM must use, overriding the catalog
        #[arg(long)]
        bom_version: Option<String>,
    },

    /// Rewrite descriptors in place to remove fixable violations
    Fix {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only run specific fixers (comma-separated names or codes)
        #[arg(long)]
        checkers: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Version every catalog BOM must use, overriding the catalog
        #[arg(long)]
        bom_version: Option<String>,
    },

    /// List available checkers
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            checkers,
            exclude,
            bom_version,
        } => {
            let options = commands::RunOptions {
                checkers,
                exclude,
                bom_version,
            };
            commands::check::run(&path, format, options, cli.config.as_deref())
        }
        Commands::Fix {
            path,
            checkers,
            exclude,
            bom_version,
        } => {
            let options = commands::RunOptions {
                checkers,
                exclude,
                bom_version,
            };
            commands::fix::run(&path, options, cli.config.as_deref())
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
