//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::output::OutputMode;

/// Compile UserCSS styles and check which pages they apply to.
#[derive(Debug, Parser)]
#[command(name = "usercss")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputMode::Text, global = true)]
    pub output: OutputMode,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Report regexp domain rules that fail to compile instead of dropping them silently
    #[arg(long, global = true)]
    pub warn_invalid_regexp: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show metadata, variables, domain rules and diagnostics
    Parse {
        /// UserCSS file, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the compiled CSS; exits with status 1 if the style has errors
    Compile {
        /// UserCSS file, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Override a variable (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE", allow_hyphen_values = true)]
        set: Vec<String>,

        /// YAML or JSON file of variable values
        #[arg(long, value_name = "FILE")]
        values: Option<PathBuf>,

        /// Write the result to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Check whether the style applies to each URL
    Match {
        /// UserCSS file, or `-` for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page URLs to test
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,
    },
}
