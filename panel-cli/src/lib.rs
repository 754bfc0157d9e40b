//! # Panel CLI
//!
//! Command-line front end for the layout compiler.
//!
//! ## Usage
//!
//! ```bash
//! panel compile layout.json --target lvgl -o display.yaml
//! panel compile layout.json --all -o out/
//! panel reparse display.yaml > layout.json
//! panel plugins --json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved command and compile options
//! - `run` - Executes a command, writing documents to a caller-supplied sink

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;

pub use commands::run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use panel_compiler::{CompileOptions, Target};

/// Command-line arguments for `panel`.
#[derive(Debug, Clone, Parser)]
#[command(name = "panel")]
#[command(about = "Compile widget layouts into display firmware configuration")]
#[command(version)]
pub struct CliArgs {
    /// Command to run
    #[command(subcommand)]
    pub command: CliCommand,

    /// Display component ID
    #[arg(long, global = true, env = "PANEL_DISPLAY_ID")]
    pub display_id: Option<String>,

    /// Time source component ID
    #[arg(long, global = true, env = "PANEL_TIME_ID")]
    pub time_id: Option<String>,

    /// Display platform for the procedural target
    #[arg(long, global = true)]
    pub platform: Option<String>,

    /// Refresh interval in seconds for pages without their own
    #[arg(long, global = true)]
    pub refresh: Option<u32>,

    /// Do not emit sensor declarations
    #[arg(long, global = true)]
    pub no_sensors: bool,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Compile a layout JSON file
    Compile {
        /// Layout JSON file, `-` for stdin
        input: PathBuf,

        /// Output target (direct, lvgl, oepl, opendisplay)
        #[arg(long, short, env = "PANEL_TARGET", default_value = "direct")]
        target: Target,

        /// Compile for every target; --output then names a directory
        #[arg(long)]
        all: bool,

        /// Output file, stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write the full compile report as JSON instead of the document
        #[arg(long)]
        report: bool,

        /// Fail if any widget was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Rebuild a layout JSON from compiled output
    Reparse {
        /// Compiled configuration, `-` for stdin
        input: PathBuf,

        /// Output file, stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List registered widget plugins
    Plugins {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Command to run.
    pub command: CliCommand,
    /// Options handed to the compiler.
    pub options: CompileOptions,
}

impl CliConfig {
    /// Create a configuration for `command` with default compile options.
    #[must_use]
    pub fn new(command: CliCommand) -> Self {
        Self {
            command,
            options: CompileOptions::default(),
        }
    }
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        let mut options = CompileOptions::default();
        if let Some(display_id) = args.display_id {
            options.display_id = display_id;
        }
        if let Some(time_id) = args.time_id {
            options.time_id = time_id;
        }
        if let Some(platform) = args.platform {
            options.display_platform = platform;
        }
        if let Some(refresh) = args.refresh {
            options.default_refresh_s = refresh;
        }
        options.emit_sensors = !args.no_sensors;
        Self {
            command: args.command,
            options,
        }
    }
}
