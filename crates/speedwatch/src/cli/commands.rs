//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Path to a recorded location trace (JSON Lines)
    pub trace: PathBuf,

    /// Speed limit in km/h (overrides configuration)
    #[arg(short, long, value_name = "KMH")]
    pub limit: Option<f64>,

    /// Replay the trace at its recorded pace instead of all at once
    #[arg(short, long)]
    pub realtime: bool,

    /// Provider timeout in milliseconds (overrides configuration)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

/// Speed limit commands.
#[derive(Debug, Subcommand)]
pub enum LimitCommand {
    /// Set the speed limit
    Set {
        /// New limit in km/h
        kmh: f64,
    },

    /// Reset the speed limit to the default of 40 km/h
    Reset,

    /// Show the effective speed limit
    Show,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
