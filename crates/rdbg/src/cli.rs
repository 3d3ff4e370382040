//! CLI definitions and argument types (§6).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a missing artifact path.
pub const EXIT_ARTIFACT_NOT_FOUND: i32 = 2;
/// Exit code for any other read/parse/listen failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "rdbg")]
#[command(about = "Remote debugging backend for a compiled language")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after the server stops
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets the default log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a debug artifact and serve the debug protocol over TCP
    Serve {
        /// Path to the debug artifact JSON produced by the debug-information producer
        #[arg(long, value_name = "PATH")]
        debug_json: PathBuf,

        /// Listen address, `host:port` or `:port`
        #[arg(long, default_value = ":9000")]
        addr: String,

        /// Reject frames whose checksum does not match their payload
        /// instead of the default lenient behavior (§9)
        #[arg(long)]
        strict_checksum: bool,

        /// Render stop replies as `T05;thread:1;pc:<hex>;` instead of the
        /// default bare `S05` (§4.7)
        #[arg(long)]
        extended_stop_reply: bool,
    },
}
