//! Subcommand implementations.

use tracing::info;

use crate::cli::{Cli, Commands, EXIT_SUCCESS};
use crate::error::CliError;

/// Run the selected subcommand, returning the process exit code.
pub fn run_command(cli: &Cli) -> i32 {
    let result = match &cli.command {
        Commands::Serve {
            debug_json,
            addr,
            strict_checksum,
            extended_stop_reply,
        } => serve(debug_json, addr, *strict_checksum, *extended_stop_reply),
    };

    match result {
        Ok(snapshot) => {
            if cli.metrics {
                println!("{snapshot}");
            }
            EXIT_SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn serve(
    debug_json: &std::path::Path,
    addr: &str,
    strict_checksum: bool,
    extended_stop_reply: bool,
) -> Result<rdbg_proto::MetricsSnapshot, CliError> {
    if !debug_json.exists() {
        return Err(CliError::ArtifactNotFound(debug_json.to_path_buf()));
    }

    let program = rdbg_artifact::load_from_path(debug_json)?;
    info!(
        modules = program.modules.len(),
        path = %debug_json.display(),
        "loaded debug artifact"
    );

    let stop_reply_style = if extended_stop_reply {
        rdbg_proto::StopReplyStyle::Extended
    } else {
        rdbg_proto::StopReplyStyle::Simple
    };
    let config = rdbg_proto::ServerConfig::new(addr)
        .with_strict_checksum(strict_checksum)
        .with_stop_reply_style(stop_reply_style);
    let server = rdbg_proto::Server::from_config(program, config);

    server.serve(addr)?;

    let snapshot = server.metrics();
    info!(%snapshot, "server stopped");
    Ok(snapshot)
}
