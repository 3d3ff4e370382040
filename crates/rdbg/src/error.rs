//! Process-level failures distinct from the wire-level `E01`/`E02` codes
//! the protocol server returns on malformed packets (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("debug artifact not found: {0}")]
    ArtifactNotFound(std::path::PathBuf),

    #[error("failed to load debug artifact: {0}")]
    Load(#[from] rdbg_artifact::LoaderError),

    #[error("server failed: {0}")]
    Serve(#[from] rdbg_proto::ServeError),
}

impl CliError {
    /// Map an error to the process exit code described in §6: `2` when the
    /// artifact path is missing, `1` for every other failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ArtifactNotFound(_) => crate::cli::EXIT_ARTIFACT_NOT_FOUND,
            Self::Load(_) | Self::Serve(_) => crate::cli::EXIT_FAILURE,
        }
    }
}
