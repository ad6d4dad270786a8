//! Error taxonomy shared by the release pipeline.
//!
//! Only a failed release-metadata lookup is fatal to a run; every other
//! variant is recorded against a single asset or manifest and the run goes on.

use std::path::PathBuf;

use crate::retry::TransferError;

#[derive(Debug, thiserror::Error)]
pub enum GhrelError {
    /// Metadata lookup or asset transfer failed.
    #[error("{context}: {source}")]
    Network {
        context: String,
        #[source]
        source: TransferError,
    },

    /// Local file could not be created, written, or read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest text or release JSON is malformed.
    #[error("{context}: {reason}")]
    Format { context: String, reason: String },

    /// Digest of a downloaded file could not be computed.
    #[error("computing digest of {}: {reason}", path.display())]
    Compute { path: PathBuf, reason: String },

    /// Invalid user input or configuration (e.g. a bad glob or repo name).
    #[error("{0}")]
    Config(String),
}

impl GhrelError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GhrelError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(context: impl Into<String>, reason: impl Into<String>) -> Self {
        GhrelError::Format {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = GhrelError> = std::result::Result<T, E>;
