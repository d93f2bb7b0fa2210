//! Tableau host error types.

use std::path::PathBuf;

use thiserror::Error;

/// Startup and runtime errors for the console host.
#[derive(Debug, Error)]
pub enum HostError {
    /// An environment variable is present but invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The story file could not be read.
    #[error("cannot read story {path}: {source}")]
    StoryRead {
        /// Story file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The story file is not valid story JSON.
    #[error("invalid story {path}: {source}")]
    StoryFormat {
        /// Story file path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Save directory or terminal I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
