//! Error type for the edges of the game: files, the terminal and thread
//! supervision.  The simulation itself never fails; see the policies in
//! [`crate::compute`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong outside the simulation steps.
#[derive(Debug, Error)]
pub enum GameError {
    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The TOML configuration file could not be parsed.
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker `{worker}`: {source}")]
    Spawn {
        worker: &'static str,
        #[source]
        source: io::Error,
    },

    /// A worker panicked; shared state may be half-updated, so the session is
    /// unrecoverable.
    #[error("worker `{worker}` panicked")]
    WorkerPanicked { worker: &'static str },
}
