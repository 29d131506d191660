//! Driver-level errors.

use std::path::PathBuf;

use thiserror::Error;

use ember_core::error::{ConfigError, DispatchError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("failed to spawn dispatch loop: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("dispatch loop is no longer accepting commands")]
    LoopClosed,

    #[error("dispatch loop panicked")]
    LoopPanicked,

    #[error("snapshot file {}: {source}", path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot JSON: {0}")]
    SnapshotJson(#[from] serde_json::Error),
}
