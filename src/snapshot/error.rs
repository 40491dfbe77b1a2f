use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write snapshot file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode snapshot")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to decode snapshot")]
    Decode(#[source] Box<bincode::error::DecodeError>),

    #[error("Snapshot version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Snapshot holds an invalid record: {0}")]
    InvalidRecord(String),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
