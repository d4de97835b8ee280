use std::path::PathBuf;

/// Core error type for the status bot.
///
/// Adapter crates map their specific errors into this type so the dispatcher
/// can turn any failure into a bounded, user-facing reply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid status tag: {0:?} (expected down, risk or good)")]
    InvalidTag(String),

    #[error("corrupt status record: {path}: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
