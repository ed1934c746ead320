/// Result type alias for the trainer
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the trainer
///
/// Typing mistakes are never errors; they are recorded as data in the
/// error tracker. These variants cover misuse of the engine and failures
/// of the persistence collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot start a session without practice text")]
    EmptyText,

    #[error("a session is already in progress or awaiting reset")]
    NotIdle,

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
