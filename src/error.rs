use thiserror::Error;

/// Result type alias using QuizError.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors raised by the persistence, seeding and quiz layers.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal i/o failed: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("quiz item {0} not found")]
    ItemNotFound(String),
}

/// Reasons the strict geometry parser rejects its input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryParseError {
    #[error("closing bracket before opening bracket at offset {offset}")]
    UnbalancedBrackets { offset: usize },

    #[error("invalid coordinate {value:?}")]
    InvalidCoordinate { value: String },
}
