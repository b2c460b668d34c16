use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} {id} references missing {parent}")]
    ReferentialIntegrity {
        entity: &'static str,
        id: u64,
        parent: String,
    },

    #[error("Invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
