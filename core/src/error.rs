use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown symbol '{name}'")]
    UnknownSymbol { name: String },

    #[error("Malformed value for symbol '{name}': {reason}")]
    MalformedValue { name: String, reason: String },

    #[error("Record has no ':' separator")]
    MissingSeparator,

    #[error("Invalid control value {value} for '{name}'")]
    InvalidControl { name: String, value: f64 },

    #[error("Run not initialized")]
    RunNotInitialized,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
