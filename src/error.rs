use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrmError>;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Record not found in {table}: {id}")]
    RecordNotFound { table: String, id: String },

    #[error("Record {0} is still being created")]
    Unsaved(String),

    #[error("Invalid record ID: {0}")]
    InvalidRecordId(String),

    #[error("Unknown stage: {0}")]
    InvalidStage(String),

    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("Remote store returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl CrmError {
    /// True for errors meaning the addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}
