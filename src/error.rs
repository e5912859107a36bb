use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "CSV file '{path}' does not exist.\nRun the dataset download step first to generate it."
    )]
    NotFound { path: String },

    #[error("Missing columns in CSV: {missing:?}\nAvailable columns: {present:?}")]
    Schema {
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("Database error: {message}")]
    Store { message: String },

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

impl IngestError {
    pub(crate) fn store(context: &str, err: impl std::fmt::Display) -> Self {
        IngestError::Store {
            message: format!("{context}: {err}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
