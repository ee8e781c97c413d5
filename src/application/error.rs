use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Database error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// Coarse classification for the adapter layer: everything except
    /// a storage failure is a caller mistake and must not be retried.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Storage(_) => "storage",
            _ => "validation",
        }
    }
}
