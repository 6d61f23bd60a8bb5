use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not signed in or session expired")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl FlowError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FlowError::Unauthorized)
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
