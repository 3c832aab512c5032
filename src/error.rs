#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cost Explorer error: {0}")]
    Upstream(String),

    #[error("Webhook delivery failed: HTTP {status} - {body}")]
    Delivery { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl NotifierError {
    /// Shorthand for building a [`NotifierError::Configuration`].
    pub fn config(msg: impl Into<String>) -> Self {
        NotifierError::Configuration(msg.into())
    }

    /// Whether this error was caused by the invocation payload rather than
    /// by a remote service.
    pub fn is_configuration(&self) -> bool {
        matches!(self, NotifierError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;
