/// Result type for bluebloom operations
pub type Result<T> = std::result::Result<T, BloomError>;

/// Errors surfaced by the bloom data and scoring layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BloomError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("failed to parse data: {0}")]
    Data(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("config error: {0}")]
    Config(String),
}

impl BloomError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        BloomError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BloomError::Validation(message.into())
    }
}
