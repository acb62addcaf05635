use thiserror::Error;

/// Errors raised while declaring a suite.
#[derive(Debug, Error)]
pub enum SuiteError {
    // Opener label that is not present in the article table
    #[error("unknown article: {0}")]
    UnknownArticle(String),

    // A context body gave up; `context` is the composed context name
    #[error("failed to declare context `{context}`: {message}")]
    Declaration { context: String, message: String },

    #[error("context stack left unbalanced ({depth} context(s) still open)")]
    Unbalanced { depth: usize },

    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SuiteError {
    fn from(err: serde_json::Error) -> Self {
        SuiteError::Config(err.to_string())
    }
}

// Type alias for results that use `SuiteError` as the error type
pub type Result<T> = std::result::Result<T, SuiteError>;
