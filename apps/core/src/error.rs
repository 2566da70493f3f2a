use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
///
/// None of these ever reach a chat user verbatim: the engine turns every failure
/// path into a themed natural-language reply, and the update handler logs and
/// drops what is left.
#[derive(Debug, Error)]
pub enum AppError {
    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents errors from an outbound HTTP call (weather provider, delivery channel).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A collaborator answered, but with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., missing environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents errors from operations that did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The delivery channel could not hand the reply over.
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("HTTP request timed out: {}", err))
        } else {
            AppError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_pick_the_variant() {
        let json = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert!(matches!(AppError::from(json), AppError::Validation(_)));

        let url = url::Url::parse("not a url").unwrap_err();
        assert!(matches!(AppError::from(url), AppError::Config(_)));

        let io = io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed");
        assert!(AppError::from(io).to_string().starts_with("I/O error"));
    }
}
