//! Error types for the playbook loop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. None of them are
//! recovered inside the loop: they propagate to the driver and abort the
//! current iteration.

use thiserror::Error;

/// The top-level error type for all ACE operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Response parsing ---
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    // --- Playbook store ---
    #[error("Playbook error: {0}")]
    Playbook(#[from] PlaybookError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// The LLM gateway failed to return a usable response.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Gateway text could not be turned into a typed role output.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The payload after the thinking segment is not valid JSON.
    #[error("Response is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but a required key is missing or has the wrong shape.
    #[error("Response does not match the {record} schema: {reason}")]
    SchemaMismatch { record: &'static str, reason: String },
}

/// A playbook mutation referenced something that is not there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybookError {
    #[error("Unknown bullet id: {0}")]
    UnknownBullet(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 502,
            message: "Bad gateway".into(),
        });
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad gateway"));
    }

    #[test]
    fn schema_mismatch_names_the_record() {
        let err = Error::Parse(ParseError::SchemaMismatch {
            record: "GeneratorOutput",
            reason: "missing field `final_answer`".into(),
        });
        let text = err.to_string();
        assert!(text.contains("GeneratorOutput"));
        assert!(text.contains("final_answer"));
    }

    #[test]
    fn unknown_bullet_converts_into_top_level_error() {
        let err: Error = PlaybookError::UnknownBullet("ghost".into()).into();
        assert!(matches!(err, Error::Playbook(PlaybookError::UnknownBullet(ref id)) if id == "ghost"));
    }
}
