//! Domain error taxonomy shared by every drowse crate.
//!
//! Client crates convert transport failures into [`CoreError`] variants
//! at the seam; the retry executor wraps the last underlying error in
//! [`CoreError::RetryExhausted`] once attempts are exhausted.

/// Domain-level error type.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup found nothing.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Input failed boundary validation.
    #[error("{0}")]
    Validation(String),

    /// An operation was attempted against a record in the wrong state
    /// (e.g. starting generation for a job that is not `pending`).
    #[error("{0}")]
    Precondition(String),

    /// An upstream generative call returned no usable content.
    #[error("{0}")]
    EmptyGeneration(String),

    /// A non-success response from an external API.
    #[error("Service error: HTTP {status} - {body}")]
    Service { status: u16, body: String },

    /// All retry attempts were consumed; wraps the last underlying error.
    #[error("Failed after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<CoreError>,
    },

    /// A storage read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything that does not fit the categories above.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap `source` after `attempts` consecutive failures.
    pub fn retry_exhausted(attempts: u32, source: CoreError) -> Self {
        Self::RetryExhausted {
            attempts,
            source: Box::new(source),
        }
    }

    /// The innermost error message, unwrapping retry exhaustion.
    ///
    /// Used when recording a job-level failure: the poller should see
    /// the underlying cause, not the retry wrapper.
    pub fn root_message(&self) -> String {
        match self {
            Self::RetryExhausted { source, .. } => source.root_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_exhausted_message_names_attempt_count() {
        let err = CoreError::retry_exhausted(
            3,
            CoreError::EmptyGeneration("model returned empty story content".into()),
        );
        assert!(err.to_string().contains("3"));
        assert!(err.to_string().contains("empty story content"));
    }

    #[test]
    fn root_message_unwraps_retry_layers() {
        let inner = CoreError::Service {
            status: 502,
            body: "bad gateway".into(),
        };
        let err = CoreError::retry_exhausted(3, inner);
        assert_eq!(err.root_message(), "Service error: HTTP 502 - bad gateway");
    }

    #[test]
    fn not_found_display() {
        let err = CoreError::NotFound {
            entity: "Job",
            key: "2026-08-29-user-abc123".into(),
        };
        assert_eq!(err.to_string(), "Job not found: 2026-08-29-user-abc123");
    }
}
