//! Failures when loading dashboard data.

use std::path::PathBuf;

pub type SourceResult<T> = Result<T, SourceError>;

/// Why a dashboard payload could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A job or data file that was asked for does not exist.
    #[error("{0}")]
    Missing(String),

    /// The queue API could not be reached or answered with an error status.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// A local data file exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A payload was read but does not have the expected shape.
    #[error("Invalid {what}: {message}")]
    InvalidPayload { what: &'static str, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SourceError {
    pub fn invalid(what: &'static str, err: impl std::fmt::Display) -> Self {
        SourceError::InvalidPayload {
            what,
            message: err.to_string(),
        }
    }

    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SourceError::Missing("Job 42 not found".into());
        assert_eq!(err.to_string(), "Job 42 not found");

        let err = SourceError::invalid("user-jobs.json", "expected a list");
        assert_eq!(err.to_string(), "Invalid user-jobs.json: expected a list");

        let err = SourceError::Unreadable {
            path: PathBuf::from("/data/power.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to read /data/power.csv: denied");
    }

    #[test]
    fn test_only_upstream_errors_are_transient() {
        assert!(SourceError::Upstream("timeout".into()).is_transient());
        assert!(!SourceError::invalid("queue response", "bad").is_transient());
        assert!(!SourceError::Missing("power.csv".into()).is_transient());
    }
}
