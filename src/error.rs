//! Structured diagnostics for the read side of the collection layer.
use reqwest::StatusCode;
use thiserror::Error;

/// Why a read against the backend produced no value.
///
/// `Status`, `Decode` and `Empty` are the recoverable "absent" outcomes: the
/// caller may simply re-issue the call. `Transport` carries whatever the
/// underlying HTTP stack raised (unreachable host, broken body stream).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {path} failed with status {status}")]
    Status { path: String, status: StatusCode },
    #[error("unexpected payload from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty payload from {path}")]
    Empty { path: String },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl FetchError {
    /// True for the failures that collapse to "no result" at the call site.
    pub fn is_absent(&self) -> bool {
        !matches!(self, FetchError::Transport(_))
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            FetchError::Status { path, .. }
            | FetchError::Decode { path, .. }
            | FetchError::Empty { path } => Some(path),
            FetchError::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_not_absent() {
        let err = FetchError::Transport(anyhow::anyhow!("connection refused"));
        assert!(!err.is_absent());
        assert!(err.path().is_none());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn status_errors_report_path() {
        let err = FetchError::Status {
            path: "/api/firmware/search".into(),
            status: StatusCode::FORBIDDEN,
        };
        assert!(err.is_absent());
        assert_eq!(err.path(), Some("/api/firmware/search"));
        assert!(err.to_string().contains("403"));
    }
}
