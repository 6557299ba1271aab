use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = PruneError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PruneError {
    #[error("Unable to obtain a pull token for {repository}: {status}")]
    Auth {
        repository: String,
        status: StatusCode,
    },

    #[error("Manifest {reference} not found in {repository}")]
    NotFound {
        repository: String,
        reference: String,
    },

    #[error("Unknown container {0}")]
    UnknownPackage(String),

    #[error("Unknown repository {0}")]
    UnknownRepository(String),

    #[error("Registry error fetching {url}: {status}")]
    Registry { url: String, status: StatusCode },

    #[error("{status} for url: {url}")]
    Http { url: String, status: StatusCode },

    #[error("Insufficient privileges to delete {0}")]
    InsufficientPrivilege(String),

    #[error("Invalid JSON from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PruneError {
    pub(crate) fn malformed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Renders an error and its causes on a single line.
pub fn format_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !s.contains(&message) {
            s.push_str(": ");
            s.push_str(&message);
        }
        source = cause.source();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_message_names_version() {
        let err = PruneError::InsufficientPrivilege("sha256:abcdef".into());
        assert_eq!(
            err.to_string(),
            "Insufficient privileges to delete sha256:abcdef"
        );
    }

    #[test]
    fn format_single_line() {
        let err = PruneError::Http {
            url: "https://api.github.com/user".into(),
            status: StatusCode::BAD_GATEWAY,
        };
        let rendered = format_error(&err);
        assert!(!rendered.contains('\n'));
        assert!(rendered.starts_with("502 Bad Gateway"));
    }
}
