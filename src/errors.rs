use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while auditing a site.
///
/// Only [`AuditError::Launch`] aborts a run. Everything else is caught at the
/// smallest enclosing unit of work (one target, one discovery seed) and turned
/// into a recorded failure.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("failed to start a browser session at {endpoint}: {message}")]
    Launch { endpoint: String, message: String },

    #[error("Timeout {timeout_ms}ms exceeded while navigating to {url}")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("screenshot {path} failed: {message}")]
    Screenshot { path: PathBuf, message: String },

    #[error("browser command failed: {0}")]
    Browser(String),

    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuditError {
    /// Whether this error must abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditError::Launch { .. })
    }
}

impl From<fantoccini::error::CmdError> for AuditError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        AuditError::Browser(err.to_string())
    }
}
