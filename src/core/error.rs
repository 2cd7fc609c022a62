// src/core/error.rs
//! Classified failures of the compilation flow

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required credential or setting is missing.
    #[error("{0}")]
    Configuration(String),

    /// The database answered, but with nothing usable.
    #[error("{0}")]
    UpstreamData(String),

    /// An external service could not be reached or refused the request.
    #[error("{0}")]
    Upstream(String),

    #[error("LaTeX compilation failed. Status: {status}. {body}")]
    Compilation { status: u16, body: String },
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Configuration(_) => "CONFIG_ERROR",
            ServiceError::UpstreamData(_) => "UPSTREAM_DATA_ERROR",
            ServiceError::Upstream(_) => "UPSTREAM_ERROR",
            ServiceError::Compilation { .. } => "COMPILATION_ERROR",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ServiceError::Configuration(_) => vec![
                "Set the missing environment variable and restart the service".to_string(),
            ],
            ServiceError::UpstreamData(_) => vec![
                "Check that the get_latex() database function returns the document".to_string(),
            ],
            ServiceError::Upstream(_) => vec![
                "Try again in a few moments".to_string(),
                "Check the status of the external services".to_string(),
            ],
            ServiceError::Compilation { .. } => vec![
                "Check the LaTeX source for errors".to_string(),
                "Try GET /test-compile to verify the compiler is reachable".to_string(),
            ],
        }
    }

    pub(crate) fn upstream(context: &str, err: reqwest::Error) -> Self {
        ServiceError::Upstream(format!("{}: {}", context, err))
    }
}
