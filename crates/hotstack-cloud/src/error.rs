//! Cloud error types

use crate::resource::SubResourceStatus;
use thiserror::Error;

/// Errors raised while polling or orchestrating remote resources
#[derive(Error, Debug)]
pub enum CloudError {
    /// The status source could not be reached or returned unusable output.
    #[error("Failed to query {resource}: {detail}")]
    QueryFailed { resource: String, detail: String },

    #[error("Timed out waiting for {resource} after {elapsed_secs} seconds (last status: {last_status})")]
    TimedOut {
        resource: String,
        elapsed_secs: u64,
        last_status: String,
    },

    /// The remote system reported a failure terminal status.
    #[error("{resource} reached failure status {status}: {reason}")]
    ResourceFailed {
        resource: String,
        status: String,
        reason: String,
    },

    #[error("{} of {total} resources in stack '{stack}' failed: {}", .failed.len(), format_failures(.failed))]
    VerificationFailed {
        stack: String,
        total: usize,
        failed: Vec<SubResourceStatus>,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn query_failed(resource: impl ToString, detail: impl Into<String>) -> Self {
        Self::QueryFailed {
            resource: resource.to_string(),
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_))
    }
}

fn format_failures(failed: &[SubResourceStatus]) -> String {
    failed
        .iter()
        .map(|r| format!("{}: {}", r.name, r.status))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, CloudError>;
