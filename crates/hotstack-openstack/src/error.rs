//! OpenStack collaborator error types

use hotstack_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("{0} not found. Please install it and make sure it is on PATH")]
    ProgramNotFound(String),

    #[error("{program} command failed: {stderr}")]
    CommandFailed { program: String, stderr: String },

    #[error("{program} command timed out after {timeout_secs} seconds")]
    CommandTimedOut { program: String, timeout_secs: u64 },

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Unexpected command output: {0}")]
    InvalidOutput(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<OpenStackError> for CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::StackNotFound(name) => CloudError::ResourceNotFound(name),
            OpenStackError::JsonError(e) => CloudError::Json(e),
            OpenStackError::IoError(e) => CloudError::Io(e),
            OpenStackError::InvalidOutput(msg) => CloudError::ApiError(msg),
            other => CloudError::CommandFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpenStackError>;
