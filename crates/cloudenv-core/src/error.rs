//! Cloud environment error types

use std::fmt;
use thiserror::Error;

/// What a bounded poll was waiting for.
///
/// Only used to phrase timeout messages; the loop itself is identical for
/// both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// Waiting for a deleted environment to disappear.
    Deletion,
    /// Waiting for the applied spec revision to catch up with the submitted one.
    SpecRevision,
}

impl fmt::Display for WaitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitKind::Deletion => write!(f, "deletion"),
            WaitKind::SpecRevision => write!(f, "spec revision to be applied"),
        }
    }
}

/// A `(code, message)` pair reported by the remote status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIssue {
    pub code: String,
    pub message: String,
}

impl RemoteIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Cloud environment errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timeout waiting for {0}")]
    Timeout(WaitKind),

    #[error(
        "Timeout waiting for MFA confirmation. Approve the pending request and run the operation again"
    )]
    ConfirmationTimeout,

    #[error("Remote reported errors: {}", join_issues(.0))]
    RemoteFatal(Vec<RemoteIssue>),

    #[error("Status fetch failed: {0}")]
    FetchFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the error means the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        CloudError::InvalidConfig(message.into())
    }
}

fn join_issues(issues: &[RemoteIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CloudError>;
