//! Control-plane API error types

use crate::messages::friendly_message;
use cloudenv_core::CloudError;
use thiserror::Error;

/// Error code the control plane attaches to missing objects
pub const NOT_FOUND_CODE: &str = "NOT_FOUND";

/// A single GraphQL error entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphqlErrorInfo {
    pub message: String,
    pub code: Option<String>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{}", join_messages(.0))]
    Graphql(Vec<GraphqlErrorInfo>),

    #[error("Empty response for {0}")]
    EmptyResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

fn join_messages(errors: &[GraphqlErrorInfo]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ApiError> for CloudError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => CloudError::NotFound(what),
            ApiError::Unauthorized(message) => {
                CloudError::AuthenticationFailed(friendly_message(&message))
            }
            ApiError::InvalidConfig(message) => CloudError::InvalidConfig(message),
            ApiError::Json(e) => CloudError::Json(e),
            other => {
                let raw = other.to_string();
                if raw.to_lowercase().contains("already exists") {
                    CloudError::AlreadyExists(friendly_message(&raw))
                } else {
                    CloudError::ApiError(friendly_message(&raw))
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_absence() {
        let err: CloudError = ApiError::NotFound("awsEnv prod".into()).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_duplicate_name_maps_to_already_exists() {
        let err: CloudError = ApiError::Graphql(vec![GraphqlErrorInfo {
            message: "environment prod already exists".into(),
            code: Some("CONFLICT".into()),
        }])
        .into();

        assert!(matches!(err, CloudError::AlreadyExists(_)));
    }

    #[test]
    fn test_graphql_messages_are_joined() {
        let err = ApiError::Graphql(vec![
            GraphqlErrorInfo {
                message: "first".into(),
                code: None,
            },
            GraphqlErrorInfo {
                message: "second".into(),
                code: None,
            },
        ]);

        assert_eq!(err.to_string(), "first; second");
    }
}
