//! GraphQL control-plane client
//!
//! Posts `{query, variables}` documents with bearer token authentication and
//! unwraps the `{data, errors}` envelope.

use crate::control_plane::ControlPlane;
use crate::error::{ApiError, GraphqlErrorInfo, NOT_FOUND_CODE, Result};
use crate::queries::{self, Operation};
use crate::types::{
    CloudKind, DeleteEnvRequest, DeleteEnvResponse, EnvRecord, EnvSpec, EnvStatus,
};
use async_trait::async_trait;
use cloudenv_config::{API_TOKEN_ENV, API_URL_ENV};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

const USER_AGENT: &str = concat!("cloudenv/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the control plane
#[derive(Clone)]
pub struct ApiConfig {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Read `CLOUDENV_API_URL` and `CLOUDENV_API_TOKEN`
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(API_URL_ENV)
            .map_err(|_| ApiError::InvalidConfig(format!("{API_URL_ENV} is not set")))?;
        let token = std::env::var(API_TOKEN_ENV)
            .map_err(|_| ApiError::InvalidConfig(format!("{API_TOKEN_ENV} is not set")))?;
        Ok(Self::new(url, token))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Control-plane client over HTTP
pub struct GraphqlClient {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl GraphqlClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ApiError::InvalidConfig("API URL is empty".to_string()));
        }
        if config.token.trim().is_empty() {
            return Err(ApiError::InvalidConfig("API token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url,
            token: config.token,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run `op` and deserialize the value under its response field.
    ///
    /// A `null` field or a `NOT_FOUND` error code yields [`ApiError::NotFound`].
    async fn execute<T: DeserializeOwned>(&self, op: &Operation, variables: Value) -> Result<T> {
        tracing::debug!(operation = %op.name, "Sending GraphQL request");

        let request_body = GraphqlRequest {
            query: &op.document,
            operation_name: &op.name,
            variables,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Unauthorized(non_empty_or(body, status.to_string())));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GraphqlResponse = response.json().await?;

        if !envelope.errors.is_empty() {
            let errors: Vec<GraphqlErrorInfo> = envelope
                .errors
                .into_iter()
                .map(|e| GraphqlErrorInfo {
                    message: e.message,
                    code: e.extensions.and_then(|x| x.code),
                })
                .collect();

            if errors
                .iter()
                .any(|e| e.code.as_deref() == Some(NOT_FOUND_CODE))
            {
                return Err(ApiError::NotFound(op.field.clone()));
            }
            return Err(ApiError::Graphql(errors));
        }

        let mut data = envelope
            .data
            .ok_or_else(|| ApiError::EmptyResponse(op.name.clone()))?;

        match data.get_mut(&op.field).map(Value::take) {
            None | Some(Value::Null) => Err(ApiError::NotFound(op.field.clone())),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

fn non_empty_or(body: String, fallback: String) -> String {
    if body.trim().is_empty() { fallback } else { body }
}

#[async_trait]
impl ControlPlane for GraphqlClient {
    async fn create_env(&self, name: &str, spec: &EnvSpec) -> Result<i64> {
        let op = queries::create_env(spec.kind());
        let variables = json!({ "input": { "name": name, "spec": spec.to_json()? } });
        let result: MutationResult = self.execute(&op, variables).await?;
        tracing::info!(
            "Created {} environment {} (revision {})",
            spec.kind(),
            name,
            result.spec_revision
        );
        Ok(result.spec_revision)
    }

    async fn update_env(&self, name: &str, spec: &EnvSpec) -> Result<i64> {
        let op = queries::update_env(spec.kind());
        let variables = json!({ "input": { "name": name, "spec": spec.to_json()? } });
        let result: MutationResult = self.execute(&op, variables).await?;
        tracing::info!(
            "Updated {} environment {} (revision {})",
            spec.kind(),
            name,
            result.spec_revision
        );
        Ok(result.spec_revision)
    }

    async fn get_env(&self, kind: CloudKind, name: &str) -> Result<EnvRecord> {
        let op = queries::get_env(kind);
        let raw: RawEnv = self.execute(&op, json!({ "name": name })).await?;
        Ok(EnvRecord {
            name: raw.name,
            spec_revision: raw.spec_revision,
            spec: EnvSpec::from_json(kind, raw.spec)?,
        })
    }

    async fn delete_env(
        &self,
        kind: CloudKind,
        request: &DeleteEnvRequest,
    ) -> Result<DeleteEnvResponse> {
        let op = queries::delete_env(kind);
        let response: DeleteEnvResponse = self.execute(&op, json!({ "input": request })).await?;
        tracing::info!(
            "Requested deletion of {} environment {} (pending MFA: {})",
            kind,
            request.name,
            response.pending_mfa
        );
        Ok(response)
    }

    async fn get_env_status(&self, kind: CloudKind, name: &str) -> Result<EnvStatus> {
        let op = queries::get_env_status(kind);
        self.execute(&op, json!({ "name": name })).await
    }

    async fn encrypt_secret(&self, pem: &str, value: &str) -> Result<String> {
        let op = queries::encrypt_secret();
        self.execute(&op, json!({ "pem": pem, "value": value })).await
    }
}

// ============ Envelope Types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorExtensions {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationResult {
    spec_revision: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnv {
    name: String,
    spec_revision: i64,
    spec: Value,
}
