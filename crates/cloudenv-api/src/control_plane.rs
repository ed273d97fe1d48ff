//! Control-plane trait definition

use crate::error::Result;
use crate::types::{CloudKind, DeleteEnvRequest, DeleteEnvResponse, EnvRecord, EnvSpec, EnvStatus};
use async_trait::async_trait;

/// Operations the resources need from the control plane
///
/// [`GraphqlClient`](crate::GraphqlClient) is the production implementation;
/// tests substitute an in-memory one.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Create an environment, returning the submitted spec revision
    async fn create_env(&self, name: &str, spec: &EnvSpec) -> Result<i64>;

    /// Replace an environment spec, returning the new spec revision
    async fn update_env(&self, name: &str, spec: &EnvSpec) -> Result<i64>;

    /// Fetch an environment. Missing environments yield `ApiError::NotFound`.
    async fn get_env(&self, kind: CloudKind, name: &str) -> Result<EnvRecord>;

    /// Request deletion. The response tells whether MFA approval is pending.
    async fn delete_env(
        &self,
        kind: CloudKind,
        request: &DeleteEnvRequest,
    ) -> Result<DeleteEnvResponse>;

    /// Fetch convergence status. Missing environments yield `ApiError::NotFound`.
    async fn get_env_status(&self, kind: CloudKind, name: &str) -> Result<EnvStatus>;

    /// Encrypt `value` with the environment certificate `pem`
    async fn encrypt_secret(&self, pem: &str, value: &str) -> Result<String>;
}
