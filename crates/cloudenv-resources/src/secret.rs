//! Secret resource
//!
//! Encrypts a plaintext value with an environment certificate so it can be
//! placed in configuration (for example the Hetzner API token). The
//! encryption happens on the control plane; nothing is stored remotely.

use async_trait::async_trait;
use cloudenv_api::ControlPlane;
use cloudenv_core::{CancellationToken, CloudError, Resource, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Environment certificate in PEM form
    pub pem: String,

    /// Plaintext to encrypt
    pub value: String,

    /// Encrypted value, filled in by the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_value: Option<String>,
}

impl Secret {
    pub fn new(pem: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            pem: pem.into(),
            value: value.into(),
            secret_value: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.pem.trim_start().starts_with("-----BEGIN") {
            return Err(CloudError::invalid_config(
                "pem must be a PEM encoded certificate",
            ));
        }
        if self.value.is_empty() {
            return Err(CloudError::invalid_config("secret value must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("pem", &self.pem)
            .field("value", &"<redacted>")
            .field("secret_value", &self.secret_value)
            .finish()
    }
}

pub struct SecretResource {
    client: Arc<dyn ControlPlane>,
}

impl SecretResource {
    pub fn new(client: Arc<dyn ControlPlane>) -> Self {
        Self { client }
    }

    async fn encrypt(&self, cancel: &CancellationToken, mut secret: Secret) -> Result<Secret> {
        if cancel.is_cancelled() {
            return Err(CloudError::Cancelled);
        }
        secret.validate()?;

        let encrypted = self.client.encrypt_secret(&secret.pem, &secret.value).await?;
        secret.secret_value = Some(encrypted);
        Ok(secret)
    }
}

#[async_trait]
impl Resource for SecretResource {
    type Model = Secret;

    fn type_name(&self) -> &str {
        "secret"
    }

    async fn create(&self, cancel: &CancellationToken, planned: Secret) -> Result<Secret> {
        self.encrypt(cancel, planned).await
    }

    async fn read(&self, _cancel: &CancellationToken, state: Secret) -> Result<Option<Secret>> {
        Ok(Some(state))
    }

    async fn update(
        &self,
        cancel: &CancellationToken,
        planned: Secret,
        prior: &Secret,
    ) -> Result<Secret> {
        // Same input: keep the ciphertext instead of producing a new one.
        if planned.pem == prior.pem && planned.value == prior.value && prior.secret_value.is_some()
        {
            return Ok(Secret {
                secret_value: prior.secret_value.clone(),
                ..planned
            });
        }
        self.encrypt(cancel, planned).await
    }

    async fn delete(&self, _cancel: &CancellationToken, _state: Secret) -> Result<()> {
        Ok(())
    }
}
