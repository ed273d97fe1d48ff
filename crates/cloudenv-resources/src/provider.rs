//! Provider entry point

use crate::env::{AwsEnv, AzureEnv, EnvResource, GcpEnv, HcloudEnv, K8sEnv};
use crate::secret::SecretResource;
use crate::status::EnvStatusResource;
use cloudenv_api::{ApiConfig, CloudKind, ControlPlane, GraphqlClient};
use cloudenv_config::Settings;
use cloudenv_core::{CloudError, Result, Timeouts};
use std::sync::Arc;

/// Hands out resource handlers that share one control-plane client
#[derive(Clone)]
pub struct Provider {
    client: Arc<dyn ControlPlane>,
    timeouts: Timeouts,
}

impl Provider {
    pub fn new(client: Arc<dyn ControlPlane>, timeouts: Timeouts) -> Self {
        Self { client, timeouts }
    }

    /// Build a provider talking to the control plane named in `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings
            .validate()
            .map_err(|e| CloudError::invalid_config(e.to_string()))?;

        let url = settings
            .api_url()
            .map_err(|e| CloudError::invalid_config(e.to_string()))?;
        let token = settings
            .api_token()
            .map_err(|e| CloudError::invalid_config(e.to_string()))?;

        let config = ApiConfig::new(url, token).with_timeout(settings.request_timeout());
        let client = GraphqlClient::new(config)?;
        tracing::debug!(url = %client.url(), "Control plane client ready");

        Ok(Self::new(Arc::new(client), timeouts_from(settings)))
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub fn aws_env(&self) -> EnvResource<AwsEnv> {
        EnvResource::new(Arc::clone(&self.client), self.timeouts)
    }

    pub fn azure_env(&self) -> EnvResource<AzureEnv> {
        EnvResource::new(Arc::clone(&self.client), self.timeouts)
    }

    pub fn gcp_env(&self) -> EnvResource<GcpEnv> {
        EnvResource::new(Arc::clone(&self.client), self.timeouts)
    }

    pub fn hcloud_env(&self) -> EnvResource<HcloudEnv> {
        EnvResource::new(Arc::clone(&self.client), self.timeouts)
    }

    pub fn k8s_env(&self) -> EnvResource<K8sEnv> {
        EnvResource::new(Arc::clone(&self.client), self.timeouts)
    }

    pub fn env_status(&self, kind: CloudKind) -> EnvStatusResource {
        EnvStatusResource::new(Arc::clone(&self.client), self.timeouts, kind)
    }

    pub fn aws_env_status(&self) -> EnvStatusResource {
        self.env_status(CloudKind::Aws)
    }

    pub fn azure_env_status(&self) -> EnvStatusResource {
        self.env_status(CloudKind::Azure)
    }

    pub fn gcp_env_status(&self) -> EnvStatusResource {
        self.env_status(CloudKind::Gcp)
    }

    pub fn hcloud_env_status(&self) -> EnvStatusResource {
        self.env_status(CloudKind::Hcloud)
    }

    pub fn k8s_env_status(&self) -> EnvStatusResource {
        self.env_status(CloudKind::K8s)
    }

    pub fn secret(&self) -> SecretResource {
        SecretResource::new(Arc::clone(&self.client))
    }
}

fn timeouts_from(settings: &Settings) -> Timeouts {
    let t = &settings.timeouts;
    Timeouts {
        deletion: t.deletion(),
        mfa_confirmation: t.mfa_confirmation(),
        spec_revision: t.spec_revision(),
        poll_interval: t.poll_interval(),
    }
}
