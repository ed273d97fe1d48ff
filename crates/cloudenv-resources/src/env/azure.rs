//! Azure environment model

use super::common::{
    Lifecycle, merge_maintenance_windows, merge_node_groups, merge_tags, require_field,
    validate_maintenance_windows, validate_name, validate_node_groups,
};
use super::{EnvModel, unexpected_spec};
use cloudenv_api::{AzureEnvSpec, CloudKind, EnvSpec};
use cloudenv_core::{Result, reorder_names};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureEnv {
    pub name: String,
    pub spec: AzureEnvSpec,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_revision: Option<i64>,
}

impl EnvModel for AzureEnv {
    const KIND: CloudKind = CloudKind::Azure;
    const TYPE_NAME: &'static str = "azure_env";

    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn spec_revision(&self) -> Option<i64> {
        self.spec_revision
    }

    fn set_spec_revision(&mut self, revision: i64) {
        self.spec_revision = Some(revision);
    }

    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        require_field("tenant_id", &self.spec.tenant_id)?;
        require_field("subscription_id", &self.spec.subscription_id)?;
        require_field("region", &self.spec.region)?;
        require_field("cidr", &self.spec.cidr)?;
        validate_node_groups(&self.spec.node_groups, &self.spec.zones)?;
        validate_maintenance_windows(&self.spec.maintenance_windows)
    }

    fn to_spec(&self) -> EnvSpec {
        EnvSpec::Azure(self.spec.clone())
    }

    fn from_spec(prior: &Self, spec: EnvSpec) -> Result<Self> {
        let mut remote = match spec {
            EnvSpec::Azure(remote) => remote,
            other => return Err(unexpected_spec(Self::KIND, &other)),
        };
        let before = &prior.spec;

        remote.zones = reorder_names(&before.zones, remote.zones);
        remote.node_groups = merge_node_groups(&before.node_groups, remote.node_groups);
        remote.tags = merge_tags(&before.tags, remote.tags);
        remote.maintenance_windows =
            merge_maintenance_windows(&before.maintenance_windows, remote.maintenance_windows);

        if let (Some(user), Some(server)) = (
            before.private_link_service.as_ref(),
            remote.private_link_service.as_mut(),
        ) {
            server.allowed_subscriptions = reorder_names(
                &user.allowed_subscriptions,
                std::mem::take(&mut server.allowed_subscriptions),
            );
        }

        Ok(Self {
            name: prior.name.clone(),
            spec: remote,
            lifecycle: prior.lifecycle.clone(),
            spec_revision: prior.spec_revision,
        })
    }

    fn imported(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudenv_api::{NodeGroupSpec, PrivateLinkServiceSpec};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn model() -> AzureEnv {
        AzureEnv {
            name: "analytics".into(),
            spec: AzureEnvSpec {
                tenant_id: "tenant".into(),
                subscription_id: "subscription".into(),
                region: "eastus".into(),
                cidr: "10.136.0.0/21".into(),
                zones: strings(&["eastus-1", "eastus-2"]),
                node_groups: vec![NodeGroupSpec {
                    name: "default".into(),
                    node_type: "Standard_D4s_v5".into(),
                    capacity_per_zone: 5,
                    zones: strings(&["eastus-2", "eastus-1"]),
                    reservations: strings(&["CLICKHOUSE", "SYSTEM"]),
                }],
                private_link_service: Some(PrivateLinkServiceSpec {
                    allowed_subscriptions: strings(&["sub-b", "sub-a"]),
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_subscription() {
        let mut env = model();
        assert!(env.validate().is_ok());

        env.spec.subscription_id.clear();
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_from_spec_keeps_private_link_order() {
        let prior = model();
        let mut remote = prior.spec.clone();
        if let Some(pls) = remote.private_link_service.as_mut() {
            pls.allowed_subscriptions = strings(&["sub-a", "sub-c", "sub-b"]);
        }

        let merged = AzureEnv::from_spec(&prior, EnvSpec::Azure(remote)).unwrap();
        let pls = merged.spec.private_link_service.unwrap();

        assert_eq!(pls.allowed_subscriptions, strings(&["sub-b", "sub-a", "sub-c"]));
    }
}
