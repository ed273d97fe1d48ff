//! GCP environment model

use super::common::{
    Lifecycle, merge_list, merge_maintenance_windows, merge_node_groups, require_field,
    validate_maintenance_windows, validate_name, validate_node_groups,
};
use super::{EnvModel, unexpected_spec};
use cloudenv_api::{CloudKind, EnvSpec, GcpEnvSpec};
use cloudenv_core::{Result, reorder_names};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpEnv {
    pub name: String,
    pub spec: GcpEnvSpec,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_revision: Option<i64>,
}

impl EnvModel for GcpEnv {
    const KIND: CloudKind = CloudKind::Gcp;
    const TYPE_NAME: &'static str = "gcp_env";

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
        require_field("gcp_project_id", &self.spec.gcp_project_id)?;
        require_field("region", &self.spec.region)?;
        require_field("cidr", &self.spec.cidr)?;
        validate_node_groups(&self.spec.node_groups, &self.spec.zones)?;
        validate_maintenance_windows(&self.spec.maintenance_windows)
    }

    fn to_spec(&self) -> EnvSpec {
        EnvSpec::Gcp(self.spec.clone())
    }

    fn from_spec(prior: &Self, spec: EnvSpec) -> Result<Self> {
        let mut remote = match spec {
            EnvSpec::Gcp(remote) => remote,
            other => return Err(unexpected_spec(Self::KIND, &other)),
        };
        let before = &prior.spec;

        remote.zones = reorder_names(&before.zones, remote.zones);
        remote.node_groups = merge_node_groups(&before.node_groups, remote.node_groups);
        remote.peering_connections = merge_list(
            &before.peering_connections,
            remote.peering_connections,
            |p| p.network_name.clone(),
            |_, _| {},
        );
        remote.private_service_consumers = reorder_names(
            &before.private_service_consumers,
            remote.private_service_consumers,
        );
        remote.maintenance_windows =
            merge_maintenance_windows(&before.maintenance_windows, remote.maintenance_windows);

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
