//! Hetzner Cloud environment model
//!
//! Hetzner places capacity per location rather than per zone, so node groups
//! reference `locations` which must be a subset of the environment locations.

use super::common::{
    Lifecycle, merge_list, merge_maintenance_windows, require_field, require_node_groups,
    validate_maintenance_windows, validate_name, validate_node_group,
};
use super::{EnvModel, unexpected_spec};
use cloudenv_api::{CloudKind, EnvSpec, HcloudEnvSpec};
use cloudenv_core::{CloudError, Result, reorder_names};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HcloudEnv {
    pub name: String,
    pub spec: HcloudEnvSpec,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_revision: Option<i64>,
}

impl EnvModel for HcloudEnv {
    const KIND: CloudKind = CloudKind::Hcloud;
    const TYPE_NAME: &'static str = "hcloud_env";

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
        require_field("hcloud_token_enc", &self.spec.hcloud_token_enc)?;
        require_field("location", &self.spec.location)?;
        require_field("network_zone", &self.spec.network_zone)?;
        require_field("cidr", &self.spec.cidr)?;

        if !self.spec.locations.is_empty() && !self.spec.locations.contains(&self.spec.location) {
            return Err(CloudError::invalid_config(format!(
                "location {} must be one of locations",
                self.spec.location
            )));
        }

        require_node_groups(self.spec.node_groups.len())?;
        for group in &self.spec.node_groups {
            validate_node_group(
                &group.node_type,
                group.capacity_per_location,
                &group.locations,
                &group.reservations,
                Some(self.spec.locations.as_slice()),
            )?;
        }

        for peer in &self.spec.wireguard_peers {
            require_field("wireguard peer public_key", &peer.public_key)?;
        }

        validate_maintenance_windows(&self.spec.maintenance_windows)
    }

    fn to_spec(&self) -> EnvSpec {
        EnvSpec::Hcloud(self.spec.clone())
    }

    fn from_spec(prior: &Self, spec: EnvSpec) -> Result<Self> {
        let mut remote = match spec {
            EnvSpec::Hcloud(remote) => remote,
            other => return Err(unexpected_spec(Self::KIND, &other)),
        };
        let before = &prior.spec;

        remote.locations = reorder_names(&before.locations, remote.locations);
        remote.node_groups = merge_list(
            &before.node_groups,
            remote.node_groups,
            |g| g.node_type.clone(),
            |user, group| {
                group.locations =
                    reorder_names(&user.locations, std::mem::take(&mut group.locations));
                group.reservations =
                    reorder_names(&user.reservations, std::mem::take(&mut group.reservations));
            },
        );
        remote.wireguard_peers = merge_list(
            &before.wireguard_peers,
            remote.wireguard_peers,
            |p| p.public_key.clone(),
            |user, peer| {
                peer.allowed_ips =
                    reorder_names(&user.allowed_ips, std::mem::take(&mut peer.allowed_ips));
            },
        );
        remote.maintenance_windows =
            merge_maintenance_windows(&before.maintenance_windows, remote.maintenance_windows);

        // The control plane never echoes the encrypted token back.
        if remote.hcloud_token_enc.is_empty() {
            remote.hcloud_token_enc = before.hcloud_token_enc.clone();
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
