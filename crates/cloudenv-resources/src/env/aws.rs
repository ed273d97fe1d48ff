//! AWS environment model

use super::common::{
    Lifecycle, merge_list, merge_maintenance_windows, merge_node_groups, merge_tags,
    require_field, validate_maintenance_windows, validate_name, validate_node_groups,
};
use super::{EnvModel, unexpected_spec};
use cloudenv_api::{AwsEnvSpec, CloudKind, EnvSpec};
use cloudenv_core::{CloudError, Result, reorder_names};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsEnv {
    pub name: String,
    pub spec: AwsEnvSpec,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_revision: Option<i64>,
}

impl EnvModel for AwsEnv {
    const KIND: CloudKind = CloudKind::Aws;
    const TYPE_NAME: &'static str = "aws_env";

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
        require_field("aws_account_id", &self.spec.aws_account_id)?;
        require_field("region", &self.spec.region)?;
        require_field("cidr", &self.spec.cidr)?;

        if !self.spec.aws_account_id.chars().all(|c| c.is_ascii_digit())
            || self.spec.aws_account_id.len() != 12
        {
            return Err(CloudError::invalid_config(format!(
                "aws_account_id must be 12 digits, got {}",
                self.spec.aws_account_id
            )));
        }

        validate_node_groups(&self.spec.node_groups, &self.spec.zones)?;
        validate_maintenance_windows(&self.spec.maintenance_windows)
    }

    fn to_spec(&self) -> EnvSpec {
        EnvSpec::Aws(self.spec.clone())
    }

    fn from_spec(prior: &Self, spec: EnvSpec) -> Result<Self> {
        let mut remote = match spec {
            EnvSpec::Aws(remote) => remote,
            other => return Err(unexpected_spec(Self::KIND, &other)),
        };
        let before = &prior.spec;

        remote.zones = reorder_names(&before.zones, remote.zones);
        remote.node_groups = merge_node_groups(&before.node_groups, remote.node_groups);
        remote.tags = merge_tags(&before.tags, remote.tags);
        remote.peering_connections = merge_list(
            &before.peering_connections,
            remote.peering_connections,
            |p| p.vpc_id.clone(),
            |_, _| {},
        );
        remote.endpoints = merge_list(
            &before.endpoints,
            remote.endpoints,
            |e| e.service_name.clone(),
            |_, _| {},
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

#[cfg(test)]
mod tests {
    use super::*;
    use cloudenv_api::{KeyValue, NodeGroupSpec};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn model() -> AwsEnv {
        AwsEnv {
            name: "prod".into(),
            spec: AwsEnvSpec {
                aws_account_id: "123456789012".into(),
                region: "us-east-1".into(),
                cidr: "10.67.0.0/21".into(),
                zones: strings(&["us-east-1b", "us-east-1a"]),
                node_groups: vec![
                    NodeGroupSpec {
                        name: "system".into(),
                        node_type: "t4g.large".into(),
                        capacity_per_zone: 3,
                        zones: strings(&["us-east-1b", "us-east-1a"]),
                        reservations: strings(&["SYSTEM", "ZOOKEEPER"]),
                    },
                    NodeGroupSpec {
                        name: "clickhouse".into(),
                        node_type: "m6i.xlarge".into(),
                        capacity_per_zone: 10,
                        zones: strings(&["us-east-1a"]),
                        reservations: strings(&["CLICKHOUSE"]),
                    },
                ],
                tags: vec![KeyValue {
                    key: "team".into(),
                    value: "data".into(),
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_model() {
        assert!(model().validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_account_id() {
        let mut env = model();
        env.spec.aws_account_id = "12345".into();
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_from_spec_restores_user_order() {
        let prior = model();
        let mut remote = prior.spec.clone();
        remote.zones.reverse();
        remote.node_groups.reverse();
        remote.node_groups[1].zones.reverse();
        remote.tags.insert(
            0,
            KeyValue {
                key: "managed-by".into(),
                value: "cloudenv".into(),
            },
        );

        let merged = AwsEnv::from_spec(&prior, EnvSpec::Aws(remote)).unwrap();

        assert_eq!(merged.spec.zones, prior.spec.zones);
        assert_eq!(merged.spec.node_groups, prior.spec.node_groups);
        assert_eq!(merged.spec.tags[0].key, "team");
        assert_eq!(merged.spec.tags[1].key, "managed-by");
    }

    #[test]
    fn test_from_spec_rejects_other_cloud() {
        let result = AwsEnv::from_spec(&model(), EnvSpec::Gcp(Default::default()));
        assert!(result.is_err());
    }
}
