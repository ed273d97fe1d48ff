//! Kubernetes environment model
//!
//! Runs on a cluster the user already operates (EKS, GKE, AKS or any other
//! distribution). There is no environment-level zone list; node groups pick
//! nodes through tolerations and selectors.

use super::common::{
    Lifecycle, merge_list, merge_maintenance_windows, require_node_groups,
    validate_maintenance_windows, validate_name, validate_node_group,
};
use super::{EnvModel, unexpected_spec};
use cloudenv_api::{CloudKind, EnvSpec, K8sEnvSpec, LogsSpec, TolerationSpec};
use cloudenv_core::{CloudError, Result, reorder_names};
use serde::{Deserialize, Serialize};

const TOLERATION_OPERATORS: &[&str] = &["Equal", "Exists"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct K8sEnv {
    pub name: String,
    pub spec: K8sEnvSpec,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_revision: Option<i64>,
}

fn validate_toleration(node_type: &str, toleration: &TolerationSpec) -> Result<()> {
    if !TOLERATION_OPERATORS.contains(&toleration.operator.as_str()) {
        return Err(CloudError::invalid_config(format!(
            "node group {node_type}: toleration {} has operator {}, expected Equal or Exists",
            toleration.key, toleration.operator
        )));
    }
    if toleration.operator == "Exists" && !toleration.value.is_empty() {
        return Err(CloudError::invalid_config(format!(
            "node group {node_type}: toleration {} uses Exists and must not set a value",
            toleration.key
        )));
    }
    Ok(())
}

fn validate_logs(logs: &LogsSpec) -> Result<()> {
    match (&logs.storage.s3, &logs.storage.gcs) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(CloudError::invalid_config(
            "logs storage must configure exactly one of s3 or gcs",
        )),
    }
}

impl EnvModel for K8sEnv {
    const KIND: CloudKind = CloudKind::K8s;
    const TYPE_NAME: &'static str = "k8s_env";

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

        require_node_groups(self.spec.node_groups.len())?;
        for group in &self.spec.node_groups {
            validate_node_group(
                &group.node_type,
                group.capacity_per_zone,
                &group.zones,
                &group.reservations,
                None,
            )?;
            for toleration in &group.tolerations {
                validate_toleration(&group.node_type, toleration)?;
            }
        }

        if let Some(logs) = &self.spec.logs {
            validate_logs(logs)?;
        }

        validate_maintenance_windows(&self.spec.maintenance_windows)
    }

    fn to_spec(&self) -> EnvSpec {
        EnvSpec::K8s(self.spec.clone())
    }

    fn from_spec(prior: &Self, spec: EnvSpec) -> Result<Self> {
        let mut remote = match spec {
            EnvSpec::K8s(remote) => remote,
            other => return Err(unexpected_spec(Self::KIND, &other)),
        };
        let before = &prior.spec;

        remote.node_groups = merge_list(
            &before.node_groups,
            remote.node_groups,
            |g| g.node_type.clone(),
            |user, group| {
                group.zones = reorder_names(&user.zones, std::mem::take(&mut group.zones));
                group.reservations =
                    reorder_names(&user.reservations, std::mem::take(&mut group.reservations));
                group.tolerations = merge_list(
                    &user.tolerations,
                    std::mem::take(&mut group.tolerations),
                    |t| t.key.clone(),
                    |_, _| {},
                );
                group.selector = merge_list(
                    &user.selector,
                    std::mem::take(&mut group.selector),
                    |s| s.key.clone(),
                    |_, _| {},
                );
            },
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
    use cloudenv_api::{
        GcsLogsSpec, K8sDistribution, K8sNodeGroupSpec, KeyValue, LogsStorageSpec, S3LogsSpec,
    };

    fn toleration(key: &str, operator: &str, value: &str) -> TolerationSpec {
        TolerationSpec {
            key: key.into(),
            operator: operator.into(),
            value: value.into(),
            effect: "NoSchedule".into(),
        }
    }

    fn selector(key: &str) -> KeyValue {
        KeyValue {
            key: key.into(),
            value: "true".into(),
        }
    }

    fn model() -> K8sEnv {
        K8sEnv {
            name: "onprem".into(),
            spec: K8sEnvSpec {
                distribution: K8sDistribution::Eks,
                node_groups: vec![K8sNodeGroupSpec {
                    name: "ch".into(),
                    node_type: "m6i.large".into(),
                    capacity_per_zone: 3,
                    zones: vec!["us-west-2a".into()],
                    reservations: vec!["CLICKHOUSE".into()],
                    tolerations: vec![
                        toleration("dedicated", "Equal", "clickhouse"),
                        toleration("spot", "Exists", ""),
                    ],
                    selector: vec![selector("disk"), selector("pool")],
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_exists_toleration_must_not_have_value() {
        let mut env = model();
        assert!(env.validate().is_ok());

        env.spec.node_groups[0].tolerations[1].value = "yes".into();
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_unknown_toleration_operator() {
        let mut env = model();
        env.spec.node_groups[0].tolerations[0].operator = "In".into();
        let err = env.validate().unwrap_err();
        assert!(err.to_string().contains("In"));
    }

    #[test]
    fn test_logs_need_exactly_one_bucket() {
        let mut env = model();
        env.spec.logs = Some(LogsSpec {
            storage: LogsStorageSpec {
                s3: Some(S3LogsSpec {
                    bucket_name: "logs".into(),
                    region: "us-west-2".into(),
                }),
                gcs: Some(GcsLogsSpec {
                    bucket_name: "logs".into(),
                }),
            },
        });
        assert!(env.validate().is_err());

        if let Some(logs) = env.spec.logs.as_mut() {
            logs.storage.s3 = None;
        }
        assert!(env.validate().is_ok());

        env.spec.logs = Some(LogsSpec::default());
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_gcs_bucket_survives_refresh() {
        let mut prior = model();
        prior.spec.logs = Some(LogsSpec {
            storage: LogsStorageSpec {
                s3: None,
                gcs: Some(GcsLogsSpec {
                    bucket_name: "gcs-logs".into(),
                }),
            },
        });

        let merged = K8sEnv::from_spec(&prior, EnvSpec::K8s(prior.spec.clone())).unwrap();
        let storage = merged.spec.logs.unwrap().storage;

        assert!(storage.s3.is_none());
        assert_eq!(storage.gcs.unwrap().bucket_name, "gcs-logs");
    }

    #[test]
    fn test_from_spec_reorders_tolerations_and_selectors() {
        let prior = model();
        let mut remote = prior.spec.clone();
        remote.node_groups[0].tolerations.reverse();
        remote.node_groups[0].selector.reverse();
        remote.node_groups[0].selector.push(selector("arch"));

        let merged = K8sEnv::from_spec(&prior, EnvSpec::K8s(remote)).unwrap();
        let group = &merged.spec.node_groups[0];

        assert_eq!(group.tolerations, prior.spec.node_groups[0].tolerations);
        let keys: Vec<&str> = group.selector.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["disk", "pool", "arch"]);
    }
}
