//! Validation and ordering helpers shared by the environment models

use cloudenv_api::{KeyValue, MaintenanceWindowSpec, NodeGroupSpec};
use cloudenv_core::{CloudError, Result, reorder, reorder_names};
use serde::{Deserialize, Serialize};

/// Reservations a node group may carry
pub const RESERVATIONS: &[&str] = &["CLICKHOUSE", "ZOOKEEPER", "SYSTEM"];

/// What to do with the remote side when the environment is destroyed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifecycle {
    /// Delete even if the environment still hosts clusters
    pub force_destroy: bool,

    /// Tear down the clusters together with the environment
    pub force_destroy_clusters: bool,

    /// Only forget the environment; leave the cloud resources running
    pub skip_deprovision_on_destroy: bool,
}

/// Merge a server list into the order of `prior`, matching on `key_of`.
///
/// `nested` runs for every merged item that has a counterpart in `prior`, so
/// list fields inside the item can be reordered as well.
pub(crate) fn merge_list<T, F, N>(prior: &[T], server: Vec<T>, key_of: F, mut nested: N) -> Vec<T>
where
    F: Fn(&T) -> String,
    N: FnMut(&T, &mut T),
{
    let keys: Vec<String> = prior.iter().map(&key_of).collect();
    let mut merged = reorder(&keys, server, &key_of);

    for item in &mut merged {
        let key = key_of(item);
        if let Some(before) = prior.iter().find(|&p| key_of(p) == key) {
            nested(before, item);
        }
    }

    merged
}

/// Node groups keyed by node type, with zones and reservations in user order
pub(crate) fn merge_node_groups(
    prior: &[NodeGroupSpec],
    server: Vec<NodeGroupSpec>,
) -> Vec<NodeGroupSpec> {
    merge_list(
        prior,
        server,
        |g| g.node_type.clone(),
        |before, group| {
            group.zones = reorder_names(&before.zones, std::mem::take(&mut group.zones));
            group.reservations =
                reorder_names(&before.reservations, std::mem::take(&mut group.reservations));
        },
    )
}

pub(crate) fn merge_tags(prior: &[KeyValue], server: Vec<KeyValue>) -> Vec<KeyValue> {
    merge_list(prior, server, |t| t.key.clone(), |_, _| {})
}

pub(crate) fn merge_maintenance_windows(
    prior: &[MaintenanceWindowSpec],
    server: Vec<MaintenanceWindowSpec>,
) -> Vec<MaintenanceWindowSpec> {
    merge_list(
        prior,
        server,
        |w| w.name.clone(),
        |before, window| {
            window.days = reorder_names(&before.days, std::mem::take(&mut window.days));
        },
    )
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CloudError::invalid_config("environment name must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CloudError::invalid_config(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

pub(crate) fn require_node_groups(count: usize) -> Result<()> {
    if count == 0 {
        return Err(CloudError::invalid_config(
            "at least one node group is required",
        ));
    }
    Ok(())
}

/// Checks one node group.
///
/// `env_zones` is `None` when the environment does not declare zones itself
/// (Kubernetes), in which case the group may name any zone.
pub(crate) fn validate_node_group(
    node_type: &str,
    capacity: u32,
    zones: &[String],
    reservations: &[String],
    env_zones: Option<&[String]>,
) -> Result<()> {
    require_field("node group node_type", node_type)?;

    if capacity == 0 {
        return Err(CloudError::invalid_config(format!(
            "node group {node_type}: capacity must be greater than 0"
        )));
    }

    if let Some(env_zones) = env_zones {
        if let Some(zone) = zones.iter().find(|z| !env_zones.contains(z)) {
            return Err(CloudError::invalid_config(format!(
                "node group {node_type}: zone {zone} is not one of the environment zones"
            )));
        }
    }

    if let Some(reservation) = reservations
        .iter()
        .find(|r| !RESERVATIONS.contains(&r.as_str()))
    {
        return Err(CloudError::invalid_config(format!(
            "node group {node_type}: unknown reservation {reservation} (expected one of {})",
            RESERVATIONS.join(", ")
        )));
    }

    Ok(())
}

pub(crate) fn validate_maintenance_windows(windows: &[MaintenanceWindowSpec]) -> Result<()> {
    for window in windows {
        if window.hour > 23 {
            return Err(CloudError::invalid_config(format!(
                "maintenance window {}: hour must be between 0 and 23",
                window.name
            )));
        }
        if !(1..=24).contains(&window.length_in_hours) {
            return Err(CloudError::invalid_config(format!(
                "maintenance window {}: length_in_hours must be between 1 and 24",
                window.name
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate_node_groups(groups: &[NodeGroupSpec], env_zones: &[String]) -> Result<()> {
    require_node_groups(groups.len())?;
    for group in groups {
        validate_node_group(
            &group.node_type,
            group.capacity_per_zone,
            &group.zones,
            &group.reservations,
            Some(env_zones),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(node_type: &str, zones: &[&str]) -> NodeGroupSpec {
        NodeGroupSpec {
            name: node_type.to_string(),
            node_type: node_type.to_string(),
            capacity_per_zone: 3,
            zones: zones.iter().map(|z| z.to_string()).collect(),
            reservations: vec!["CLICKHOUSE".to_string()],
        }
    }

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(|z| z.to_string()).collect()
    }

    #[test]
    fn test_merge_node_groups_reorders_nested_zones() {
        let prior = vec![group("m5.large", &["b", "a"]), group("t3.small", &["a"])];
        let server = vec![
            group("t3.small", &["a"]),
            group("r6.xlarge", &["c"]),
            group("m5.large", &["a", "b"]),
        ];

        let merged = merge_node_groups(&prior, server);
        let types: Vec<&str> = merged.iter().map(|g| g.node_type.as_str()).collect();

        assert_eq!(types, vec!["m5.large", "t3.small", "r6.xlarge"]);
        assert_eq!(merged[0].zones, zones(&["b", "a"]));
    }

    #[test]
    fn test_merge_tags_keeps_server_only_tags() {
        let prior = vec![KeyValue {
            key: "team".into(),
            value: "data".into(),
        }];
        let server = vec![
            KeyValue {
                key: "managed-by".into(),
                value: "cloudenv".into(),
            },
            KeyValue {
                key: "team".into(),
                value: "data".into(),
            },
        ];

        let merged = merge_tags(&prior, server);
        assert_eq!(merged[0].key, "team");
        assert_eq!(merged[1].key, "managed-by");
    }

    #[test]
    fn test_node_group_zone_outside_environment() {
        let err = validate_node_groups(&[group("m5.large", &["us-east-1d"])], &zones(&["us-east-1a"]))
            .unwrap_err();
        assert!(err.to_string().contains("us-east-1d"));
    }

    #[test]
    fn test_node_group_requires_capacity() {
        let mut g = group("m5.large", &["a"]);
        g.capacity_per_zone = 0;
        assert!(validate_node_groups(&[g], &zones(&["a"])).is_err());
    }

    #[test]
    fn test_unknown_reservation() {
        let mut g = group("m5.large", &["a"]);
        g.reservations = vec!["KAFKA".into()];
        let err = validate_node_groups(&[g], &zones(&["a"])).unwrap_err();
        assert!(err.to_string().contains("KAFKA"));
    }

    #[test]
    fn test_empty_node_groups() {
        assert!(validate_node_groups(&[], &zones(&["a"])).is_err());
    }

    #[test]
    fn test_maintenance_window_bounds() {
        let mut window = MaintenanceWindowSpec {
            name: "weekly".into(),
            enabled: true,
            hour: 3,
            length_in_hours: 4,
            days: vec!["SUNDAY".into()],
        };
        assert!(validate_maintenance_windows(std::slice::from_ref(&window)).is_ok());

        window.hour = 24;
        assert!(validate_maintenance_windows(std::slice::from_ref(&window)).is_err());

        window.hour = 0;
        window.length_in_hours = 0;
        assert!(validate_maintenance_windows(&[window]).is_err());
    }
}
