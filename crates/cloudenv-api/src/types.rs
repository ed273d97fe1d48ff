//! Control-plane wire types
//!
//! Field names follow the GraphQL schema (camelCase). Environment specs are
//! exchanged as a JSON scalar, so each cloud has its own spec struct.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cloud an environment runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudKind {
    Aws,
    Azure,
    Gcp,
    Hcloud,
    K8s,
}

impl CloudKind {
    pub const ALL: [CloudKind; 5] = [
        CloudKind::Aws,
        CloudKind::Azure,
        CloudKind::Gcp,
        CloudKind::Hcloud,
        CloudKind::K8s,
    ];

    /// Type-name fragment used in operation and input names (`createAWSEnv`)
    pub fn graphql_name(&self) -> &'static str {
        match self {
            CloudKind::Aws => "AWS",
            CloudKind::Azure => "Azure",
            CloudKind::Gcp => "GCP",
            CloudKind::Hcloud => "HCloud",
            CloudKind::K8s => "K8S",
        }
    }

    /// Prefix of query fields (`awsEnv`, `awsEnvStatus`)
    pub fn field_prefix(&self) -> &'static str {
        match self {
            CloudKind::Aws => "aws",
            CloudKind::Azure => "azure",
            CloudKind::Gcp => "gcp",
            CloudKind::Hcloud => "hcloud",
            CloudKind::K8s => "k8s",
        }
    }
}

impl fmt::Display for CloudKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_prefix())
    }
}

/// Generic key/value pair (tags, node selectors)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceWindowSpec {
    pub name: String,
    pub enabled: bool,
    pub hour: u8,
    pub length_in_hours: u8,
    #[serde(default)]
    pub days: Vec<String>,
}

/// Node group on AWS, Azure and GCP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSpec {
    pub name: String,
    pub node_type: String,
    pub capacity_per_zone: u32,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub reservations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    pub enabled: bool,
    #[serde(default)]
    pub source_ip_ranges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_zone: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancersSpec {
    #[serde(default)]
    pub public: LoadBalancerSpec,
    #[serde(default)]
    pub internal: LoadBalancerSpec,
}

// ============ AWS ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsPeeringSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
    pub vpc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsEndpointSpec {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub private_dns: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsEnvSpec {
    pub aws_account_id: String,
    pub region: String,
    pub cidr: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub nat: bool,
    #[serde(default)]
    pub node_groups: Vec<NodeGroupSpec>,
    #[serde(default)]
    pub load_balancers: LoadBalancersSpec,
    #[serde(default)]
    pub peering_connections: Vec<AwsPeeringSpec>,
    #[serde(default)]
    pub endpoints: Vec<AwsEndpointSpec>,
    #[serde(default)]
    pub tags: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions_boundary_policy_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_prefix: Option<String>,
    #[serde(default)]
    pub cloud_connect: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindowSpec>,
}

// ============ Azure ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateLinkServiceSpec {
    #[serde(default)]
    pub allowed_subscriptions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureEnvSpec {
    pub tenant_id: String,
    pub subscription_id: String,
    pub region: String,
    pub cidr: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub node_groups: Vec<NodeGroupSpec>,
    #[serde(default)]
    pub load_balancers: LoadBalancersSpec,
    #[serde(default)]
    pub tags: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_link_service: Option<PrivateLinkServiceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindowSpec>,
}

// ============ GCP ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpPeeringSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub network_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpEnvSpec {
    pub gcp_project_id: String,
    pub region: String,
    pub cidr: String,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub node_groups: Vec<NodeGroupSpec>,
    #[serde(default)]
    pub load_balancers: LoadBalancersSpec,
    #[serde(default)]
    pub peering_connections: Vec<GcpPeeringSpec>,
    #[serde(default)]
    pub private_service_consumers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindowSpec>,
}

// ============ Hetzner Cloud ============

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcloudNodeGroupSpec {
    pub name: String,
    pub node_type: String,
    pub capacity_per_location: u32,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub reservations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireguardPeerSpec {
    pub public_key: String,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcloudEnvSpec {
    /// Hetzner API token, encrypted with the environment certificate
    pub hcloud_token_enc: String,
    pub location: String,
    pub network_zone: String,
    pub cidr: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub node_groups: Vec<HcloudNodeGroupSpec>,
    #[serde(default)]
    pub load_balancers: LoadBalancersSpec,
    #[serde(default)]
    pub wireguard_peers: Vec<WireguardPeerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindowSpec>,
}

// ============ Kubernetes ============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum K8sDistribution {
    Eks,
    Gke,
    Aks,
    #[default]
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TolerationSpec {
    pub key: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub effect: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct K8sNodeGroupSpec {
    pub name: String,
    pub node_type: String,
    pub capacity_per_zone: u32,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub reservations: Vec<String>,
    #[serde(default)]
    pub tolerations: Vec<TolerationSpec>,
    #[serde(default)]
    pub selector: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3LogsSpec {
    pub bucket_name: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsLogsSpec {
    pub bucket_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsStorageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3LogsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs: Option<GcsLogsSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsSpec {
    pub storage: LogsStorageSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSpec {
    pub retention_period_in_days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct K8sEnvSpec {
    pub distribution: K8sDistribution,
    #[serde(default)]
    pub node_groups: Vec<K8sNodeGroupSpec>,
    #[serde(default)]
    pub load_balancers: LoadBalancersSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<LogsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindowSpec>,
}

// ============ Envelopes ============

/// Environment spec for any cloud
#[derive(Debug, Clone, PartialEq)]
pub enum EnvSpec {
    Aws(AwsEnvSpec),
    Azure(AzureEnvSpec),
    Gcp(GcpEnvSpec),
    Hcloud(HcloudEnvSpec),
    K8s(K8sEnvSpec),
}

impl EnvSpec {
    pub fn kind(&self) -> CloudKind {
        match self {
            EnvSpec::Aws(_) => CloudKind::Aws,
            EnvSpec::Azure(_) => CloudKind::Azure,
            EnvSpec::Gcp(_) => CloudKind::Gcp,
            EnvSpec::Hcloud(_) => CloudKind::Hcloud,
            EnvSpec::K8s(_) => CloudKind::K8s,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            EnvSpec::Aws(spec) => serde_json::to_value(spec),
            EnvSpec::Azure(spec) => serde_json::to_value(spec),
            EnvSpec::Gcp(spec) => serde_json::to_value(spec),
            EnvSpec::Hcloud(spec) => serde_json::to_value(spec),
            EnvSpec::K8s(spec) => serde_json::to_value(spec),
        }
    }

    pub fn from_json(kind: CloudKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            CloudKind::Aws => EnvSpec::Aws(serde_json::from_value(value)?),
            CloudKind::Azure => EnvSpec::Azure(serde_json::from_value(value)?),
            CloudKind::Gcp => EnvSpec::Gcp(serde_json::from_value(value)?),
            CloudKind::Hcloud => EnvSpec::Hcloud(serde_json::from_value(value)?),
            CloudKind::K8s => EnvSpec::K8s(serde_json::from_value(value)?),
        })
    }
}

/// Environment as stored by the control plane
#[derive(Debug, Clone, PartialEq)]
pub struct EnvRecord {
    pub name: String,
    pub spec_revision: i64,
    pub spec: EnvSpec,
}

/// Error entry on an environment status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusError {
    pub code: String,
    pub message: String,
}

/// Convergence status of an environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvStatus {
    #[serde(default)]
    pub applied_spec_revision: i64,
    #[serde(default)]
    pub pending_delete: bool,
    #[serde(default, rename = "pendingMFA")]
    pub pending_mfa: bool,
    #[serde(default)]
    pub errors: Vec<StatusError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEnvRequest {
    pub name: String,
    pub force: bool,
    pub force_destroy_clusters: bool,
    pub skip_deprovision: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteEnvResponse {
    #[serde(default, rename = "pendingMFA")]
    pub pending_mfa: bool,
}
