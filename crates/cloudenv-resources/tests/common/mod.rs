//! In-memory control plane for resource tests

#![allow(dead_code)]

use async_trait::async_trait;
use cloudenv_api::{
    ApiError, AwsEnvSpec, CloudKind, ControlPlane, DeleteEnvRequest, DeleteEnvResponse,
    EnvRecord, EnvSpec, EnvStatus, NodeGroupSpec, Result, StatusError,
};
use cloudenv_core::Timeouts;
use cloudenv_resources::AwsEnv;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn test_timeouts() -> Timeouts {
    Timeouts {
        deletion: Duration::from_secs(60),
        mfa_confirmation: Duration::from_secs(10),
        spec_revision: Duration::from_secs(30),
        poll_interval: Duration::from_secs(1),
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn aws_env(name: &str) -> AwsEnv {
    AwsEnv {
        name: name.to_string(),
        spec: AwsEnvSpec {
            aws_account_id: "123456789012".into(),
            region: "us-east-1".into(),
            cidr: "10.67.0.0/21".into(),
            zones: strings(&["us-east-1c", "us-east-1a"]),
            node_groups: vec![
                NodeGroupSpec {
                    name: "system".into(),
                    node_type: "t4g.large".into(),
                    capacity_per_zone: 3,
                    zones: strings(&["us-east-1c", "us-east-1a"]),
                    reservations: strings(&["SYSTEM", "ZOOKEEPER"]),
                },
                NodeGroupSpec {
                    name: "clickhouse".into(),
                    node_type: "m6i.xlarge".into(),
                    capacity_per_zone: 6,
                    zones: strings(&["us-east-1a"]),
                    reservations: strings(&["CLICKHOUSE"]),
                },
            ],
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn status(applied: i64) -> EnvStatus {
    EnvStatus {
        applied_spec_revision: applied,
        ..Default::default()
    }
}

/// Status of an environment whose deletion is still in progress
pub fn deleting_status(applied: i64) -> EnvStatus {
    EnvStatus {
        applied_spec_revision: applied,
        pending_delete: true,
        ..Default::default()
    }
}

pub fn status_with_error(applied: i64, code: &str) -> EnvStatus {
    EnvStatus {
        applied_spec_revision: applied,
        errors: vec![StatusError {
            code: code.to_string(),
            message: format!("{code} reported"),
        }],
        ..Default::default()
    }
}

#[derive(Default)]
struct MockState {
    envs: HashMap<(CloudKind, String), EnvRecord>,
    statuses: VecDeque<Result<EnvStatus>>,
    deletes: Vec<DeleteEnvRequest>,
    deleting: HashSet<(CloudKind, String)>,
    pending_mfa: bool,
    creates: usize,
    updates: usize,
    status_calls: usize,
    encryptions: usize,
}

/// Control plane backed by a map.
///
/// `get_env_status` first drains the scripted queue; once it is empty it
/// reports the stored revision as applied, or not-found for unknown names.
/// Environments with a delete in flight report `pending_delete`.
#[derive(Default)]
pub struct MockControlPlane {
    state: Mutex<MockState>,
}

impl MockControlPlane {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, name: &str, spec_revision: i64, spec: EnvSpec) {
        let mut state = self.state.lock().unwrap();
        state.envs.insert(
            (spec.kind(), name.to_string()),
            EnvRecord {
                name: name.to_string(),
                spec_revision,
                spec,
            },
        );
    }

    /// Rewrite a stored spec, as the server would when it normalizes input
    pub fn edit(&self, kind: CloudKind, name: &str, edit: impl FnOnce(&mut EnvSpec)) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.envs.get_mut(&(kind, name.to_string())) {
            edit(&mut record.spec);
        }
    }

    pub fn remove(&self, kind: CloudKind, name: &str) {
        self.state
            .lock()
            .unwrap()
            .envs
            .remove(&(kind, name.to_string()));
    }

    pub fn push_status(&self, status: EnvStatus) {
        self.state.lock().unwrap().statuses.push_back(Ok(status));
    }

    pub fn push_not_found(&self) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .push_back(Err(ApiError::NotFound("envStatus".into())));
    }

    pub fn set_pending_mfa(&self, pending: bool) {
        self.state.lock().unwrap().pending_mfa = pending;
    }

    pub fn deletes(&self) -> Vec<DeleteEnvRequest> {
        self.state.lock().unwrap().deletes.clone()
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().unwrap().status_calls
    }

    pub fn encryptions(&self) -> usize {
        self.state.lock().unwrap().encryptions
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn create_env(&self, name: &str, spec: &EnvSpec) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        let key = (spec.kind(), name.to_string());
        if state.envs.contains_key(&key) {
            return Err(ApiError::Status {
                status: 409,
                body: format!("environment {name} already exists"),
            });
        }
        state.creates += 1;
        state.envs.insert(
            key,
            EnvRecord {
                name: name.to_string(),
                spec_revision: 1,
                spec: spec.clone(),
            },
        );
        Ok(1)
    }

    async fn update_env(&self, name: &str, spec: &EnvSpec) -> Result<i64> {
        let mut state = self.state.lock().unwrap();
        state.updates += 1;
        let record = state
            .envs
            .get_mut(&(spec.kind(), name.to_string()))
            .ok_or_else(|| ApiError::NotFound(name.to_string()))?;
        record.spec = spec.clone();
        record.spec_revision += 1;
        Ok(record.spec_revision)
    }

    async fn get_env(&self, kind: CloudKind, name: &str) -> Result<EnvRecord> {
        let state = self.state.lock().unwrap();
        state
            .envs
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(name.to_string()))
    }

    async fn delete_env(
        &self,
        kind: CloudKind,
        request: &DeleteEnvRequest,
    ) -> Result<DeleteEnvResponse> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push(request.clone());
        let key = (kind, request.name.clone());
        if !state.envs.contains_key(&key) {
            return Err(ApiError::NotFound(request.name.clone()));
        }
        state.deleting.insert(key);
        Ok(DeleteEnvResponse {
            pending_mfa: state.pending_mfa,
        })
    }

    async fn get_env_status(&self, kind: CloudKind, name: &str) -> Result<EnvStatus> {
        let mut state = self.state.lock().unwrap();
        state.status_calls += 1;

        if let Some(next) = state.statuses.pop_front() {
            return next;
        }

        let key = (kind, name.to_string());
        let pending_mfa = state.pending_mfa;
        let pending_delete = state.deleting.contains(&key);
        match state.envs.get(&key) {
            Some(record) => Ok(EnvStatus {
                applied_spec_revision: record.spec_revision,
                pending_delete,
                pending_mfa,
                ..Default::default()
            }),
            None => Err(ApiError::NotFound(name.to_string())),
        }
    }

    async fn encrypt_secret(&self, _pem: &str, value: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.encryptions += 1;
        Ok(format!("enc:{}", value.len()))
    }
}
