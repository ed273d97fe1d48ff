//! Environment status resources
//!
//! A status resource does not own anything remote. Creating or updating it
//! blocks until the environment has applied a given spec revision, which lets
//! dependent resources wait for an environment change to roll out.

use async_trait::async_trait;
use cloudenv_api::{CloudKind, ControlPlane, EnvStatus};
use cloudenv_core::{
    CancellationToken, CloudError, PollOutcome, RemoteIssue, Resource, Result, StatusCheck,
    Timeouts, poll_until,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status error codes that do not end a wait, per cloud.
///
/// A GCP environment reports `DISCONNECTED` while its agent reconnects; the
/// revision can still converge afterwards.
pub fn ignored_status_codes(kind: CloudKind) -> &'static [&'static str] {
    match kind {
        CloudKind::Gcp => &["DISCONNECTED"],
        _ => &[],
    }
}

fn default_wait() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvStatusModel {
    /// Environment to watch
    pub name: String,

    /// Revision to wait for, usually the `spec_revision` of the environment
    pub spec_revision: i64,

    #[serde(default = "default_wait")]
    pub wait_for_applied_spec_revision: bool,

    /// Revision the environment has applied, filled in by the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_spec_revision: Option<i64>,
}

impl EnvStatusModel {
    pub fn new(name: impl Into<String>, spec_revision: i64) -> Self {
        Self {
            name: name.into(),
            spec_revision,
            wait_for_applied_spec_revision: true,
            applied_spec_revision: None,
        }
    }
}

/// Satisfied once the applied revision reaches `target`
pub struct SpecRevisionCheck {
    pub target: i64,
    pub ignored_codes: &'static [&'static str],
}

impl SpecRevisionCheck {
    pub fn for_kind(kind: CloudKind, target: i64) -> Self {
        Self {
            target,
            ignored_codes: ignored_status_codes(kind),
        }
    }
}

impl StatusCheck<EnvStatus> for SpecRevisionCheck {
    fn is_satisfied(&self, status: &EnvStatus) -> bool {
        status.applied_spec_revision >= self.target
    }

    fn fatal_issues(&self, status: &EnvStatus) -> Vec<RemoteIssue> {
        status
            .errors
            .iter()
            .filter(|e| !self.ignored_codes.contains(&e.code.as_str()))
            .map(|e| RemoteIssue::new(e.code.clone(), e.message.clone()))
            .collect()
    }
}

/// Status handler for one cloud
pub struct EnvStatusResource {
    client: Arc<dyn ControlPlane>,
    timeouts: Timeouts,
    kind: CloudKind,
    type_name: String,
}

impl EnvStatusResource {
    pub fn new(client: Arc<dyn ControlPlane>, timeouts: Timeouts, kind: CloudKind) -> Self {
        Self {
            client,
            timeouts,
            kind,
            type_name: format!("{}_env_status", kind.field_prefix()),
        }
    }

    pub fn kind(&self) -> CloudKind {
        self.kind
    }

    /// Wait for the target revision, or take a single reading when waiting
    /// is disabled.
    async fn converge(
        &self,
        cancel: &CancellationToken,
        mut model: EnvStatusModel,
    ) -> Result<EnvStatusModel> {
        if cancel.is_cancelled() {
            return Err(CloudError::Cancelled);
        }

        let status = if model.wait_for_applied_spec_revision {
            tracing::info!(
                "Waiting for {} environment {} to apply spec revision {}",
                self.kind,
                model.name,
                model.spec_revision
            );
            self.wait_for_revision(cancel, &model.name, model.spec_revision)
                .await?
        } else {
            self.client.get_env_status(self.kind, &model.name).await?
        };

        model.applied_spec_revision = Some(status.applied_spec_revision);
        Ok(model)
    }

    async fn wait_for_revision(
        &self,
        cancel: &CancellationToken,
        name: &str,
        target: i64,
    ) -> Result<EnvStatus> {
        let client = &self.client;
        let kind = self.kind;
        let check = SpecRevisionCheck::for_kind(kind, target);
        let options = self.timeouts.spec_revision_poll();

        let outcome = poll_until(cancel, &options, &check, || async move {
            client
                .get_env_status(kind, name)
                .await
                .map_err(CloudError::from)
        })
        .await?;

        match outcome {
            PollOutcome::Satisfied(status) => Ok(status),
            PollOutcome::Gone => Err(CloudError::NotFound(format!(
                "{kind} environment {name}"
            ))),
        }
    }
}

#[async_trait]
impl Resource for EnvStatusResource {
    type Model = EnvStatusModel;

    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn create(
        &self,
        cancel: &CancellationToken,
        planned: EnvStatusModel,
    ) -> Result<EnvStatusModel> {
        self.converge(cancel, planned).await
    }

    async fn read(
        &self,
        cancel: &CancellationToken,
        mut state: EnvStatusModel,
    ) -> Result<Option<EnvStatusModel>> {
        if cancel.is_cancelled() {
            return Err(CloudError::Cancelled);
        }

        match self.client.get_env_status(self.kind, &state.name).await {
            Ok(status) => {
                state.applied_spec_revision = Some(status.applied_spec_revision);
                Ok(Some(state))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(
        &self,
        cancel: &CancellationToken,
        planned: EnvStatusModel,
        _prior: &EnvStatusModel,
    ) -> Result<EnvStatusModel> {
        self.converge(cancel, planned).await
    }

    async fn delete(&self, _cancel: &CancellationToken, state: EnvStatusModel) -> Result<()> {
        tracing::debug!("Forgetting {} status of {}", self.kind, state.name);
        Ok(())
    }
}
