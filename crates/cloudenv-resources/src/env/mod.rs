//! Environment resources
//!
//! One model per cloud ([`AwsEnv`], [`AzureEnv`], [`GcpEnv`], [`HcloudEnv`],
//! [`K8sEnv`]) and a single generic lifecycle, [`EnvResource`], that drives
//! any of them against the control plane.

mod aws;
mod azure;
mod common;
mod gcp;
mod hcloud;
mod k8s;

pub use aws::AwsEnv;
pub use azure::AzureEnv;
pub use common::{Lifecycle, RESERVATIONS};
pub use gcp::GcpEnv;
pub use hcloud::HcloudEnv;
pub use k8s::K8sEnv;

use async_trait::async_trait;
use cloudenv_api::{CloudKind, ControlPlane, DeleteEnvRequest, EnvRecord, EnvSpec, EnvStatus};
use cloudenv_core::{
    CancellationToken, CloudError, PollOutcome, Resource, Result, StatusCheck, Timeouts,
    poll_until,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Conversion between a user-facing environment model and the wire spec
pub trait EnvModel: Clone + Send + Sync + 'static {
    /// Cloud this model targets
    const KIND: CloudKind;

    /// Resource type name, e.g. `aws_env`
    const TYPE_NAME: &'static str;

    fn name(&self) -> &str;

    fn lifecycle(&self) -> &Lifecycle;

    /// Last spec revision the control plane acknowledged
    fn spec_revision(&self) -> Option<i64>;

    fn set_spec_revision(&mut self, revision: i64);

    /// Reject configurations the control plane would refuse
    fn validate(&self) -> Result<()>;

    fn to_spec(&self) -> EnvSpec;

    /// Build a model from the remote spec.
    ///
    /// Every list field is reordered to follow `prior`, so a refresh does not
    /// show spurious diffs when the server returns the same items in another
    /// order. Name, lifecycle flags and revision are carried over from `prior`.
    fn from_spec(prior: &Self, spec: EnvSpec) -> Result<Self>;

    /// Empty model naming an existing environment, used for import
    fn imported(name: &str) -> Self;
}

/// Wrong spec variant for a model
pub(crate) fn unexpected_spec(expected: CloudKind, spec: &EnvSpec) -> CloudError {
    CloudError::ApiError(format!(
        "expected {} environment spec, got {}",
        expected,
        spec.kind()
    ))
}

/// Deletion is complete once the pending-delete flag clears, or once the
/// status lookup reports not-found.
struct DeletionCheck;

impl StatusCheck<EnvStatus> for DeletionCheck {
    fn is_satisfied(&self, status: &EnvStatus) -> bool {
        !status.pending_delete
    }

    fn awaiting_confirmation(&self, status: &EnvStatus) -> bool {
        status.pending_mfa
    }
}

/// Lifecycle handler for one kind of environment
pub struct EnvResource<M> {
    client: Arc<dyn ControlPlane>,
    timeouts: Timeouts,
    _model: PhantomData<fn() -> M>,
}

impl<M: EnvModel> EnvResource<M> {
    pub fn new(client: Arc<dyn ControlPlane>, timeouts: Timeouts) -> Self {
        Self {
            client,
            timeouts,
            _model: PhantomData,
        }
    }

    /// Adopt an existing environment by name.
    ///
    /// Returns `None` when the control plane does not know it.
    pub async fn import(&self, cancel: &CancellationToken, name: &str) -> Result<Option<M>> {
        tracing::info!("Importing {} environment {}", M::KIND, name);
        self.read(cancel, M::imported(name)).await
    }

    fn merge(prior: &M, record: EnvRecord) -> Result<M> {
        let mut model = M::from_spec(prior, record.spec)?;
        model.set_spec_revision(record.spec_revision);
        Ok(model)
    }

    async fn wait_for_deletion(
        &self,
        cancel: &CancellationToken,
        name: &str,
        pending_mfa: bool,
    ) -> Result<()> {
        let client = &self.client;
        let options = self.timeouts.deletion_poll(pending_mfa);

        let outcome = poll_until(cancel, &options, &DeletionCheck, || async move {
            client
                .get_env_status(M::KIND, name)
                .await
                .map_err(CloudError::from)
        })
        .await?;

        match outcome {
            PollOutcome::Gone => tracing::info!("{} environment {} deleted", M::KIND, name),
            PollOutcome::Satisfied(_) => {
                tracing::info!("{} environment {} no longer pending deletion", M::KIND, name)
            }
        }
        Ok(())
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CloudError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl<M: EnvModel> Resource for EnvResource<M> {
    type Model = M;

    fn type_name(&self) -> &str {
        M::TYPE_NAME
    }

    async fn create(&self, cancel: &CancellationToken, mut planned: M) -> Result<M> {
        ensure_active(cancel)?;
        planned.validate()?;

        let revision = self
            .client
            .create_env(planned.name(), &planned.to_spec())
            .await?;
        planned.set_spec_revision(revision);
        tracing::info!(
            kind = %M::KIND,
            name = planned.name(),
            revision,
            "Environment created"
        );

        Ok(planned)
    }

    async fn read(&self, cancel: &CancellationToken, state: M) -> Result<Option<M>> {
        ensure_active(cancel)?;

        match self.client.get_env(M::KIND, state.name()).await {
            Ok(record) => Self::merge(&state, record).map(Some),
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "{} environment {} no longer exists, dropping it from state",
                    M::KIND,
                    state.name()
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, cancel: &CancellationToken, mut planned: M, prior: &M) -> Result<M> {
        ensure_active(cancel)?;

        if planned.name() != prior.name() {
            return Err(CloudError::invalid_config(format!(
                "environment name cannot change ({} -> {}); create a new environment instead",
                prior.name(),
                planned.name()
            )));
        }
        planned.validate()?;

        let revision = self
            .client
            .update_env(planned.name(), &planned.to_spec())
            .await?;
        planned.set_spec_revision(revision);
        tracing::info!(
            kind = %M::KIND,
            name = planned.name(),
            from = ?prior.spec_revision(),
            revision,
            "Environment updated"
        );

        Ok(planned)
    }

    async fn delete(&self, cancel: &CancellationToken, state: M) -> Result<()> {
        ensure_active(cancel)?;

        let lifecycle = state.lifecycle();
        let request = DeleteEnvRequest {
            name: state.name().to_string(),
            force: lifecycle.force_destroy,
            force_destroy_clusters: lifecycle.force_destroy_clusters,
            skip_deprovision: lifecycle.skip_deprovision_on_destroy,
        };

        let response = match self.client.delete_env(M::KIND, &request).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} environment {} already gone", M::KIND, state.name());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if lifecycle.skip_deprovision_on_destroy {
            tracing::info!(
                "{} environment {} removed without deprovisioning",
                M::KIND,
                state.name()
            );
            return Ok(());
        }

        if response.pending_mfa {
            tracing::warn!(
                "Deletion of {} environment {} is waiting for MFA approval",
                M::KIND,
                state.name()
            );
        }

        self.wait_for_deletion(cancel, state.name(), response.pending_mfa)
            .await
    }
}
