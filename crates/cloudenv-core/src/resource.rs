//! Resource lifecycle trait definition

use crate::error::Result;
use crate::poll::PollOptions;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Lifecycle handler for one resource type
///
/// Every managed object (environments, environment statuses, secrets)
/// implements this trait so callers can drive create/read/update/delete the
/// same way regardless of the cloud behind it.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Configuration/state model handled by this resource
    type Model: Send + Sync;

    /// Returns the resource type name (e.g., "aws_env", "secret")
    fn type_name(&self) -> &str;

    /// Create the remote object and return the resulting state
    async fn create(&self, cancel: &CancellationToken, planned: Self::Model)
    -> Result<Self::Model>;

    /// Refresh state from the remote side.
    ///
    /// `Ok(None)` means the object is gone and should be dropped from state.
    async fn read(
        &self,
        cancel: &CancellationToken,
        state: Self::Model,
    ) -> Result<Option<Self::Model>>;

    /// Apply `planned` over `prior` and return the resulting state
    async fn update(
        &self,
        cancel: &CancellationToken,
        planned: Self::Model,
        prior: &Self::Model,
    ) -> Result<Self::Model>;

    /// Delete the remote object
    async fn delete(&self, cancel: &CancellationToken, state: Self::Model) -> Result<()>;
}

/// Wait budgets shared by all resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Maximum time to wait for an environment to disappear
    pub deletion: Duration,

    /// Maximum time to wait for a pending MFA approval during deletion
    pub mfa_confirmation: Duration,

    /// Maximum time to wait for a spec revision to be applied
    pub spec_revision: Duration,

    /// Delay between status fetches
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            deletion: Duration::from_secs(60 * 60),
            mfa_confirmation: Duration::from_secs(15 * 60),
            spec_revision: Duration::from_secs(60 * 60),
            poll_interval: Duration::from_secs(30),
        }
    }
}

impl Timeouts {
    /// Poll options for a delete whose request reported `pending_mfa`.
    pub fn deletion_poll(&self, pending_mfa: bool) -> PollOptions {
        PollOptions::deletion(self.deletion, self.poll_interval)
            .with_confirmation(self.mfa_confirmation, pending_mfa)
    }

    pub fn spec_revision_poll(&self) -> PollOptions {
        PollOptions::spec_revision(self.spec_revision, self.poll_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaitKind;

    #[test]
    fn test_deletion_poll_arms_confirmation() {
        let timeouts = Timeouts::default();
        let opts = timeouts.deletion_poll(true);

        assert_eq!(opts.kind, WaitKind::Deletion);
        assert_eq!(opts.confirmation_timeout, Some(Duration::from_secs(900)));
        assert!(opts.pending_confirmation);
    }

    #[test]
    fn test_spec_revision_poll_has_no_confirmation() {
        let opts = Timeouts::default().spec_revision_poll();

        assert_eq!(opts.kind, WaitKind::SpecRevision);
        assert_eq!(opts.confirmation_timeout, None);
        assert_eq!(opts.interval, Duration::from_secs(30));
    }
}
