//! cloudenv core
//!
//! Building blocks shared by every cloudenv resource:
//!
//! - [`reorder`]: merge server-returned lists back into the order the user
//!   declared them, keeping server-only entries at the end
//! - [`poll_until`]: bounded status polling with cancellation, an overall
//!   timeout and an MFA confirmation timeout
//! - [`Resource`]: the create/read/update/delete lifecycle every resource
//!   handler implements
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               cloudenv-resources                 │
//! │   aws / azure / gcp / hcloud / k8s environments  │
//! │   environment status, secret                     │
//! └───────┬──────────────────────────┬──────────────┘
//!         │                          │
//! ┌───────▼───────────┐    ┌─────────▼──────────────┐
//! │   cloudenv-core   │    │      cloudenv-api      │
//! │ reorder, poll,    │◄───│ GraphQL control plane  │
//! │ Resource, errors  │    │ client + wire types    │
//! └───────────────────┘    └────────────────────────┘
//! ```

pub mod error;
pub mod poll;
pub mod reorder;
pub mod resource;

// Re-exports
pub use error::{CloudError, RemoteIssue, Result, WaitKind};
pub use poll::{PollOptions, PollOutcome, StatusCheck, poll_until};
pub use reorder::{reorder, reorder_names};
pub use resource::{Resource, Timeouts};
pub use tokio_util::sync::CancellationToken;
