//! Control-plane API client for cloudenv
//!
//! The control plane exposes a GraphQL endpoint. This crate wraps it behind
//! the [`ControlPlane`] trait so resource handlers can be tested without a
//! network.
//!
//! # Example
//!
//! ```ignore
//! use cloudenv_api::{ApiConfig, CloudKind, ControlPlane, GraphqlClient};
//!
//! let client = GraphqlClient::new(ApiConfig::new(url, token))?;
//! let status = client.get_env_status(CloudKind::Aws, "prod").await?;
//! println!("applied revision {}", status.applied_spec_revision);
//! ```

pub mod client;
pub mod control_plane;
pub mod error;
pub mod messages;
pub mod queries;
pub mod types;

pub use client::{ApiConfig, GraphqlClient};
pub use control_plane::ControlPlane;
pub use error::{ApiError, GraphqlErrorInfo, Result};
pub use messages::friendly_message;
pub use types::*;
