//! cloudenv resources
//!
//! Lifecycle handlers for everything cloudenv manages on the control plane:
//!
//! - [`env`]: AWS, Azure, GCP, Hetzner Cloud and Kubernetes environments
//! - [`status`]: waiting for an environment to apply a spec revision
//! - [`secret`]: values encrypted with an environment certificate
//!
//! [`Provider`] wires them to a shared control-plane client.
//!
//! # Example
//!
//! ```ignore
//! use cloudenv_config::Settings;
//! use cloudenv_resources::{CancellationToken, EnvStatusModel, Provider, Resource};
//!
//! let provider = Provider::from_settings(&Settings::load()?)?;
//! let cancel = CancellationToken::new();
//!
//! let env = provider.aws_env().create(&cancel, planned).await?;
//! let status = EnvStatusModel::new(&env.name, env.spec_revision.unwrap_or_default());
//! provider.aws_env_status().create(&cancel, status).await?;
//! ```

pub mod env;
pub mod provider;
pub mod secret;
pub mod status;

pub use cloudenv_core::{CancellationToken, CloudError, Resource, Result, Timeouts};
pub use env::{AwsEnv, AzureEnv, EnvModel, EnvResource, GcpEnv, HcloudEnv, K8sEnv, Lifecycle};
pub use provider::Provider;
pub use secret::{Secret, SecretResource};
pub use status::{EnvStatusModel, EnvStatusResource, SpecRevisionCheck};
