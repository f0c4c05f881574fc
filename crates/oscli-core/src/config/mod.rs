//! # Configuration registry
//!
//! A kubeconfig-style YAML document listing clusters, users and the contexts
//! that bind one cluster to one user. One context is marked `current`.
//!
//! ```yaml
//! apiVersion: v1
//! params:
//!   serverTimeoutSeconds: 60
//! clusters:
//! - name: c1
//!   params:
//!     server: https://localhost:9200
//!     tls: false
//! users:
//! - name: u1
//!   user:
//!     token: keyring:::0190...
//! contexts:
//! - name: ctx1
//!   cluster: c1
//!   user: u1
//! current: ctx1
//! ```
//!
//! The file lives at `~/.oscli/config` unless `--config` or `OSCLI_CONFIG`
//! point elsewhere.

pub mod errors;
pub mod paths;
pub mod registry;
pub mod store;
pub mod types;

pub use errors::ConfigError;
pub use paths::{CONFIG_ENV, default_config_path, expand_home};
pub use registry::{
    ConfigIssue, ContextInfo, Pruned, default_context_name, derive_cluster_name,
};
pub use store::ConfigStore;
pub use types::{
    ClusterConfig, ClusterParams, CliParams, ContextConfig, CredentialSource, Registry,
    UserConfig, VaultConfig,
};
