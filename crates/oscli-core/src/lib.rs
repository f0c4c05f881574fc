//! oscli-core: Core library for the OpenSearch administration CLI
//!
//! This library holds the configuration, credential and settings logic the
//! `oscli` binary is built on. It performs no network calls; callers take a
//! resolved context and talk to the cluster themselves.
//!
//! # Main Entry Points
//!
//! - [`config`] - Registry of clusters, users and contexts and its YAML store
//! - [`creds`] - Keyring and Ansible-Vault credential resolution
//! - [`context`] - Resolve a context into an address and credentials
//! - [`settings`] - Remote-cluster settings patches
//! - [`wildcard`] - `*` patterns for bulk target selection

pub mod config;
pub mod context;
pub mod creds;
pub mod errors;
pub mod events;
pub mod logging;
pub mod settings;
pub mod wildcard;

// Re-export commonly used types at crate root for convenience
pub use config::{ConfigStore, Registry};
pub use context::{ContextResolver, ResolvedContext};
pub use creds::{CredentialProvider, Credentials, PasswordSource};
pub use errors::{OscliError, OscliResult};
pub use settings::{ClusterSettings, RemoteClusterOpts, RemotePatch};
pub use wildcard::Pattern;

// Re-export logging initialization
pub use logging::init_logging;
