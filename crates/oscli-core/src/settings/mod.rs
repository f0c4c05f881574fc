//! Cluster settings documents and the remote-cluster patches built from them.

pub mod errors;
pub mod remote;
pub mod types;

pub use errors::SettingsError;
pub use remote::{
    RemoteClusterOpts, RemotePatch, delete_remote, delete_remote_body, remote_settings,
};
pub use types::{ClusterSettings, RemoteMode, SettingsTier};
