//! Patches adding and removing `cluster.remote.<alias>` entries.
//!
//! A dynamic setting is unset by writing an explicit `null` to it; leaving
//! the key out of an update does nothing. Removal therefore mirrors the
//! existing alias subtree with every leaf replaced by `null`, and touches
//! nothing outside of it.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::errors::SettingsError;
use super::types::{ClusterSettings, RemoteMode, SettingsTier};

/// Settings update removing a remote alias. Only tiers that held the alias
/// are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RemotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transient: Option<Value>,
}

impl RemotePatch {
    /// True when neither tier held the alias.
    pub fn is_empty(&self) -> bool {
        self.persistent.is_none() && self.transient.is_none()
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        if let Some(persistent) = &self.persistent {
            body.insert("persistent".to_string(), persistent.clone());
        }
        if let Some(transient) = &self.transient {
            body.insert("transient".to_string(), transient.clone());
        }
        Value::Object(body)
    }
}

/// Walk `cluster -> remote -> <alias>` in one tier. A missing or non-object
/// segment means the alias is absent.
fn find_remote<'a>(tier: &'a Value, alias: &str) -> Option<&'a Map<String, Value>> {
    tier.get("cluster")?
        .get("remote")?
        .as_object()?
        .get(alias)?
        .as_object()
}

/// Same-shaped copy of `settings` with each leaf set to `null`. Nested
/// objects are followed; arrays count as leaves. `None` when nothing is left
/// to unset.
fn null_leaves(settings: &Map<String, Value>) -> Option<Map<String, Value>> {
    let nulled: Map<String, Value> = settings
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Object(nested) => null_leaves(nested).map(|n| (key.clone(), Value::Object(n))),
            _ => Some((key.clone(), Value::Null)),
        })
        .collect();
    (!nulled.is_empty()).then_some(nulled)
}

fn remote_document(alias: &str, body: Value) -> Value {
    json!({ "cluster": { "remote": { alias: body } } })
}

fn tier_patch(tier: &Value, alias: &str) -> Option<Value> {
    let remote = find_remote(tier, alias)?;
    let nulled = null_leaves(remote)?;
    Some(remote_document(alias, Value::Object(nulled)))
}

/// Compute the patch that removes `alias` from both settings tiers.
///
/// Each tier is examined on its own. An empty patch means the alias was not
/// found anywhere.
pub fn delete_remote(alias: &str, settings: &ClusterSettings) -> RemotePatch {
    RemotePatch {
        persistent: tier_patch(&settings.persistent, alias),
        transient: tier_patch(&settings.transient, alias),
    }
}

/// Request body removing `alias`, or [`SettingsError::RemoteNotFound`] when
/// there is nothing to remove.
pub fn delete_remote_body(alias: &str, settings: &ClusterSettings) -> Result<Value, SettingsError> {
    let patch = delete_remote(alias, settings);
    if patch.is_empty() {
        return Err(SettingsError::RemoteNotFound {
            alias: alias.to_string(),
        });
    }
    tracing::info!(
        event = "core.settings.remote_patch_built",
        alias = alias,
        persistent = patch.persistent.is_some(),
        transient = patch.transient.is_some()
    );
    Ok(patch.to_value())
}

/// The persistent `cluster.remote` subtree, for display.
pub fn remote_settings(settings: &ClusterSettings) -> Option<&Value> {
    settings.persistent.get("cluster")?.get("remote")
}

/// Options for registering a remote cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClusterOpts {
    pub tier: SettingsTier,
    pub mode: RemoteMode,
    /// Alias the remote is registered under.
    pub alias: String,
    /// Proxy address all remote connections are routed through.
    pub address: String,
}

impl RemoteClusterOpts {
    pub fn new(alias: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            tier: SettingsTier::default(),
            mode: RemoteMode::default(),
            alias: alias.into(),
            address: address.into(),
        }
    }

    pub fn create_remote_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            self.tier.as_str().to_string(),
            remote_document(
                &self.alias,
                json!({
                    "mode": self.mode.as_str(),
                    "proxy_address": self.address,
                }),
            ),
        );
        Value::Object(body)
    }
}
