use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::SettingsError;

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// The two dynamic tiers of a cluster settings document, as returned by
/// `GET _cluster/settings`. Missing tiers read as empty objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSettings {
    #[serde(default = "empty_object")]
    pub persistent: Value,
    #[serde(default = "empty_object")]
    pub transient: Value,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            persistent: empty_object(),
            transient: empty_object(),
        }
    }
}

impl ClusterSettings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(text).map_err(|e| SettingsError::InvalidDocument {
            message: e.to_string(),
        })
    }

    pub fn tier(&self, tier: SettingsTier) -> &Value {
        match tier {
            SettingsTier::Transient => &self.transient,
            SettingsTier::Persistent | SettingsTier::Default => &self.persistent,
        }
    }
}

/// Settings tier a remote is written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsTier {
    #[default]
    Persistent,
    Transient,
    Default,
}

impl SettingsTier {
    pub const VALUES: &'static [&'static str] = &["persistent", "transient", "default"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsTier::Persistent => "persistent",
            SettingsTier::Transient => "transient",
            SettingsTier::Default => "default",
        }
    }
}

impl fmt::Display for SettingsTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsTier {
    type Err = SettingsError;

    /// An empty string selects the persistent tier.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" | "persistent" => Ok(SettingsTier::Persistent),
            "transient" => Ok(SettingsTier::Transient),
            "default" => Ok(SettingsTier::Default),
            other => Err(SettingsError::UnknownValue {
                kind: "settings tier",
                value: other.to_string(),
                expected: "persistent, transient, default",
            }),
        }
    }
}

/// Connection mode of a remote cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteMode {
    #[default]
    Proxy,
    Sniff,
}

impl RemoteMode {
    pub const VALUES: &'static [&'static str] = &["proxy", "sniff"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteMode::Proxy => "proxy",
            RemoteMode::Sniff => "sniff",
        }
    }
}

impl fmt::Display for RemoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteMode {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" | "proxy" => Ok(RemoteMode::Proxy),
            "sniff" => Ok(RemoteMode::Sniff),
            other => Err(SettingsError::UnknownValue {
                kind: "remote mode",
                value: other.to_string(),
                expected: "proxy, sniff",
            }),
        }
    }
}
