use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::creds::types::CredentialCache;

pub const API_VERSION_V1: &str = "v1";
pub const DEFAULT_SERVER_TIMEOUT_SECONDS: i64 = 60;

/// The persisted registry of clusters, users and the contexts binding them.
///
/// Context references are soft: a context may point at a cluster or user that
/// does not exist. Such dangling references are reported by [`Registry::validate`]
/// and by the resolver, never rejected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<CliParams>,

    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,

    #[serde(default)]
    pub users: Vec<UserConfig>,

    #[serde(default)]
    pub contexts: Vec<ContextConfig>,

    /// Name of the active context. Empty when none is selected.
    #[serde(default)]
    pub current: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliParams {
    #[serde(
        rename = "serverTimeoutSeconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub server_timeout_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
    #[serde(default)]
    pub params: ClusterParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Base URL of the cluster, e.g. `https://localhost:9200`.
    #[serde(default)]
    pub server: String,
    /// Whether the server's TLS certificate is verified.
    #[serde(default)]
    pub tls: bool,
}

impl ClusterConfig {
    pub fn new(name: impl Into<String>, server: impl Into<String>, tls: bool) -> Self {
        Self {
            name: name.into(),
            params: ClusterParams {
                server: server.into(),
                tls,
            },
        }
    }
}

/// A named user and where its credentials come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,

    #[serde(default)]
    pub user: CredentialSource,

    /// Resolved credentials for the lifetime of this process. Never persisted.
    #[serde(skip)]
    pub cache: CredentialCache,
}

impl UserConfig {
    pub fn new(name: impl Into<String>, user: CredentialSource) -> Self {
        Self {
            name: name.into(),
            user,
            cache: CredentialCache::default(),
        }
    }

    pub fn with_token(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(name, CredentialSource::Token { id: token.into() })
    }

    pub fn with_vault(name: impl Into<String>, vault: VaultConfig) -> Self {
        Self::new(name, CredentialSource::Vault(vault))
    }

    /// Keyring token of this user, if it is keyring backed.
    pub fn token(&self) -> Option<&str> {
        match &self.user {
            CredentialSource::Token { id } => Some(id),
            _ => None,
        }
    }
}

/// The credential backend of a user, chosen once when the entry is parsed.
///
/// Persisted as a `token` or `vault` key under `user`. When both keys are
/// present the token wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserEntry", into = "UserEntry")]
pub enum CredentialSource {
    /// Reference to an OS keyring entry, `keyring:::<id>`.
    Token { id: String },
    /// Ansible-Vault encrypted document holding the credentials.
    Vault(VaultConfig),
    #[default]
    None,
}

impl CredentialSource {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::Token { .. } => "keyring",
            CredentialSource::Vault(_) => "vault",
            CredentialSource::None => "none",
        }
    }
}

/// On-disk shape of [`CredentialSource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vault: Option<VaultConfig>,
}

impl From<UserEntry> for CredentialSource {
    fn from(entry: UserEntry) -> Self {
        match (entry.token.filter(|t| !t.is_empty()), entry.vault) {
            (Some(id), _) => CredentialSource::Token { id },
            (None, Some(vault)) => CredentialSource::Vault(vault),
            (None, None) => CredentialSource::None,
        }
    }
}

impl From<CredentialSource> for UserEntry {
    fn from(source: CredentialSource) -> Self {
        match source {
            CredentialSource::Token { id } => UserEntry {
                token: Some(id),
                vault: None,
            },
            CredentialSource::Vault(vault) => UserEntry {
                token: None,
                vault: Some(vault),
            },
            CredentialSource::None => UserEntry::default(),
        }
    }
}

/// Location of a vault and the key names of the username and password inside
/// the decrypted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Path to the vault file. `~/` expands to the home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Vault text embedded in the configuration, used when there is no file.
    #[serde(
        default,
        alias = "vaultString",
        skip_serializing_if = "Option::is_none"
    )]
    pub vault_string: Option<String>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    pub name: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
}

impl ContextConfig {
    pub fn new(
        name: impl Into<String>,
        cluster: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
            user: user.into(),
        }
    }
}

impl Registry {
    /// A fresh registry with nothing configured.
    pub fn skeleton() -> Self {
        Self {
            api_version: API_VERSION_V1.to_string(),
            ..Default::default()
        }
    }

    /// A populated registry used as a starting template.
    pub fn example() -> Self {
        Self {
            api_version: API_VERSION_V1.to_string(),
            params: Some(CliParams {
                server_timeout_seconds: Some(DEFAULT_SERVER_TIMEOUT_SECONDS),
            }),
            clusters: vec![ClusterConfig::new(
                "example-cluster",
                "http://localhost:9200",
                false,
            )],
            users: vec![UserConfig::with_token(
                "example-user",
                "keyring:::replace-me (use `oscli context add` to store real credentials)",
            )],
            contexts: vec![ContextConfig::new(
                "example-context",
                "example-cluster",
                "example-user",
            )],
            current: "example-context".to_string(),
        }
    }

    /// Network timeout for cluster calls. Falls back to 60s when unset or
    /// not positive.
    pub fn server_timeout(&self) -> Duration {
        let seconds = self
            .params
            .as_ref()
            .and_then(|p| p.server_timeout_seconds)
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_SERVER_TIMEOUT_SECONDS);
        Duration::from_secs(seconds.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_timeout_defaults() {
        let mut registry = Registry::skeleton();
        assert_eq!(registry.server_timeout(), Duration::from_secs(60));

        registry.params = Some(CliParams {
            server_timeout_seconds: Some(0),
        });
        assert_eq!(registry.server_timeout(), Duration::from_secs(60));

        registry.params = Some(CliParams {
            server_timeout_seconds: Some(-5),
        });
        assert_eq!(registry.server_timeout(), Duration::from_secs(60));

        registry.params = Some(CliParams {
            server_timeout_seconds: Some(15),
        });
        assert_eq!(registry.server_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_token_wins_over_vault() {
        let yaml = "\
name: u
user:
  token: keyring:::abc
  vault:
    file: ~/creds.vault
    username: os_user
    password: os_password
";
        let user: UserConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(user.token(), Some("keyring:::abc"));
    }

    #[test]
    fn test_vault_string_alias() {
        let yaml = "\
name: u
user:
  vault:
    vaultString: inline
    username: os_user
    password: os_password
";
        let user: UserConfig = serde_yaml::from_str(yaml).unwrap();
        match user.user {
            CredentialSource::Vault(vault) => {
                assert_eq!(vault.vault_string.as_deref(), Some("inline"));
                assert!(vault.file.is_none());
            }
            other => panic!("expected vault source, got {:?}", other),
        }
    }

    #[test]
    fn test_user_without_source() {
        let user: UserConfig = serde_yaml::from_str("name: u\nuser: {}\n").unwrap();
        assert_eq!(user.user, CredentialSource::None);
        let user: UserConfig = serde_yaml::from_str("name: u\n").unwrap();
        assert_eq!(user.user.kind(), "none");
    }

    #[test]
    fn test_cache_is_not_serialized() {
        let user = UserConfig::with_token("u", "keyring:::abc");
        user.cache
            .fill(crate::creds::Credentials::new("admin", "secret"));
        let yaml = serde_yaml::to_string(&user).unwrap();
        assert!(!yaml.contains("secret"));
        assert!(!yaml.contains("cache"));
        assert_eq!(yaml, "name: u\nuser:\n  token: keyring:::abc\n");
    }

    #[test]
    fn test_example_is_consistent() {
        let example = Registry::example();
        assert_eq!(example.current, "example-context");
        assert!(example.validate().is_empty());
    }
}
