//! Lookups and structural mutations over a [`Registry`].
//!
//! Mutations keep names unique within each list. Anything read from disk may
//! still violate that; [`Registry::validate`] reports it.

use std::collections::HashSet;
use std::fmt;

use super::errors::ConfigError;
use super::types::{ClusterConfig, ContextConfig, Registry, UserConfig};

/// A consistency problem found in a loaded registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    DuplicateCluster(String),
    DuplicateUser(String),
    DuplicateContext(String),
    DanglingCluster { context: String, cluster: String },
    DanglingUser { context: String, user: String },
    DanglingCurrent(String),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::DuplicateCluster(name) => {
                write!(f, "cluster '{}' is defined more than once", name)
            }
            ConfigIssue::DuplicateUser(name) => {
                write!(f, "user '{}' is defined more than once", name)
            }
            ConfigIssue::DuplicateContext(name) => {
                write!(f, "context '{}' is defined more than once", name)
            }
            ConfigIssue::DanglingCluster { context, cluster } => write!(
                f,
                "context '{}' references unknown cluster '{}'",
                context, cluster
            ),
            ConfigIssue::DanglingUser { context, user } => write!(
                f,
                "context '{}' references unknown user '{}'",
                context, user
            ),
            ConfigIssue::DanglingCurrent(name) => {
                write!(f, "current context '{}' does not exist", name)
            }
        }
    }
}

/// Found/missing status of a context and the entries it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo<'a> {
    pub name: String,
    pub context: Option<&'a ContextConfig>,
    pub cluster: Option<&'a ClusterConfig>,
    pub user: Option<&'a UserConfig>,
    pub is_current: bool,
}

impl ContextInfo<'_> {
    /// Context, cluster and user all exist.
    pub fn is_complete(&self) -> bool {
        self.context.is_some() && self.cluster.is_some() && self.user.is_some()
    }

    /// Cluster name as referenced by the context, whether or not it exists.
    pub fn cluster_ref(&self) -> Option<&str> {
        self.context.map(|c| c.cluster.as_str())
    }

    /// User name as referenced by the context, whether or not it exists.
    pub fn user_ref(&self) -> Option<&str> {
        self.context.map(|c| c.user.as_str())
    }
}

/// Clusters and users dropped by [`Registry::prune_unreferenced`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    pub clusters: Vec<ClusterConfig>,
    pub users: Vec<UserConfig>,
}

impl Pruned {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.users.is_empty()
    }
}

/// Cluster name derived from its server URL when the user does not pick one.
pub fn derive_cluster_name(server: &str) -> String {
    server.replace("://", "::").replace(':', "::")
}

/// Context name used when the user does not pick one.
pub fn default_context_name(user: &str, cluster: &str) -> String {
    format!("{}@{}", user, cluster)
}

impl Registry {
    pub fn cluster(&self, name: &str) -> Option<&ClusterConfig> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn context(&self, name: &str) -> Option<&ContextConfig> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn has_cluster(&self, name: &str) -> bool {
        self.cluster(name).is_some()
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.user(name).is_some()
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.context(name).is_some()
    }

    /// Append a cluster, a user and a context binding them.
    ///
    /// Nothing is added if any of the three names is already taken.
    pub fn push(
        &mut self,
        cluster: ClusterConfig,
        user: UserConfig,
        context: ContextConfig,
    ) -> Result<(), ConfigError> {
        if self.has_cluster(&cluster.name) {
            return Err(ConfigError::AlreadyExists {
                kind: "cluster",
                name: cluster.name,
            });
        }
        if self.has_user(&user.name) {
            return Err(ConfigError::AlreadyExists {
                kind: "user",
                name: user.name,
            });
        }
        if self.has_context(&context.name) {
            return Err(ConfigError::AlreadyExists {
                kind: "context",
                name: context.name,
            });
        }

        self.clusters.push(cluster);
        self.users.push(user);
        self.contexts.push(context);
        Ok(())
    }

    pub fn switch_context(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.has_context(name) {
            return Err(ConfigError::ContextNotFound {
                name: name.to_string(),
            });
        }
        self.current = name.to_string();
        Ok(())
    }

    /// The context named by `current`, if it exists.
    pub fn active_context(&self) -> Option<&ContextConfig> {
        if self.current.is_empty() {
            return None;
        }
        self.context(&self.current)
    }

    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    /// Remove a context. Clears `current` when it pointed at the removed one.
    pub fn remove_context(&mut self, name: &str) -> Result<ContextConfig, ConfigError> {
        let index = self
            .contexts
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ConfigError::ContextNotFound {
                name: name.to_string(),
            })?;
        let removed = self.contexts.remove(index);
        if self.current == removed.name {
            self.current.clear();
        }
        Ok(removed)
    }

    /// Drop the clusters and users referenced by `removed` contexts that no
    /// remaining context references.
    ///
    /// Entries that were already unreferenced before the removal are left
    /// alone. The dropped entries are returned so their keyring secrets can
    /// be cleaned up by the caller.
    pub fn prune_unreferenced(&mut self, removed: &[ContextConfig]) -> Pruned {
        let clusters_in_use: HashSet<&str> =
            self.contexts.iter().map(|c| c.cluster.as_str()).collect();
        let users_in_use: HashSet<&str> = self.contexts.iter().map(|c| c.user.as_str()).collect();

        let clusters_to_drop: HashSet<String> = removed
            .iter()
            .map(|c| c.cluster.as_str())
            .filter(|name| !clusters_in_use.contains(name))
            .map(str::to_string)
            .collect();
        let users_to_drop: HashSet<String> = removed
            .iter()
            .map(|c| c.user.as_str())
            .filter(|name| !users_in_use.contains(name))
            .map(str::to_string)
            .collect();

        let (clusters, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.clusters)
            .into_iter()
            .partition(|c| clusters_to_drop.contains(c.name.as_str()));
        self.clusters = kept;

        let (users, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.users)
            .into_iter()
            .partition(|u| users_to_drop.contains(u.name.as_str()));
        self.users = kept;

        Pruned { clusters, users }
    }

    /// Report every consistency problem. An empty list means the registry
    /// is consistent.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for cluster in &self.clusters {
            if !seen.insert(cluster.name.as_str()) {
                issues.push(ConfigIssue::DuplicateCluster(cluster.name.clone()));
            }
        }
        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.name.as_str()) {
                issues.push(ConfigIssue::DuplicateUser(user.name.clone()));
            }
        }
        let mut seen = HashSet::new();
        for context in &self.contexts {
            if !seen.insert(context.name.as_str()) {
                issues.push(ConfigIssue::DuplicateContext(context.name.clone()));
            }
            if !self.has_cluster(&context.cluster) {
                issues.push(ConfigIssue::DanglingCluster {
                    context: context.name.clone(),
                    cluster: context.cluster.clone(),
                });
            }
            if !self.has_user(&context.user) {
                issues.push(ConfigIssue::DanglingUser {
                    context: context.name.clone(),
                    user: context.user.clone(),
                });
            }
        }

        if !self.current.is_empty() && !self.has_context(&self.current) {
            issues.push(ConfigIssue::DanglingCurrent(self.current.clone()));
        }

        issues
    }

    pub fn context_info(&self, name: &str) -> ContextInfo<'_> {
        let context = self.context(name);
        ContextInfo {
            name: name.to_string(),
            context,
            cluster: context.and_then(|c| self.cluster(&c.cluster)),
            user: context.and_then(|c| self.user(&c.user)),
            is_current: !name.is_empty() && self.current == name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::skeleton();
        registry
            .push(
                ClusterConfig::new("c1", "https://localhost:9200", false),
                UserConfig::with_token("u1", "keyring:::one"),
                ContextConfig::new("ctx1", "c1", "u1"),
            )
            .unwrap();
        registry
            .push(
                ClusterConfig::new("c2", "https://remote:9200", true),
                UserConfig::with_token("u2", "keyring:::two"),
                ContextConfig::new("ctx2", "c2", "u2"),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_push_rejects_duplicates_atomically() {
        let mut registry = registry();
        let result = registry.push(
            ClusterConfig::new("c3", "http://x:9200", false),
            UserConfig::with_token("u1", "keyring:::dup"),
            ContextConfig::new("ctx3", "c3", "u1"),
        );
        assert!(matches!(
            result,
            Err(ConfigError::AlreadyExists { kind: "user", .. })
        ));
        assert!(!registry.has_cluster("c3"));
        assert!(!registry.has_context("ctx3"));
    }

    #[test]
    fn test_switch_context() {
        let mut registry = registry();
        registry.switch_context("ctx2").unwrap();
        assert_eq!(registry.active_context().map(|c| c.name.as_str()), Some("ctx2"));

        let result = registry.switch_context("nope");
        assert!(matches!(result, Err(ConfigError::ContextNotFound { .. })));
        assert_eq!(registry.current, "ctx2");
    }

    #[test]
    fn test_active_context_dangling_current() {
        let mut registry = registry();
        assert!(registry.active_context().is_none());
        registry.current = "ghost".to_string();
        assert!(registry.active_context().is_none());
        assert_eq!(
            registry.validate(),
            vec![ConfigIssue::DanglingCurrent("ghost".to_string())]
        );
    }

    #[test]
    fn test_remove_current_context_clears_current() {
        let mut registry = registry();
        registry.switch_context("ctx1").unwrap();
        let removed = registry.remove_context("ctx1").unwrap();
        assert_eq!(removed.cluster, "c1");
        assert!(registry.current.is_empty());
        assert_eq!(registry.context_names(), vec!["ctx2"]);
    }

    #[test]
    fn test_prune_unreferenced() {
        let mut registry = registry();
        let removed = registry.remove_context("ctx1").unwrap();
        let pruned = registry.prune_unreferenced(std::slice::from_ref(&removed));
        assert_eq!(pruned.clusters.len(), 1);
        assert_eq!(pruned.users[0].token(), Some("keyring:::one"));
        assert!(registry.has_cluster("c2"));
        assert!(!registry.has_user("u1"));

        assert!(registry.prune_unreferenced(&[removed]).is_empty());
    }

    #[test]
    fn test_prune_keeps_entries_unrelated_to_the_removal() {
        let mut registry = registry();
        registry
            .clusters
            .push(ClusterConfig::new("standalone", "http://spare:9200", false));
        registry
            .users
            .push(UserConfig::with_token("spare", "keyring:::spare"));

        let removed = registry.remove_context("ctx1").unwrap();
        let pruned = registry.prune_unreferenced(&[removed]);

        let users: Vec<&str> = pruned.users.iter().map(|u| u.name.as_str()).collect();
        let clusters: Vec<&str> = pruned.clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(users, vec!["u1"]);
        assert_eq!(clusters, vec!["c1"]);
        assert!(registry.has_user("spare"));
        assert!(registry.has_cluster("standalone"));
    }

    #[test]
    fn test_prune_keeps_entries_still_in_use() {
        let mut registry = registry();
        registry.contexts.push(ContextConfig::new("ctx3", "c1", "u1"));

        let removed = registry.remove_context("ctx1").unwrap();
        assert!(registry.prune_unreferenced(&[removed]).is_empty());
        assert!(registry.has_cluster("c1"));
        assert!(registry.has_user("u1"));
    }

    #[test]
    fn test_validate_reports_dangling_and_duplicates() {
        let mut registry = registry();
        registry.contexts.push(ContextConfig::new("ctx3", "missing", "u1"));
        registry
            .clusters
            .push(ClusterConfig::new("c1", "http://dup:9200", false));

        let issues = registry.validate();
        assert!(issues.contains(&ConfigIssue::DuplicateCluster("c1".to_string())));
        assert!(issues.contains(&ConfigIssue::DanglingCluster {
            context: "ctx3".to_string(),
            cluster: "missing".to_string(),
        }));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_issue_messages() {
        assert_eq!(
            ConfigIssue::DuplicateCluster("c1".to_string()).to_string(),
            "cluster 'c1' is defined more than once"
        );
        assert_eq!(
            ConfigIssue::DuplicateUser("u1".to_string()).to_string(),
            "user 'u1' is defined more than once"
        );
    }

    #[test]
    fn test_context_info_marks_missing_entries() {
        let mut registry = registry();
        registry.contexts.push(ContextConfig::new("broken", "c1", "ghost"));
        registry.current = "broken".to_string();

        let info = registry.context_info("broken");
        assert!(info.cluster.is_some());
        assert!(info.user.is_none());
        assert_eq!(info.user_ref(), Some("ghost"));
        assert!(info.is_current);
        assert!(!info.is_complete());

        let missing = registry.context_info("nope");
        assert!(missing.context.is_none());
        assert!(missing.cluster_ref().is_none());
    }

    #[test]
    fn test_default_names() {
        assert_eq!(
            derive_cluster_name("https://localhost:9200"),
            "https::::localhost::9200"
        );
        assert_eq!(default_context_name("admin", "prod"), "admin@prod");
    }
}
