use std::time::Duration;

use super::errors::ContextError;
use crate::config::errors::ConfigError;
use crate::config::types::{ClusterConfig, ContextConfig, Registry, UserConfig};
use crate::creds::{CredentialProvider, Credentials, PasswordSource};

/// The cluster and user a context points at, before any secret is touched.
#[derive(Debug, Clone, Copy)]
pub struct ContextTarget<'a> {
    pub context: &'a ContextConfig,
    pub cluster: &'a ClusterConfig,
    pub user: &'a UserConfig,
}

/// Everything the HTTP layer needs to talk to a cluster.
#[derive(Debug, Clone)]
pub struct ResolvedContext<'a> {
    pub name: &'a str,
    pub cluster: &'a ClusterConfig,
    pub user: &'a UserConfig,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ResolvedContext<'_> {
    pub fn server(&self) -> &str {
        &self.cluster.params.server
    }
}

/// Looks up contexts in a registry and materializes their credentials.
pub struct ContextResolver<'a> {
    registry: &'a Registry,
    provider: &'a CredentialProvider,
}

impl<'a> ContextResolver<'a> {
    pub fn new(registry: &'a Registry, provider: &'a CredentialProvider) -> Self {
        Self { registry, provider }
    }

    /// Find the named context, or the active one when `name` is `None`, and
    /// the entries it references. Dangling references are errors here.
    pub fn target(&self, name: Option<&str>) -> Result<ContextTarget<'a>, ContextError> {
        let registry = self.registry;
        let name = match name {
            Some(name) => name,
            None if registry.current.is_empty() => return Err(ConfigError::NoActiveContext.into()),
            None => registry.current.as_str(),
        };

        let context = registry
            .context(name)
            .ok_or_else(|| ConfigError::ContextNotFound {
                name: name.to_string(),
            })?;
        let cluster =
            registry
                .cluster(&context.cluster)
                .ok_or_else(|| ContextError::DanglingCluster {
                    context: context.name.clone(),
                    cluster: context.cluster.clone(),
                })?;
        let user = registry
            .user(&context.user)
            .ok_or_else(|| ContextError::DanglingUser {
                context: context.name.clone(),
                user: context.user.clone(),
            })?;

        Ok(ContextTarget {
            context,
            cluster,
            user,
        })
    }

    /// Resolve a context into an address, credentials and a call timeout.
    pub fn resolve(
        &self,
        name: Option<&str>,
        password: &PasswordSource,
    ) -> Result<ResolvedContext<'a>, ContextError> {
        let target = self.target(name)?;
        let credentials = self
            .provider
            .resolve(target.user, password)
            .map_err(|source| ContextError::Credentials {
                context: target.context.name.clone(),
                source,
            })?;

        tracing::info!(
            event = "core.context.resolved",
            context = %target.context.name,
            cluster = %target.cluster.name,
            server = %target.cluster.params.server
        );

        Ok(ResolvedContext {
            name: &target.context.name,
            cluster: target.cluster,
            user: target.user,
            credentials,
            timeout: self.registry.server_timeout(),
        })
    }
}
