//! End-to-end lifecycle of a context: first run, registration, persistence
//! and resolution against an in-memory secret store.

use std::collections::BTreeMap;

use oscli_core::config::{
    CONFIG_ENV, ClusterConfig, ConfigStore, ContextConfig, Registry, UserConfig, VaultConfig,
};
use oscli_core::creds::{CredentialProvider, Credentials, MemorySecretStore, NoPrompt, vault};
use oscli_core::{ContextResolver, PasswordSource};

fn provider() -> CredentialProvider {
    CredentialProvider::new(Box::new(MemorySecretStore::new()), Box::new(NoPrompt))
}

#[test]
fn test_first_run_to_resolved_context() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("oscli").join("config");
    // SAFETY: this is the only test in this binary touching the variable.
    unsafe { std::env::set_var(CONFIG_ENV, &config_path) };

    let store = ConfigStore::new(None);
    let mut registry = store.load().unwrap();
    assert_eq!(registry, Registry::skeleton());
    assert!(config_path.exists());

    let provider = provider();
    let token = provider
        .register_token(&Credentials::new("admin", "admin"))
        .unwrap();
    registry
        .push(
            ClusterConfig::new("c1", "https://localhost:9200", false),
            UserConfig::with_token("u1", token),
            ContextConfig::new("ctx1", "c1", "u1"),
        )
        .unwrap();
    registry.switch_context("ctx1").unwrap();
    store.save(&registry).unwrap();

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, registry);

    let resolver = ContextResolver::new(&reloaded, &provider);
    let resolved = resolver.resolve(None, &PasswordSource::Prompt).unwrap();
    assert_eq!(resolved.cluster.name, "c1");
    assert_eq!(resolved.credentials, Credentials::new("admin", "admin"));
    assert!(reloaded.user("u1").unwrap().cache.is_resolved());

    unsafe { std::env::remove_var(CONFIG_ENV) };
}

#[test]
fn test_vault_file_context_with_retry() {
    let temp_dir = tempfile::tempdir().unwrap();
    let vault_path = temp_dir.path().join("creds.vault");
    let mut entries = BTreeMap::new();
    entries.insert("os_user".to_string(), "replicator".to_string());
    entries.insert("os_password".to_string(), "p4ss".to_string());
    std::fs::write(&vault_path, vault::create_vault(&entries, "vault-pass").unwrap()).unwrap();

    let store = ConfigStore::new(Some(temp_dir.path().join("config")));
    let mut registry = Registry::skeleton();
    registry
        .push(
            ClusterConfig::new("c2", "https://follower:9200", true),
            UserConfig::with_vault(
                "u2",
                VaultConfig {
                    file: Some(vault_path.display().to_string()),
                    username: "os_user".to_string(),
                    password: "os_password".to_string(),
                    ..Default::default()
                },
            ),
            ContextConfig::new("ctx2", "c2", "u2"),
        )
        .unwrap();
    store.save(&registry).unwrap();
    let registry = store.load().unwrap();

    let provider = provider();
    let resolver = ContextResolver::new(&registry, &provider);

    let wrong = resolver.resolve(Some("ctx2"), &PasswordSource::Value("nope".to_string()));
    assert!(wrong.is_err());
    assert!(!registry.user("u2").unwrap().cache.is_resolved());

    let resolved = resolver
        .resolve(Some("ctx2"), &PasswordSource::Value("vault-pass".to_string()))
        .unwrap();
    assert_eq!(resolved.credentials.username, "replicator");
    assert_eq!(resolved.credentials.password, "p4ss");

    // Cached now; the wrong password is no longer consulted.
    let cached = resolver
        .resolve(Some("ctx2"), &PasswordSource::Value("nope".to_string()))
        .unwrap();
    assert_eq!(cached.credentials.username, "replicator");
}

#[test]
fn test_remove_and_prune_returns_tokens_for_cleanup() {
    let provider = provider();
    let token = provider
        .register_token(&Credentials::new("admin", "admin"))
        .unwrap();

    let mut registry = Registry::skeleton();
    registry
        .push(
            ClusterConfig::new("c1", "https://localhost:9200", false),
            UserConfig::with_token("u1", token.clone()),
            ContextConfig::new("ctx1", "c1", "u1"),
        )
        .unwrap();
    registry.switch_context("ctx1").unwrap();

    let removed = registry.remove_context("ctx1").unwrap();
    let pruned = registry.prune_unreferenced(&[removed]);
    assert!(registry.current.is_empty());
    assert_eq!(pruned.users.len(), 1);

    for user in &pruned.users {
        if let Some(token) = user.token() {
            provider.forget_token(token).unwrap();
        }
    }

    let orphan = UserConfig::with_token("u1", token);
    assert!(provider.resolve(&orphan, &PasswordSource::Prompt).is_err());
}
