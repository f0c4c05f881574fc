use super::errors::CredentialError;
use super::secret_store::{
    SecretStore, decode_credentials, encode_credentials, generate_token, secret_id,
};
use super::types::{Credentials, PasswordSource};
use super::vault::{self, VaultBlob};
use crate::config::types::{CredentialSource, UserConfig, VaultConfig};

/// Label shown when the vault password has to be typed in.
pub const VAULT_PASSWORD_LABEL: &str = "Vault password:";

/// Interactive source of secrets. Implementations block until a value is
/// supplied or the user aborts.
pub trait SecretPrompt {
    fn secret(&self, label: &str) -> Result<String, CredentialError>;
}

/// Prompt that always fails. Used where no terminal is available.
pub struct NoPrompt;

impl SecretPrompt for NoPrompt {
    fn secret(&self, label: &str) -> Result<String, CredentialError> {
        Err(CredentialError::Prompt {
            message: format!("'{}' requested but prompting is disabled", label),
        })
    }
}

/// Resolves a user's configured credential source into a username/password.
pub struct CredentialProvider {
    store: Box<dyn SecretStore>,
    prompt: Box<dyn SecretPrompt>,
}

impl CredentialProvider {
    pub fn new(store: Box<dyn SecretStore>, prompt: Box<dyn SecretPrompt>) -> Self {
        Self { store, prompt }
    }

    /// Resolve credentials for `user`.
    ///
    /// A successful resolution is cached on the `UserConfig` instance and
    /// returned by later calls without touching the store, the prompt or the
    /// vault. Failures leave the cache empty so a retry can succeed.
    pub fn resolve(
        &self,
        user: &UserConfig,
        password: &PasswordSource,
    ) -> Result<Credentials, CredentialError> {
        if let Some(cached) = user.cache.get() {
            tracing::debug!(event = "core.creds.cache_hit", user = %user.name);
            return Ok(cached.clone());
        }

        tracing::info!(
            event = "core.creds.resolve_started",
            user = %user.name,
            source = user.user.kind()
        );

        let credentials = match &user.user {
            CredentialSource::Token { id } => self.from_store(id),
            CredentialSource::Vault(config) => self.from_vault(config, password),
            CredentialSource::None => Err(CredentialError::NoSource {
                user: user.name.clone(),
            }),
        };

        match credentials {
            Ok(credentials) => {
                tracing::info!(event = "core.creds.resolve_completed", user = %user.name);
                Ok(user.cache.fill(credentials).clone())
            }
            Err(e) => {
                tracing::warn!(
                    event = "core.creds.resolve_failed",
                    user = %user.name,
                    error = %e
                );
                Err(e)
            }
        }
    }

    /// Store a username/password pair and return the token that refers to it.
    pub fn register_token(&self, credentials: &Credentials) -> Result<String, CredentialError> {
        let token = generate_token();
        self.store
            .set(secret_id(&token), &encode_credentials(credentials))?;
        tracing::info!(event = "core.creds.token_registered", token = %token);
        Ok(token)
    }

    /// Delete the secret behind `token`. Unknown tokens are ignored.
    pub fn forget_token(&self, token: &str) -> Result<(), CredentialError> {
        self.store.delete(secret_id(token))?;
        tracing::info!(event = "core.creds.token_forgotten", token = %token);
        Ok(())
    }

    fn from_store(&self, token: &str) -> Result<Credentials, CredentialError> {
        let id = secret_id(token);
        let payload = self.store.get(id)?;
        decode_credentials(id, &payload)
    }

    fn from_vault(
        &self,
        config: &VaultConfig,
        password: &PasswordSource,
    ) -> Result<Credentials, CredentialError> {
        let blob = vault_blob(config)?;
        if config.username.is_empty() || config.password.is_empty() {
            return Err(CredentialError::VaultKeysMissing);
        }

        let vault_password = match password {
            PasswordSource::Value(value) => value.clone(),
            PasswordSource::Prompt => self.prompt.secret(VAULT_PASSWORD_LABEL)?,
        };

        vault::read_credentials(blob, &vault_password, &config.username, &config.password)
    }
}

fn vault_blob(config: &VaultConfig) -> Result<VaultBlob<'_>, CredentialError> {
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }
    match (non_empty(&config.file), non_empty(&config.vault_string)) {
        (Some(path), None) => Ok(VaultBlob::File(path)),
        (None, Some(text)) => Ok(VaultBlob::Inline(text)),
        (None, None) => Err(CredentialError::VaultSourceMissing),
        (Some(_), Some(_)) => Err(CredentialError::VaultSourceAmbiguous),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use super::*;
    use crate::creds::secret_store::MemorySecretStore;

    /// Answers prompts from a queue and counts how often it was asked.
    #[derive(Clone, Default)]
    struct ScriptedPrompt {
        answers: Rc<RefCell<Vec<String>>>,
        asked: Rc<Cell<usize>>,
    }

    impl ScriptedPrompt {
        fn answering(answers: &[&str]) -> Self {
            let prompt = Self::default();
            prompt
                .answers
                .borrow_mut()
                .extend(answers.iter().rev().map(|a| a.to_string()));
            prompt
        }
    }

    impl SecretPrompt for ScriptedPrompt {
        fn secret(&self, label: &str) -> Result<String, CredentialError> {
            assert_eq!(label, VAULT_PASSWORD_LABEL);
            self.asked.set(self.asked.get() + 1);
            self.answers
                .borrow_mut()
                .pop()
                .ok_or_else(|| CredentialError::Prompt {
                    message: "no more answers".to_string(),
                })
        }
    }

    fn provider(prompt: ScriptedPrompt) -> CredentialProvider {
        CredentialProvider::new(Box::new(MemorySecretStore::new()), Box::new(prompt))
    }

    fn inline_vault(password: &str) -> String {
        let mut entries = BTreeMap::new();
        entries.insert("os_user".to_string(), "admin".to_string());
        entries.insert("os_password".to_string(), "s3cr3t".to_string());
        vault::create_vault(&entries, password).unwrap()
    }

    fn vault_user(vault_string: String) -> UserConfig {
        UserConfig::with_vault(
            "u2",
            VaultConfig {
                vault_string: Some(vault_string),
                username: "os_user".to_string(),
                password: "os_password".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_token_roundtrip_through_store() {
        let provider = provider(ScriptedPrompt::default());
        let token = provider
            .register_token(&Credentials::new("admin", "admin"))
            .unwrap();
        assert!(token.starts_with("keyring:::"));

        let user = UserConfig::with_token("u1", token.clone());
        let creds = provider.resolve(&user, &PasswordSource::Prompt).unwrap();
        assert_eq!(creds, Credentials::new("admin", "admin"));
        assert!(user.cache.is_resolved());
    }

    #[test]
    fn test_forget_token_then_resolve_fails() {
        let provider = provider(ScriptedPrompt::default());
        let token = provider
            .register_token(&Credentials::new("admin", "admin"))
            .unwrap();
        provider.forget_token(&token).unwrap();
        provider.forget_token(&token).unwrap();

        let user = UserConfig::with_token("u1", token);
        let result = provider.resolve(&user, &PasswordSource::Prompt);
        assert!(matches!(
            result,
            Err(CredentialError::KeyringEntryNotFound { .. })
        ));
        assert!(!user.cache.is_resolved());
    }

    #[test]
    fn test_vault_prompts_once_and_caches() {
        let prompt = ScriptedPrompt::answering(&["pw"]);
        let provider = provider(prompt.clone());
        let user = vault_user(inline_vault("pw"));

        let first = provider.resolve(&user, &PasswordSource::Prompt).unwrap();
        let second = provider.resolve(&user, &PasswordSource::Prompt).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.username, "admin");
        assert_eq!(prompt.asked.get(), 1);
    }

    #[test]
    fn test_wrong_password_leaves_cache_empty() {
        let prompt = ScriptedPrompt::answering(&["wrong", "pw"]);
        let provider = provider(prompt.clone());
        let user = vault_user(inline_vault("pw"));

        let result = provider.resolve(&user, &PasswordSource::Prompt);
        assert!(matches!(result, Err(CredentialError::VaultDecrypt { .. })));
        assert!(!user.cache.is_resolved());

        let creds = provider.resolve(&user, &PasswordSource::Prompt).unwrap();
        assert_eq!(creds.password, "s3cr3t");
        assert_eq!(prompt.asked.get(), 2);
    }

    #[test]
    fn test_explicit_password_skips_prompt() {
        let prompt = ScriptedPrompt::default();
        let provider = provider(prompt.clone());
        let user = vault_user(inline_vault("pw"));

        let creds = provider
            .resolve(&user, &PasswordSource::Value("pw".to_string()))
            .unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(prompt.asked.get(), 0);
    }

    #[test]
    fn test_vault_without_source_fails_before_prompt() {
        let prompt = ScriptedPrompt::default();
        let provider = provider(prompt.clone());
        let user = UserConfig::with_vault(
            "u2",
            VaultConfig {
                file: Some(String::new()),
                username: "os_user".to_string(),
                password: "os_password".to_string(),
                ..Default::default()
            },
        );

        let error = provider
            .resolve(&user, &PasswordSource::Prompt)
            .unwrap_err();
        assert_eq!(error.to_string(), "vault file or vault string must be provided");
        assert_eq!(prompt.asked.get(), 0);
    }

    #[test]
    fn test_vault_blob_borrows_the_non_empty_source() {
        let config = VaultConfig {
            file: Some("~/creds.vault".to_string()),
            vault_string: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(vault_blob(&config).unwrap(), VaultBlob::File("~/creds.vault"));

        let config = VaultConfig {
            file: None,
            vault_string: Some("$ANSIBLE_VAULT;1.1;AES256".to_string()),
            ..Default::default()
        };
        assert_eq!(
            vault_blob(&config).unwrap(),
            VaultBlob::Inline("$ANSIBLE_VAULT;1.1;AES256")
        );
    }

    #[test]
    fn test_vault_with_both_sources_is_rejected() {
        let provider = provider(ScriptedPrompt::default());
        let user = UserConfig::with_vault(
            "u2",
            VaultConfig {
                file: Some("~/creds.vault".to_string()),
                vault_string: Some("$ANSIBLE_VAULT;1.1;AES256".to_string()),
                username: "os_user".to_string(),
                password: "os_password".to_string(),
            },
        );
        assert!(matches!(
            provider.resolve(&user, &PasswordSource::Prompt),
            Err(CredentialError::VaultSourceAmbiguous)
        ));
    }

    #[test]
    fn test_vault_without_keys_is_rejected() {
        let provider = provider(ScriptedPrompt::default());
        let user = UserConfig::with_vault(
            "u2",
            VaultConfig {
                vault_string: Some(inline_vault("pw")),
                username: "os_user".to_string(),
                ..Default::default()
            },
        );
        let error = provider
            .resolve(&user, &PasswordSource::Value("pw".to_string()))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "vault username and password keys must be provided"
        );
    }

    #[test]
    fn test_user_without_source() {
        let provider = provider(ScriptedPrompt::default());
        let user = UserConfig::new("nobody", CredentialSource::None);
        assert!(matches!(
            provider.resolve(&user, &PasswordSource::Prompt),
            Err(CredentialError::NoSource { .. })
        ));
    }

    #[test]
    fn test_no_prompt_fails() {
        assert!(matches!(
            NoPrompt.secret(VAULT_PASSWORD_LABEL),
            Err(CredentialError::Prompt { .. })
        ));
    }
}
