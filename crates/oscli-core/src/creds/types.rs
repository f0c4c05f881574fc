use std::cell::OnceCell;
use std::fmt;

/// A username/password pair ready to be sent to a cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the vault decrypt password comes from.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum PasswordSource {
    /// Explicit value, e.g. from `--vault-password`.
    Value(String),
    /// Block on an interactive masked prompt.
    #[default]
    Prompt,
}

impl PasswordSource {
    /// Build from an optional CLI value.
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(value) => PasswordSource::Value(value),
            None => PasswordSource::Prompt,
        }
    }
}

impl fmt::Debug for PasswordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordSource::Value(_) => f.write_str("Value(<redacted>)"),
            PasswordSource::Prompt => f.write_str("Prompt"),
        }
    }
}

/// Process-local cache of resolved credentials attached to a user entry.
///
/// Never serialized and ignored by equality, so a registry compares equal
/// before and after its credentials were resolved.
#[derive(Clone, Default)]
pub struct CredentialCache(OnceCell<Credentials>);

impl CredentialCache {
    pub fn get(&self) -> Option<&Credentials> {
        self.0.get()
    }

    /// Store the first successful resolution. Later values are ignored.
    pub(crate) fn fill(&self, credentials: Credentials) -> &Credentials {
        self.0.get_or_init(|| credentials)
    }

    pub fn is_resolved(&self) -> bool {
        self.0.get().is_some()
    }
}

impl PartialEq for CredentialCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for CredentialCache {}

impl fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_resolved() {
            "resolved"
        } else {
            "unresolved"
        };
        f.write_str(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("admin", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_password_source_from_option() {
        assert_eq!(
            PasswordSource::from_option(Some("pw".to_string())),
            PasswordSource::Value("pw".to_string())
        );
        assert_eq!(PasswordSource::from_option(None), PasswordSource::Prompt);
    }

    #[test]
    fn test_cache_keeps_first_value() {
        let cache = CredentialCache::default();
        assert!(!cache.is_resolved());
        cache.fill(Credentials::new("a", "1"));
        cache.fill(Credentials::new("b", "2"));
        assert_eq!(cache.get().map(|c| c.username.as_str()), Some("a"));
    }

    #[test]
    fn test_cache_is_ignored_by_equality() {
        let resolved = CredentialCache::default();
        resolved.fill(Credentials::new("a", "1"));
        assert_eq!(resolved, CredentialCache::default());
    }
}
