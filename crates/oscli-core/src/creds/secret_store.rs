//! OS secure-store access for token-backed users.
//!
//! Entries live under a fixed service name and a generated per-user id. The
//! stored value is the Base64 username and password joined by `:::`.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

use super::errors::CredentialError;
use super::types::Credentials;

/// Service name for keyring entries
pub const SERVICE_NAME: &str = "opensearch-cli";

/// Separator used both in token ids and in stored payloads.
pub const CRED_SEPARATOR: &str = ":::";

/// Prefix marking a user token as a keyring reference.
pub const TOKEN_PREFIX: &str = "keyring";

/// Storage capability for opaque secrets addressed by id.
pub trait SecretStore {
    fn get(&self, id: &str) -> Result<String, CredentialError>;
    fn set(&self, id: &str, secret: &str) -> Result<(), CredentialError>;
    /// Remove an entry. Removing a missing entry is not an error.
    fn delete(&self, id: &str) -> Result<(), CredentialError>;
}

/// The host operating system's keyring.
pub struct OsKeyring {
    service: String,
}

impl OsKeyring {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Create with custom service name (for testing)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, id: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service, id).map_err(keyring_error)
    }
}

impl Default for OsKeyring {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for OsKeyring {
    fn get(&self, id: &str) -> Result<String, CredentialError> {
        match self.entry(id)?.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => {
                tracing::warn!(event = "core.keyring.entry_missing", id = id);
                Err(CredentialError::KeyringEntryNotFound { id: id.to_string() })
            }
            Err(e) => {
                tracing::error!(event = "core.keyring.get_failed", id = id, error = %e);
                Err(keyring_error(e))
            }
        }
    }

    fn set(&self, id: &str, secret: &str) -> Result<(), CredentialError> {
        self.entry(id)?.set_password(secret).map_err(keyring_error)?;
        tracing::info!(event = "core.keyring.entry_stored", service = %self.service, id = id);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), CredentialError> {
        match self.entry(id)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

fn keyring_error(error: keyring::Error) -> CredentialError {
    CredentialError::Keyring {
        message: error.to_string(),
    }
}

/// In-process secret store for tests and dry runs.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CredentialError> {
        self.entries.lock().map_err(|_| CredentialError::Keyring {
            message: "memory secret store lock poisoned".to_string(),
        })
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, id: &str) -> Result<String, CredentialError> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| CredentialError::KeyringEntryNotFound { id: id.to_string() })
    }

    fn set(&self, id: &str, secret: &str) -> Result<(), CredentialError> {
        self.lock()?.insert(id.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), CredentialError> {
        self.lock()?.remove(id);
        Ok(())
    }
}

/// Generate a new user token of the form `keyring:::<uuid>`.
pub fn generate_token() -> String {
    format!("{}{}{}", TOKEN_PREFIX, CRED_SEPARATOR, Uuid::now_v7())
}

/// Strip the `keyring:::` prefix from a user token to get the store id.
pub fn secret_id(token: &str) -> &str {
    token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|rest| rest.strip_prefix(CRED_SEPARATOR))
        .unwrap_or(token)
}

/// Encode credentials into the stored payload format.
pub fn encode_credentials(credentials: &Credentials) -> String {
    format!(
        "{}{}{}",
        STANDARD.encode(&credentials.username),
        CRED_SEPARATOR,
        STANDARD.encode(&credentials.password)
    )
}

/// Decode a stored payload back into credentials.
pub fn decode_credentials(id: &str, payload: &str) -> Result<Credentials, CredentialError> {
    let malformed = || CredentialError::MalformedKeyringEntry { id: id.to_string() };
    let (username, password) = payload.split_once(CRED_SEPARATOR).ok_or_else(malformed)?;
    let decode = |part: &str| {
        STANDARD
            .decode(part)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(malformed)
    };
    Ok(Credentials::new(decode(username)?, decode(password)?))
}
