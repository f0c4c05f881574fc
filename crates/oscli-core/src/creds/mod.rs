//! Credential resolution for configured users.
//!
//! A user either references an entry in the OS keyring through a token, or
//! an Ansible-Vault encrypted document holding the username and password.

pub mod errors;
pub mod provider;
pub mod secret_store;
pub mod types;
pub mod vault;

pub use errors::{CredentialError, VaultError};
pub use provider::{CredentialProvider, NoPrompt, SecretPrompt, VAULT_PASSWORD_LABEL};
pub use secret_store::{MemorySecretStore, OsKeyring, SecretStore};
pub use types::{CredentialCache, Credentials, PasswordSource};
