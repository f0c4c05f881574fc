use crate::errors::OscliError;

/// Failures decoding or encoding an Ansible-Vault payload.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Vault payload is missing the '$ANSIBLE_VAULT' header")]
    MissingHeader,

    #[error("Unsupported vault format: {header}")]
    UnsupportedFormat { header: String },

    #[error("Vault payload is malformed: {message}")]
    Malformed { message: String },

    #[error("Vault HMAC check failed (wrong password or corrupted payload)")]
    HmacMismatch,

    #[error("Vault plaintext has invalid padding")]
    InvalidPadding,

    #[error("Vault plaintext is not valid UTF-8")]
    InvalidUtf8,
}

impl VaultError {
    pub(crate) fn malformed(message: impl std::fmt::Display) -> Self {
        VaultError::Malformed {
            message: message.to_string(),
        }
    }
}

impl OscliError for VaultError {
    fn error_code(&self) -> &'static str {
        match self {
            VaultError::MissingHeader => "VAULT_MISSING_HEADER",
            VaultError::UnsupportedFormat { .. } => "VAULT_UNSUPPORTED_FORMAT",
            VaultError::Malformed { .. } => "VAULT_MALFORMED",
            VaultError::HmacMismatch => "VAULT_HMAC_MISMATCH",
            VaultError::InvalidPadding => "VAULT_INVALID_PADDING",
            VaultError::InvalidUtf8 => "VAULT_INVALID_UTF8",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("vault file or vault string must be provided")]
    VaultSourceMissing,

    #[error("only one of vault file or vault string may be provided")]
    VaultSourceAmbiguous,

    #[error("vault username and password keys must be provided")]
    VaultKeysMissing,

    #[error("unable to decrypt vault {origin}: {source}")]
    VaultDecrypt {
        origin: String,
        #[source]
        source: VaultError,
    },

    #[error("unable to read vault file '{path}': {source}")]
    VaultRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decrypted vault is not a key/value document: {message}")]
    VaultDocument { message: String },

    #[error("unable to find {field} key '{key}' in vault {origin}")]
    VaultKeyNotFound {
        field: &'static str,
        key: String,
        origin: String,
    },

    #[error("unable to encode vault content: {message}")]
    VaultEncode { message: String },

    #[error("keyring entry '{id}' not found")]
    KeyringEntryNotFound { id: String },

    #[error("keyring operation failed: {message}")]
    Keyring { message: String },

    #[error("keyring entry '{id}' holds malformed credentials")]
    MalformedKeyringEntry { id: String },

    #[error("no credential source configured for user '{user}'")]
    NoSource { user: String },

    #[error("secret prompt failed: {message}")]
    Prompt { message: String },
}

impl OscliError for CredentialError {
    fn error_code(&self) -> &'static str {
        match self {
            CredentialError::VaultSourceMissing => "CREDS_VAULT_SOURCE_MISSING",
            CredentialError::VaultSourceAmbiguous => "CREDS_VAULT_SOURCE_AMBIGUOUS",
            CredentialError::VaultKeysMissing => "CREDS_VAULT_KEYS_MISSING",
            CredentialError::VaultDecrypt { .. } => "CREDS_VAULT_DECRYPT_FAILED",
            CredentialError::VaultRead { .. } => "CREDS_VAULT_READ_FAILED",
            CredentialError::VaultDocument { .. } => "CREDS_VAULT_DOCUMENT_INVALID",
            CredentialError::VaultKeyNotFound { .. } => "CREDS_VAULT_KEY_NOT_FOUND",
            CredentialError::VaultEncode { .. } => "CREDS_VAULT_ENCODE_FAILED",
            CredentialError::KeyringEntryNotFound { .. } => "CREDS_KEYRING_ENTRY_NOT_FOUND",
            CredentialError::Keyring { .. } => "CREDS_KEYRING_FAILED",
            CredentialError::MalformedKeyringEntry { .. } => "CREDS_KEYRING_ENTRY_MALFORMED",
            CredentialError::NoSource { .. } => "CREDS_NO_SOURCE",
            CredentialError::Prompt { .. } => "CREDS_PROMPT_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        // Exhaustive match ensures new variants force an explicit classification.
        match self {
            CredentialError::VaultSourceMissing
            | CredentialError::VaultSourceAmbiguous
            | CredentialError::VaultKeysMissing
            | CredentialError::VaultDecrypt { .. }
            | CredentialError::VaultDocument { .. }
            | CredentialError::VaultKeyNotFound { .. }
            | CredentialError::NoSource { .. } => true,

            CredentialError::VaultRead { .. }
            | CredentialError::VaultEncode { .. }
            | CredentialError::KeyringEntryNotFound { .. }
            | CredentialError::Keyring { .. }
            | CredentialError::MalformedKeyringEntry { .. }
            | CredentialError::Prompt { .. } => false,
        }
    }
}
