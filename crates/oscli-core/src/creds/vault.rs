//! Ansible-Vault 1.1 compatible encryption.
//!
//! Layout of a vault text:
//!
//! ```text
//! $ANSIBLE_VAULT;1.1;AES256
//! <hex(hex(salt) \n hex(hmac) \n hex(ciphertext)) wrapped at 80 columns>
//! ```
//!
//! Keys come from PBKDF2-HMAC-SHA256 (10 000 rounds, 32 byte salt) producing
//! 80 bytes: AES-256 key, HMAC-SHA256 key and the CTR initial counter block.
//! The plaintext is PKCS#7 padded before encryption and the HMAC covers the
//! ciphertext only.

use std::collections::BTreeMap;

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::errors::{CredentialError, VaultError};
use super::types::Credentials;
use crate::config::paths::expand_home;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;
type HmacSha256 = Hmac<Sha256>;

const HEADER_MAGIC: &str = "$ANSIBLE_VAULT";
const HEADER_V11: &str = "$ANSIBLE_VAULT;1.1;AES256";
const PBKDF2_ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 32;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const LINE_WIDTH: usize = 80;

/// Where an encrypted vault comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultBlob<'a> {
    /// Path to a vault file, `~/` is expanded.
    File(&'a str),
    /// Vault text embedded in the configuration.
    Inline(&'a str),
}

impl VaultBlob<'_> {
    fn origin(&self) -> String {
        match self {
            VaultBlob::File(path) => format!("file '{}'", path),
            VaultBlob::Inline(_) => "string".to_string(),
        }
    }
}

struct DerivedKeys {
    cipher_key: [u8; KEY_LEN],
    hmac_key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

fn derive_keys(password: &str, salt: &[u8]) -> DerivedKeys {
    let mut material = [0u8; 2 * KEY_LEN + IV_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut material);

    let mut keys = DerivedKeys {
        cipher_key: [0u8; KEY_LEN],
        hmac_key: [0u8; KEY_LEN],
        iv: [0u8; IV_LEN],
    };
    keys.cipher_key.copy_from_slice(&material[..KEY_LEN]);
    keys.hmac_key.copy_from_slice(&material[KEY_LEN..2 * KEY_LEN]);
    keys.iv.copy_from_slice(&material[2 * KEY_LEN..]);
    keys
}

fn apply_ctr(keys: &DerivedKeys, data: &mut [u8]) -> Result<(), VaultError> {
    let mut cipher =
        Aes256Ctr::new_from_slices(&keys.cipher_key, &keys.iv).map_err(VaultError::malformed)?;
    cipher.apply_keystream(data);
    Ok(())
}

fn mac_for(keys: &DerivedKeys, ciphertext: &[u8]) -> Result<HmacSha256, VaultError> {
    let mut mac = HmacSha256::new_from_slice(&keys.hmac_key).map_err(VaultError::malformed)?;
    mac.update(ciphertext);
    Ok(mac)
}

fn pad(plaintext: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(plaintext.len() + pad_len);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad_len, pad_len as u8);
    padded
}

fn unpad(mut padded: Vec<u8>) -> Result<Vec<u8>, VaultError> {
    let pad_len = *padded.last().ok_or(VaultError::InvalidPadding)? as usize;
    if pad_len == 0 || pad_len > BLOCK_LEN || pad_len > padded.len() {
        return Err(VaultError::InvalidPadding);
    }
    let body_len = padded.len() - pad_len;
    if padded[body_len..].iter().any(|&b| b as usize != pad_len) {
        return Err(VaultError::InvalidPadding);
    }
    padded.truncate(body_len);
    Ok(padded)
}

fn check_header(header: &str) -> Result<(), VaultError> {
    let mut fields = header.split(';').map(str::trim);
    if fields.next() != Some(HEADER_MAGIC) {
        return Err(VaultError::MissingHeader);
    }
    // 1.2 adds a vault-id label as a fourth field, the payload is identical.
    match (fields.next(), fields.next()) {
        (Some("1.1" | "1.2"), Some("AES256")) => Ok(()),
        _ => Err(VaultError::UnsupportedFormat {
            header: header.to_string(),
        }),
    }
}

fn hex_field(field: Option<&str>, name: &str) -> Result<Vec<u8>, VaultError> {
    let field = field.ok_or_else(|| VaultError::malformed(format!("missing {}", name)))?;
    hex::decode(field.trim()).map_err(|e| VaultError::malformed(format!("{}: {}", name, e)))
}

/// Encrypt `plaintext` into vault text with a random salt.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    encrypt_with_salt(plaintext, password, &salt)
}

fn encrypt_with_salt(plaintext: &str, password: &str, salt: &[u8]) -> Result<String, VaultError> {
    let keys = derive_keys(password, salt);
    let mut data = pad(plaintext.as_bytes());
    apply_ctr(&keys, &mut data)?;
    let tag = mac_for(&keys, &data)?.finalize().into_bytes();

    let inner = format!(
        "{}\n{}\n{}",
        hex::encode(salt),
        hex::encode(tag),
        hex::encode(&data)
    );
    let body = hex::encode(inner.as_bytes());

    let mut vault = String::with_capacity(HEADER_V11.len() + body.len() + body.len() / LINE_WIDTH + 2);
    vault.push_str(HEADER_V11);
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        vault.push('\n');
        vault.push_str(&String::from_utf8_lossy(line));
    }
    vault.push('\n');
    Ok(vault)
}

/// Decrypt vault text. The HMAC is verified before any decryption happens.
pub fn decrypt(vault_text: &str, password: &str) -> Result<String, VaultError> {
    let mut lines = vault_text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines.next().ok_or(VaultError::MissingHeader)?;
    check_header(header)?;

    let body: String = lines.collect();
    let inner = hex::decode(&body).map_err(VaultError::malformed)?;
    let inner = String::from_utf8(inner).map_err(VaultError::malformed)?;
    let mut fields = inner.split('\n');
    let salt = hex_field(fields.next(), "salt")?;
    let expected = hex_field(fields.next(), "hmac")?;
    let mut data = hex_field(fields.next(), "ciphertext")?;

    let keys = derive_keys(password, &salt);
    mac_for(&keys, &data)?
        .verify_slice(&expected)
        .map_err(|_| VaultError::HmacMismatch)?;
    apply_ctr(&keys, &mut data)?;

    String::from_utf8(unpad(data)?).map_err(|_| VaultError::InvalidUtf8)
}

/// Decrypt a vault and extract the username and password stored under the
/// given keys. Either key missing fails the whole read.
pub fn read_credentials(
    blob: VaultBlob<'_>,
    password: &str,
    username_key: &str,
    password_key: &str,
) -> Result<Credentials, CredentialError> {
    let origin = blob.origin();
    let text = match blob {
        VaultBlob::Inline(text) => text.to_string(),
        VaultBlob::File(path) => {
            let resolved = expand_home(path);
            std::fs::read_to_string(&resolved).map_err(|source| CredentialError::VaultRead {
                path: resolved.display().to_string(),
                source,
            })?
        }
    };

    let plaintext = decrypt(&text, password).map_err(|source| CredentialError::VaultDecrypt {
        origin: origin.clone(),
        source,
    })?;
    let document: serde_yaml::Mapping =
        serde_yaml::from_str(&plaintext).map_err(|e| CredentialError::VaultDocument {
            message: e.to_string(),
        })?;

    let lookup = |field: &'static str, key: &str| {
        document
            .get(key)
            .and_then(serde_yaml::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CredentialError::VaultKeyNotFound {
                field,
                key: key.to_string(),
                origin: origin.clone(),
            })
    };
    let username = lookup("username", username_key)?;
    let password = lookup("password", password_key)?;
    Ok(Credentials { username, password })
}

/// Build a vault holding `entries` as a YAML mapping.
pub fn create_vault(
    entries: &BTreeMap<String, String>,
    password: &str,
) -> Result<String, CredentialError> {
    let document = serde_yaml::to_string(entries).map_err(|e| CredentialError::VaultEncode {
        message: e.to_string(),
    })?;
    encrypt(&document, password).map_err(|e| CredentialError::VaultEncode {
        message: e.to_string(),
    })
}
