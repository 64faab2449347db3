//! Encrypted mnemonic persistence for internal wallets.
//!
//! Internal wallets are a convenience feature: generated key material is kept
//! on the local machine so a user can reconnect without re-entering the
//! phrase. Mnemonics are encrypted with AES-256-GCM under an Argon2id-derived
//! key before touching disk. This is a demo-grade store, not custody.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{thread_rng, RngCore};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::error::Error;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const STORE_VERSION: u32 = 1;

/// On-disk envelope for one encrypted mnemonic
#[derive(Debug, Serialize, Deserialize)]
struct EncryptedMnemonic {
    version: u32,
    created_at: String,
    salt: String,
    nonce: String,
    ciphertext: String,
}

/// File-backed store of encrypted wallet mnemonics
#[derive(Debug, Clone)]
pub struct WalletStore {
    dir: PathBuf,
}

impl WalletStore {
    /// Store under the user config directory (`<config>/baruk/wallets`)
    pub fn new() -> Result<Self, Error> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine user config directory".to_string()))?;
        Ok(Self {
            dir: base.join("baruk").join("wallets"),
        })
    }

    /// Store rooted at an explicit directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, Error> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::Wallet(format!(
                "Invalid wallet name '{}': use alphanumerics, '-' and '_'",
                name
            )));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Encrypt and persist a mnemonic under the given name
    pub fn save(&self, name: &str, mnemonic: &str, passphrase: &str) -> Result<(), Error> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Wallet(format!("Failed to create wallet store dir: {}", e)))?;

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        thread_rng().fill_bytes(&mut salt);
        thread_rng().fill_bytes(&mut nonce);

        let key = derive_key(passphrase, &salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), mnemonic.as_bytes())
            .map_err(|e| Error::Wallet(format!("Mnemonic encryption failed: {}", e)))?;

        let envelope = EncryptedMnemonic {
            version: STORE_VERSION,
            created_at: chrono::Utc::now().to_rfc3339(),
            salt: BASE64.encode(salt),
            nonce: BASE64.encode(nonce),
            ciphertext: BASE64.encode(ciphertext),
        };

        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(&path, json)
            .map_err(|e| Error::Wallet(format!("Failed to write wallet file: {}", e)))?;

        debug!(wallet = name, "Saved encrypted mnemonic");
        Ok(())
    }

    /// Load and decrypt a mnemonic by name
    pub fn load(&self, name: &str, passphrase: &str) -> Result<SecretString, Error> {
        let path = self.path_for(name)?;
        let json = fs::read_to_string(&path).map_err(|_| {
            Error::Wallet(format!("Wallet '{}' not found in store", name))
        })?;
        let envelope: EncryptedMnemonic = serde_json::from_str(&json)?;

        if envelope.version != STORE_VERSION {
            return Err(Error::Wallet(format!(
                "Unsupported wallet file version {} for '{}'",
                envelope.version, name
            )));
        }

        let salt = BASE64
            .decode(&envelope.salt)
            .map_err(|e| Error::Wallet(format!("Corrupt wallet file (salt): {}", e)))?;
        let nonce = BASE64
            .decode(&envelope.nonce)
            .map_err(|e| Error::Wallet(format!("Corrupt wallet file (nonce): {}", e)))?;
        let ciphertext = BASE64
            .decode(&envelope.ciphertext)
            .map_err(|e| Error::Wallet(format!("Corrupt wallet file (ciphertext): {}", e)))?;

        let key = derive_key(passphrase, &salt)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&*key));
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
                .map_err(|_| {
                    Error::Wallet(format!(
                        "Failed to decrypt wallet '{}': wrong passphrase or corrupt file",
                        name
                    ))
                })?,
        );

        let phrase = std::str::from_utf8(&plaintext)
            .map_err(|_| Error::Wallet("Decrypted mnemonic is not valid UTF-8".to_string()))?;
        Ok(SecretString::new(phrase.to_string()))
    }

    /// Whether a wallet with this name exists
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Names of all stored wallets
    pub fn list(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(names),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => names.push(stem.to_string()),
                None => warn!(?path, "Skipping wallet file with unreadable name"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a stored wallet
    pub fn delete(&self, name: &str) -> Result<(), Error> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(Error::Wallet(format!(
                "Wallet '{}' not found in store",
                name
            )));
        }
        fs::remove_file(&path)
            .map_err(|e| Error::Wallet(format!("Failed to delete wallet '{}': {}", name, e)))
    }
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, Error> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut *key)
        .map_err(|e| Error::Wallet(format!("Key derivation failed: {}", e)))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::with_dir(tmp.path());

        store.save("primary", PHRASE, "hunter2").unwrap();
        let loaded = store.load("primary", "hunter2").unwrap();
        assert_eq!(loaded.expose_secret(), PHRASE);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::with_dir(tmp.path());

        store.save("primary", PHRASE, "hunter2").unwrap();
        let err = store.load("primary", "hunter3").unwrap_err();
        assert!(err.to_string().contains("wrong passphrase"));
    }

    #[test]
    fn list_and_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::with_dir(tmp.path());

        store.save("alpha", PHRASE, "pw").unwrap();
        store.save("beta", PHRASE, "pw").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);

        store.delete("alpha").unwrap();
        assert_eq!(store.list().unwrap(), vec!["beta"]);
        assert!(!store.exists("alpha"));
        assert!(store.delete("alpha").is_err());
    }

    #[test]
    fn rejects_path_traversal_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = WalletStore::with_dir(tmp.path());
        assert!(store.save("../evil", PHRASE, "pw").is_err());
        assert!(store.save("", PHRASE, "pw").is_err());
    }
}
