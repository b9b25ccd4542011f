use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use sealconf_core::storage::AuthenticatedCipher;
use thiserror::Error;

use crate::aes_gcm_cipher::AesGcmCipher;

/// Writes raw key bytes to `path`, replacing any previous content.
/// No encoding, wrapping, or permission handling is applied.
pub fn save_key(key: &[u8], path: impl AsRef<Path>) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(key)?;
    file.flush()
}

/// Reads raw key bytes from `path`.
pub fn load_key(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("keyring error: {0}")]
    Keyring(String),
    #[error("key file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("environment variable {var} is not set")]
    MissingEnv { var: String },
    #[error("generation error: {0}")]
    Generation(String),
}

/// A source of key material (key file, environment, OS keychain; memory in tests).
pub trait KeyProvider: Send + Sync {
    fn key(&self) -> Result<Vec<u8>, KeyError>;
}

/// Key read verbatim from a file written by [`save_key`].
#[derive(Debug, Clone)]
pub struct FileKeyProvider {
    path: PathBuf,
}

impl FileKeyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeyProvider for FileKeyProvider {
    fn key(&self) -> Result<Vec<u8>, KeyError> {
        load_key(&self.path).map_err(|source| KeyError::File {
            path: self.path.clone(),
            source,
        })
    }
}

/// Key text held in an environment variable.
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
}

impl EnvKeyProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl KeyProvider for EnvKeyProvider {
    fn key(&self) -> Result<Vec<u8>, KeyError> {
        std::env::var(&self.var)
            .map(String::into_bytes)
            .map_err(|_| KeyError::MissingEnv {
                var: self.var.clone(),
            })
    }
}

/// OS keyring-backed provider. Uses the `keyring` crate to store the key text,
/// generating one on first use.
pub struct KeyringProvider {
    service: String,
    account: String,
}

impl KeyringProvider {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }
}

impl KeyProvider for KeyringProvider {
    fn key(&self) -> Result<Vec<u8>, KeyError> {
        let entry = keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| KeyError::Keyring(e.to_string()))?;

        if let Some(stored) = stored_key(entry.get_password())? {
            return Ok(stored);
        }

        let key = AesGcmCipher::generate_key();
        let text =
            String::from_utf8(key.clone()).map_err(|e| KeyError::Generation(e.to_string()))?;
        entry
            .set_password(&text)
            .map_err(|e| KeyError::Keyring(e.to_string()))?;
        tracing::info!(service = %self.service, account = %self.account, "stored new key in keyring");
        Ok(key)
    }
}

/// Only a missing entry means "no key yet". Any other keyring failure is
/// surfaced so an existing key is never replaced.
fn stored_key(lookup: Result<String, keyring::Error>) -> Result<Option<Vec<u8>>, KeyError> {
    match lookup {
        Ok(secret) => Ok(Some(secret.into_bytes())),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(KeyError::Keyring(err.to_string())),
    }
}

/// In-memory key provider for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyProvider {
    inner: Arc<Mutex<Option<Vec<u8>>>>,
}

impl KeyProvider for InMemoryKeyProvider {
    fn key(&self) -> Result<Vec<u8>, KeyError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|err| KeyError::Generation(format!("lock poisoned: {err}")))?;

        Ok(guard.get_or_insert_with(AesGcmCipher::generate_key).clone())
    }
}
