use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
    /// Wrong key, tampered or truncated input. Never recoverable by retrying.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },
}

/// Authenticated symmetric encryption bound to a single key.
///
/// Blobs produced by `encrypt` are opaque to callers; they carry whatever the
/// implementation needs (version, nonce, tag) to authenticate on `decrypt`.
pub trait AuthenticatedCipher: Sized + Send + Sync {
    /// Fresh key material in the form `from_key` accepts.
    fn generate_key() -> Vec<u8>;

    fn from_key(key: &[u8]) -> Result<Self, CipherError>;

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Must fail with [`CipherError::Authentication`] on any input this key did
    /// not produce unmodified.
    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CipherError>;
}
