use thiserror::Error;

use super::{CipherError, CodecError, TextFormat};

/// Errors produced by encrypted store operations.
///
/// `DecryptionFailed` and `Decode` never overlap: the first means the blob
/// could not be authenticated (wrong key, tampering, truncation), the second
/// means it authenticated but its contents are not a valid document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key missing, empty, or rejected by the cipher.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
    /// Authentication of an encrypted blob failed.
    #[error("decryption failed: {reason}")]
    DecryptionFailed { reason: String },
    /// The cipher could not produce a blob.
    #[error("encryption failed: {reason}")]
    EncryptionFailed { reason: String },
    /// Text could not be parsed into a document.
    #[error("failed to decode {format} text: {reason}")]
    Decode { format: TextFormat, reason: String },
    /// A document could not be rendered in the requested format.
    #[error("failed to encode {format} text: {reason}")]
    Encode { format: TextFormat, reason: String },
    /// An intermediate key-path segment is missing or not a table.
    #[error("key '{segment}' not found in path {path:?}")]
    KeyPathNotFound { segment: String, path: Vec<String> },
    #[error("key path must contain at least one segment")]
    EmptyKeyPath,
    /// Underlying storage failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CipherError> for StoreError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidKey { reason } => StoreError::InvalidKey { reason },
            CipherError::Authentication { reason } => StoreError::DecryptionFailed { reason },
            CipherError::Encryption { reason } => StoreError::EncryptionFailed { reason },
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode { format, reason } => StoreError::Decode { format, reason },
            CodecError::Encode { format, reason } => StoreError::Encode { format, reason },
        }
    }
}
