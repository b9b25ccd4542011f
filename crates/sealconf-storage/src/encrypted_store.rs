use std::{
    fmt,
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use sealconf_core::{
    document::{replace_top_level_sections, set_at_key_path},
    storage::{AuthenticatedCipher, StoreError, StructuredCodec, TextFormat},
    Document, Value,
};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::{aes_gcm_cipher::AesGcmCipher, key_provider, toml_codec::TomlCodec};

/// Encrypted-at-rest configuration documents.
///
/// Every operation works on the whole document: it is read, decrypted and
/// decoded, optionally modified, then encoded, encrypted and written back.
/// No document state is held between calls, and concurrent read-modify-write
/// cycles on the same file are not coordinated (last writer wins).
pub struct EncryptedStore<C = TomlCodec, A = AesGcmCipher> {
    codec: C,
    cipher: A,
}

impl EncryptedStore {
    /// Store using TOML as the canonical format and AES-256-GCM envelopes.
    ///
    /// Fails with [`StoreError::InvalidKey`] when `key` is `None`, empty, or not
    /// a key produced by [`EncryptedStore::generate_key`].
    pub fn new<K: AsRef<[u8]>>(key: Option<K>) -> Result<Self, StoreError> {
        Self::with_codec(key, TomlCodec)
    }

    pub fn generate_key() -> Vec<u8> {
        AesGcmCipher::generate_key()
    }

    /// Raw key write; see [`key_provider::save_key`].
    pub fn save_key(key: &[u8], path: impl AsRef<Path>) -> Result<(), StoreError> {
        Ok(key_provider::save_key(key, path)?)
    }

    /// Raw key read; see [`key_provider::load_key`].
    pub fn load_key(path: impl AsRef<Path>) -> Result<Vec<u8>, StoreError> {
        Ok(key_provider::load_key(path)?)
    }
}

impl<C: StructuredCodec, A: AuthenticatedCipher> EncryptedStore<C, A> {
    /// Builds a store from a key and an explicit codec. The key is checked for
    /// presence before the cipher sees it; text keys are taken as UTF-8 bytes.
    pub fn with_codec<K: AsRef<[u8]>>(key: Option<K>, codec: C) -> Result<Self, StoreError> {
        let key = key.ok_or_else(|| StoreError::InvalidKey {
            reason: "key must be provided".to_string(),
        })?;
        let key = key.as_ref();
        if key.is_empty() {
            return Err(StoreError::InvalidKey {
                reason: "key must not be empty".to_string(),
            });
        }

        let cipher = A::from_key(key)?;
        Ok(Self { codec, cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, StoreError> {
        Ok(self.cipher.encrypt(plaintext.as_bytes())?)
    }

    pub fn decrypt(&self, blob: &[u8]) -> Result<String, StoreError> {
        let bytes = self.cipher.decrypt(blob)?;
        String::from_utf8(bytes).map_err(|e| StoreError::Decode {
            format: TextFormat::Canonical,
            reason: format!("decrypted payload is not UTF-8: {e}"),
        })
    }

    /// Encodes, encrypts and writes `document`, replacing the file's contents.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, document: &Document, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let text = self.codec.encode(document)?;
        let blob = self.encrypt(&text)?;
        write_blob(path.as_ref(), &blob)?;
        debug!(entries = document.len(), bytes = blob.len(), "saved document");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Document, StoreError> {
        let blob = read_blob(path.as_ref())?;
        let text = self.decrypt(&blob)?;
        let document = self.codec.decode(&text)?;
        debug!(entries = document.len(), bytes = blob.len(), "loaded document");
        Ok(document)
    }

    /// Shallow merge of `partial` into the stored document: each top-level
    /// entry of `partial` replaces the stored entry of the same name in full.
    /// Nested tables are not merged, so sibling keys inside a replaced section
    /// are dropped. An empty `partial` rewrites the document unchanged.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), sections = partial.len()))]
    pub fn replace_top_level_sections(
        &self,
        path: impl AsRef<Path>,
        partial: Document,
    ) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut current = self.load(path)?;
        replace_top_level_sections(&mut current, partial);
        self.save(&current, path)
    }

    /// Sets a single value addressed by `key_path`.
    ///
    /// All segments but the last must already name tables; otherwise this fails
    /// with [`StoreError::KeyPathNotFound`] and the file is not written.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), depth = key_path.len()))]
    pub fn update_key_path<S: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        key_path: &[S],
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut document = self.load(path)?;
        set_at_key_path(&mut document, key_path, value.into())?;
        self.save(&document, path)
    }

    /// Decrypted document as indented JSON. The returned text is plaintext.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<String, StoreError> {
        let document = self.load(path)?;
        Ok(self.codec.to_json_text(&document)?)
    }

    /// Parses `json` and saves it encrypted at `path`, replacing any content.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json(&self, json: &str, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let document = self.codec.from_json_text(json)?;
        self.save(&document, path)
    }
}

impl<C: fmt::Debug, A> fmt::Debug for EncryptedStore<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedStore")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

fn write_blob(path: &Path, blob: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(blob)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_blob(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}
