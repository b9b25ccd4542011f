//! Concrete encrypted document storage.
//! Documents are persisted as TOML sealed in AES-256-GCM envelopes, with keys
//! sourced from key files, the environment, or the OS keyring.

pub mod aes_gcm_cipher;
pub mod encrypted_store;
pub mod json;
pub mod key_provider;
pub mod toml_codec;

pub use encrypted_store::EncryptedStore;
