use std::path::Path;

use color_eyre::{eyre::eyre, Result};
use sealconf_storage::{
    key_provider::{EnvKeyProvider, FileKeyProvider, KeyProvider, KeyringProvider},
    EncryptedStore,
};
use tracing::debug;

use crate::config::Config;

/// Environment variable holding key text.
pub const KEY_ENV: &str = "SEALCONF_KEY";

/// Pick the key source: `--key-file`, then `SEALCONF_KEY`, then the configured
/// key file, then the configured keyring entry.
pub fn select_provider(
    key_file: Option<&Path>,
    env_key_set: bool,
    config: &Config,
) -> Result<Box<dyn KeyProvider>> {
    if let Some(path) = key_file {
        debug!(?path, "using key file from command line");
        return Ok(Box::new(FileKeyProvider::new(path)));
    }
    if env_key_set {
        debug!(var = KEY_ENV, "using key from environment");
        return Ok(Box::new(EnvKeyProvider::new(KEY_ENV)));
    }
    if let Some(path) = &config.key_file {
        debug!(?path, "using key file from config");
        return Ok(Box::new(FileKeyProvider::new(path.clone())));
    }
    if let Some(keyring) = &config.keyring {
        debug!(service = %keyring.service, account = %keyring.account, "using keyring entry");
        return Ok(Box::new(KeyringProvider::new(
            keyring.service.clone(),
            keyring.account.clone(),
        )));
    }

    Err(eyre!(
        "no key source: pass --key-file, set {KEY_ENV}, or configure key_file/keyring"
    ))
}

/// Build a store keyed from the resolved key source.
pub fn open_store(key_file: Option<&Path>, config: &Config) -> Result<EncryptedStore> {
    let env_key_set = std::env::var_os(KEY_ENV).is_some();
    let provider = select_provider(key_file, env_key_set, config)?;
    store_from_provider(provider.as_ref())
}

pub fn store_from_provider(provider: &dyn KeyProvider) -> Result<EncryptedStore> {
    let key = provider.key()?;
    Ok(EncryptedStore::new(Some(key))?)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sealconf_core::Document;
    use sealconf_storage::key_provider::InMemoryKeyProvider;

    use super::*;

    #[test]
    fn missing_sources_are_an_error() {
        let err = select_provider(None, false, &Config::default())
            .err()
            .expect("no source");
        assert!(err.to_string().contains("no key source"));
    }

    #[test]
    fn command_line_key_file_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let flag_path = dir.path().join("flag.key");
        let config_path = dir.path().join("config.key");
        let flag_key = EncryptedStore::generate_key();
        EncryptedStore::save_key(&flag_key, &flag_path).expect("save");
        EncryptedStore::save_key(&EncryptedStore::generate_key(), &config_path).expect("save");

        let config = Config {
            key_file: Some(config_path),
            keyring: None,
        };
        let provider = select_provider(Some(&flag_path), true, &config).expect("provider");
        assert_eq!(provider.key().expect("key"), flag_key);
    }

    #[test]
    fn config_key_file_is_used_without_flag_or_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.key");
        let key = EncryptedStore::generate_key();
        EncryptedStore::save_key(&key, &path).expect("save");

        let config = Config {
            key_file: Some(path),
            keyring: None,
        };
        let provider = select_provider(None, false, &config).expect("provider");
        assert_eq!(provider.key().expect("key"), key);
    }

    #[test]
    fn store_opened_from_key_file_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let key_path = dir.path().join("store.key");
        EncryptedStore::save_key(&EncryptedStore::generate_key(), &key_path).expect("save");

        let store = open_store(Some(&key_path), &Config::default()).expect("open");
        let file: PathBuf = dir.path().join("app.enc");
        let mut doc = Document::new();
        doc.insert("name".into(), "svc".into());
        store.save(&doc, &file).expect("save");

        let reopened = open_store(Some(&key_path), &Config::default()).expect("reopen");
        assert_eq!(reopened.load(&file).expect("load"), doc);
    }

    #[test]
    fn stores_from_one_provider_share_a_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("app.enc");
        let provider = InMemoryKeyProvider::default();

        let mut doc = Document::new();
        doc.insert("region".into(), "eu-west-1".into());
        store_from_provider(&provider)
            .expect("open")
            .save(&doc, &file)
            .expect("save");

        let reopened = store_from_provider(&provider).expect("reopen");
        assert_eq!(reopened.load(&file).expect("load"), doc);

        let stranger = store_from_provider(&InMemoryKeyProvider::default()).expect("other");
        assert!(stranger.load(&file).is_err());
    }
}
