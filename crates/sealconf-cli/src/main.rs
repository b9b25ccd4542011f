mod cli;
mod config;
mod keys;

use std::{fs, path::PathBuf};

use crate::cli::{Command, ConfigCommand};
use clap::Parser;
use color_eyre::Result;
use sealconf_core::{storage::StructuredCodec, Value};
use sealconf_storage::{json::value_from_json, toml_codec::TomlCodec, EncryptedStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    run(cli::Cli::parse(), config::load)
}

/// Dispatches one command. Config is loaded only by commands that need a key.
fn run(cli: cli::Cli, load_config: impl Fn() -> Result<config::Config>) -> Result<()> {
    let key_file = cli.key_file.as_deref();
    let open_store = || keys::open_store(key_file, &load_config()?);
    match cli.command {
        Command::Keygen { out } => run_keygen(out)?,
        Command::Export { file } => {
            let store = open_store()?;
            println!("{}", store.to_json(&file)?);
        }
        Command::Import { json, file } => {
            let store = open_store()?;
            store.from_json(&fs::read_to_string(&json)?, &file)?;
            info!(file = %file.display(), "imported document");
        }
        Command::Merge { file, json } => {
            let store = open_store()?;
            let partial = TomlCodec.from_json_text(&fs::read_to_string(&json)?)?;
            store.replace_top_level_sections(&file, partial)?;
            info!(file = %file.display(), "replaced top-level sections");
        }
        Command::Set {
            file,
            key_path,
            value,
        } => {
            let store = open_store()?;
            let segments = split_key_path(&key_path);
            store.update_key_path(&file, &segments[..], parse_value(&value))?;
            info!(file = %file.display(), %key_path, "updated value");
        }
        Command::Config(ConfigCommand::Init) => init_config()?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info; logs go to stderr so
    // exported JSON on stdout stays clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn run_keygen(out: Option<PathBuf>) -> Result<()> {
    let key = EncryptedStore::generate_key();
    match out {
        Some(path) => {
            EncryptedStore::save_key(&key, &path)?;
            info!(path = %path.display(), "wrote new key");
        }
        None => println!("{}", String::from_utf8_lossy(&key)),
    }
    Ok(())
}

fn init_config() -> Result<()> {
    let path = config::write_default_if_missing(&config::Config::starter())?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

fn split_key_path(key_path: &str) -> Vec<&str> {
    key_path.split('.').collect()
}

/// JSON literals (`42`, `true`, `[1,2]`, `{"a":1}`, `"text"`) keep their type;
/// anything else is taken verbatim as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|parsed| value_from_json(parsed).ok())
        .unwrap_or_else(|| Value::from(raw))
}
