use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface definition. A thin shell over the encrypted store.
#[derive(Parser, Debug)]
#[command(
    name = "sealconf",
    about = "Encrypted-at-rest TOML configuration files",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Key file to use instead of SEALCONF_KEY or the configured key source.
    #[arg(long, global = true, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a fresh key and print it, or write it to a file.
    Keygen {
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Print a decrypted document as JSON (plaintext on stdout).
    Export { file: PathBuf },
    /// Encrypt a JSON document into FILE, replacing its contents.
    Import { json: PathBuf, file: PathBuf },
    /// Replace top-level sections of FILE with those in a JSON document.
    Merge { file: PathBuf, json: PathBuf },
    /// Set one value by dotted key path (e.g. `server.tls.port 8443`).
    Set {
        file: PathBuf,
        key_path: String,
        /// Parsed as a JSON literal; anything else is stored as a string.
        value: String,
    },
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keygen_subcommand() {
        let cli = Cli::try_parse_from(["sealconf", "keygen"]).expect("parse should succeed");
        assert_eq!(cli.command, Command::Keygen { out: None });
        assert_eq!(cli.key_file, None);
    }

    #[test]
    fn parses_global_key_file_after_subcommand() {
        let cli = Cli::try_parse_from(["sealconf", "export", "app.toml.enc", "--key-file", "k.key"])
            .expect("parse should succeed");
        assert_eq!(cli.key_file, Some(PathBuf::from("k.key")));
        assert_eq!(
            cli.command,
            Command::Export {
                file: PathBuf::from("app.toml.enc")
            }
        );
    }

    #[test]
    fn parses_set_subcommand() {
        let cli = Cli::try_parse_from(["sealconf", "set", "app.enc", "section2.nested.key3", "[4,5,6]"])
            .expect("parse should succeed");
        assert_eq!(
            cli.command,
            Command::Set {
                file: PathBuf::from("app.enc"),
                key_path: "section2.nested.key3".into(),
                value: "[4,5,6]".into(),
            }
        );
    }

    #[test]
    fn parses_config_init_subcommand() {
        let cli =
            Cli::try_parse_from(["sealconf", "config", "init"]).expect("parse should succeed");
        assert_eq!(cli.command, Command::Config(ConfigCommand::Init));
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["sealconf"]).is_err());
    }
}
