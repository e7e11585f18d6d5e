//! Application settings.
//!
//! Read from `settings.toml` (or the file given with `--settings`) and
//! overridden by `THRIFT_*` environment variables, e.g.
//! `THRIFT_TELEGRAM__TOKEN=...`.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "thrift_keeper", about = "Personal finance tracker for Telegram")]
struct Args {
    /// Settings file path (TOML), without or with extension.
    #[arg(long, env = "THRIFT_SETTINGS")]
    settings: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub telegram: Option<Telegram>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.settings.as_deref().unwrap_or(DEFAULT_SETTINGS_PATH);

        Config::builder()
            .add_source(File::with_name(path).required(args.settings.is_some()))
            .add_source(
                Environment::with_prefix("THRIFT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_to_memory_database_without_bot() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.database, Database::Memory));
        assert!(settings.telegram.is_none());
    }

    #[test]
    fn reads_sqlite_path_and_telegram_section() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [database]
            sqlite = "thrift_keeper.db"

            [telegram]
            token = "123:abc"
            timezone = "Asia/Yekaterinburg"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert!(matches!(
            settings.database,
            Database::Sqlite(ref path) if path == "thrift_keeper.db"
        ));
        let telegram = settings.telegram.unwrap();
        assert_eq!(telegram.token, "123:abc");
        assert_eq!(telegram.timezone.as_deref(), Some("Asia/Yekaterinburg"));
    }
}
