//! Layered settings: built-in defaults, then an optional `yuju.toml` (any
//! format the `config` crate recognizes under the basename `yuju`), then
//! `YUJU__SECTION__KEY` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::insert::DEFAULT_TERMINATOR;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub path: String,
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ShellSettings {
    pub prompt: String,
    pub terminator: String,
    pub echo_sql: bool,
    /// Defaults to `~/.yuju_history` when unset.
    pub history_file: Option<String>,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            terminator: DEFAULT_TERMINATOR.to_string(),
            echo_sql: true,
            history_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub shell: ShellSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from("yuju")
    }

    /// `basename` names the optional settings file without its extension.
    pub fn load_from(basename: &str) -> Result<Self> {
        let defaults = ShellSettings::default();
        let settings = Config::builder()
            .set_default("database.path", "yuju.db")?
            .set_default("database.in_memory", false)?
            .set_default("shell.prompt", defaults.prompt)?
            .set_default("shell.terminator", defaults.terminator)?
            .set_default("shell.echo_sql", defaults.echo_sql)?
            .add_source(File::with_name(basename).required(false))
            .add_source(Environment::with_prefix("YUJU").prefix_separator("__").separator("__").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize::<Settings>()?)
    }
}
