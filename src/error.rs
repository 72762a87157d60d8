use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Readline error: {0}")]
    Readline(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;

// Helper conversions
impl From<rusqlite::Error> for ShellError {
    fn from(e: rusqlite::Error) -> Self { Self::Engine(EngineError::from(e)) }
}

impl From<config::ConfigError> for ShellError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(e: rustyline::error::ReadlineError) -> Self { Self::Readline(e.to_string()) }
}
