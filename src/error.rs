//! Error types for tgsend

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No value found for {0} (checked arguments, environment and config files)")]
    MissingCredential(&'static str),

    #[error("Section '{}' not found in config file {}", section, path.display())]
    SectionNotFound { section: String, path: PathBuf },

    #[error("Section '{}' in {} is missing the '{}' key", section, path.display(), key)]
    MissingKey {
        section: String,
        key: &'static str,
        path: PathBuf,
    },

    #[error("Failed to parse config file {}: {}", path.display(), message)]
    ConfigParse { path: PathBuf, message: String },

    #[error("Config file not found: {}", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error("Cannot open source file {}: {}", path.display(), source)]
    SourceUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response from Telegram: {0}")]
    MalformedResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
