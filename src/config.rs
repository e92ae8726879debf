//! Credential resolution for the Bot API
//!
//! Resolves the (token, chat id) pair from explicit arguments, environment
//! variables and layered INI config files, in that order.

use std::env;
use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::{Error, Result};

/// Environment variable overriding the bot token.
pub const ENV_TOKEN: &str = "TGSEND_TOKEN";
/// Environment variable overriding the chat id.
pub const ENV_CHAT_ID: &str = "TGSEND_CHATID";
/// Per-user config file name, looked up under the home directory.
pub const USER_CONFIG_FILE: &str = "tgsend.conf";
/// System-wide config file.
pub const GLOBAL_CONFIG_FILE: &str = "/etc/tgsend.conf";
/// Section read when no profile name is given.
pub const DEFAULT_SECTION: &str = "Default";

const KEY_TOKEN: &str = "BotToken";
const KEY_CHAT_ID: &str = "ChatID";

/// Resolved bot credentials. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub chat_id: String,
}

impl Credentials {
    pub fn new<S1: Into<String>, S2: Into<String>>(token: S1, chat_id: S2) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }
}

/// Resolve credentials with the standard file search order
/// (explicit path, then `~/tgsend.conf`, then `/etc/tgsend.conf`).
///
/// Precedence per field, highest first: explicit argument, environment
/// variable, config file. The config file is only opened when at least one
/// field is still unresolved after the first two tiers.
pub fn resolve(
    explicit_token: Option<&str>,
    explicit_chat_id: Option<&str>,
    section: &str,
    config_file: Option<&Path>,
) -> Result<Credentials> {
    resolve_with_search(
        explicit_token,
        explicit_chat_id,
        section,
        config_file,
        &default_search_paths(),
    )
}

/// Like [`resolve`], but with a caller-supplied fallback search order
/// (primarily for tests).
pub fn resolve_with_search(
    explicit_token: Option<&str>,
    explicit_chat_id: Option<&str>,
    section: &str,
    config_file: Option<&Path>,
    search_paths: &[PathBuf],
) -> Result<Credentials> {
    let mut token = non_empty(explicit_token).or_else(|| env_value(ENV_TOKEN));
    let mut chat_id = non_empty(explicit_chat_id).or_else(|| env_value(ENV_CHAT_ID));

    if token.is_none() || chat_id.is_none() {
        if let Some(path) = locate_config_file(config_file, search_paths)? {
            let (file_token, file_chat_id) = read_section(&path, section)?;
            token = token.or(Some(file_token));
            chat_id = chat_id.or(Some(file_chat_id));
        }
    }

    let token = token.ok_or(Error::MissingCredential(KEY_TOKEN))?;
    let chat_id = chat_id.ok_or(Error::MissingCredential(KEY_CHAT_ID))?;
    Ok(Credentials { token, chat_id })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Default fallback locations: per-user file first, then the global one.
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(USER_CONFIG_FILE));
    }
    paths.push(PathBuf::from(GLOBAL_CONFIG_FILE));
    paths
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Pick the config file to read, or `None` when no fallback file exists.
///
/// An explicitly given path that does not exist is fatal; there is no
/// fallthrough to the default locations.
fn locate_config_file(
    explicit: Option<&Path>,
    search_paths: &[PathBuf],
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = expand_tilde(path);
        if !path.is_file() {
            return Err(Error::ConfigFileNotFound(path));
        }
        return Ok(Some(path));
    }
    Ok(search_paths.iter().find(|p| p.is_file()).cloned())
}

/// Read `BotToken` and `ChatID` from the named section.
///
/// A section missing either key is invalid, even when the caller only needs
/// one of them.
fn read_section(path: &Path, section: &str) -> Result<(String, String)> {
    let ini = Ini::load_from_file(path).map_err(|e| match e {
        ini::Error::Io(io) => Error::Io(io),
        ini::Error::Parse(parse) => Error::ConfigParse {
            path: path.to_path_buf(),
            message: parse.to_string(),
        },
    })?;

    let properties = ini
        .section(Some(section))
        .ok_or_else(|| Error::SectionNotFound {
            section: section.to_string(),
            path: path.to_path_buf(),
        })?;

    let token = properties
        .get(KEY_TOKEN)
        .ok_or_else(|| Error::MissingKey {
            section: section.to_string(),
            key: KEY_TOKEN,
            path: path.to_path_buf(),
        })?;
    let chat_id = properties
        .get(KEY_CHAT_ID)
        .ok_or_else(|| Error::MissingKey {
            section: section.to_string(),
            key: KEY_CHAT_ID,
            path: path.to_path_buf(),
        })?;

    Ok((token.to_string(), chat_id.to_string()))
}
