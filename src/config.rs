//! Configuration — loaded once at startup from `./.env` plus the
//! process environment (process env wins). No hot-reload, no ambient
//! global lookup: the resulting `Config` is passed by reference into
//! the poller.

use std::collections::HashMap;
use std::path::Path;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Environment keys recognized by the loader.
pub const KEY_EMAIL_USER: &str = "EMAIL_USER";
pub const KEY_EMAIL_PASS: &str = "EMAIL_PASS";

/// Mailbox and backend configuration for one account.
#[derive(Debug, Clone)]
pub struct Config {
    pub email_user: String,
    pub email_pass: SecretString,
    pub imap_host: String,
    pub imap_port: u16,
    /// SMTP settings are recognized for parity with the account's other
    /// tooling; the draft pipeline composes mail but never sends it.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub drafts_folder: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub poll_interval_secs: u64,
}

impl Config {
    /// Load configuration: `./.env` first, overlaid by the process
    /// environment. Missing credentials are fatal.
    pub fn load() -> Result<Self, ConfigError> {
        let mut vars = read_env_file(Path::new(".env"))?;
        for (key, value) in std::env::vars() {
            vars.insert(key, value);
        }
        Self::from_map(&vars)
    }

    /// Build a `Config` from an explicit key/value map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let email_user = require(vars, KEY_EMAIL_USER)?;
        let email_pass = SecretString::from(require(vars, KEY_EMAIL_PASS)?);

        let imap_host = lookup(vars, "EMAIL_HOST", "imap.gmail.com");
        let imap_port = parse(vars, "IMAP_PORT", 993_u16)?;
        let smtp_host = lookup(vars, "SMTP_SERVER", "smtp.gmail.com");
        let smtp_port = parse(vars, "SMTP_PORT", 587_u16)?;
        let drafts_folder = lookup(vars, "DRAFTS_FOLDER", "[Gmail]/Drafts");
        let ollama_base_url = lookup(vars, "OLLAMA_BASE_URL", "http://localhost:11434");
        let ollama_model = lookup(vars, "OLLAMA_MODEL", "mistral");
        let poll_interval_secs = parse(vars, "POLL_INTERVAL_SECS", 60_u64)?;

        Ok(Self {
            email_user,
            email_pass,
            imap_host,
            imap_port,
            smtp_host,
            smtp_port,
            drafts_folder,
            ollama_base_url,
            ollama_model,
            poll_interval_secs,
        })
    }
}

fn require(vars: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    match vars.get(key).map(String::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

fn lookup(vars: &HashMap<String, String>, key: &str, default: &str) -> String {
    match vars.get(key).map(String::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

fn parse<T>(vars: &HashMap<String, String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(key).map(String::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => {
            value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Read a `.env` file into a map. `KEY=VALUE` lines, `#` comments and
/// blank lines skipped. A missing file is not an error.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }

    let contents = std::fs::read_to_string(path)?;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            vars.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(vars)
}
