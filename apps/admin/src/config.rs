use std::{fs, io, path::Path};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub api_user: Option<String>,
    pub api_key: Option<String>,
    pub log_filter: String,
    pub push_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9950".into(),
            api_user: None,
            api_key: None,
            log_filter: "info".into(),
            push_enabled: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    api_user: Option<String>,
    api_key: Option<String>,
    log_filter: Option<String>,
    push_enabled: Option<bool>,
}

/// Defaults, then `path` when it exists, then the process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let raw = read_config_file(path)?;
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("invalid settings in {}", path.display()))
}

/// `None` when `path` does not exist.
fn read_config_file(path: &Path) -> anyhow::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

pub fn load_settings_from(
    raw: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = raw {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.server_url {
            settings.server_url = v;
        }
        if file_cfg.api_user.is_some() {
            settings.api_user = file_cfg.api_user;
        }
        if file_cfg.api_key.is_some() {
            settings.api_key = file_cfg.api_key;
        }
        if let Some(v) = file_cfg.log_filter {
            settings.log_filter = v;
        }
        if let Some(v) = file_cfg.push_enabled {
            settings.push_enabled = v;
        }
    }

    if let Some(v) = env("ADMIN_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__API_USER") {
        settings.api_user = Some(v);
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__PUSH_ENABLED") {
        match parse_flag(&v) {
            Some(flag) => settings.push_enabled = flag,
            None => anyhow::bail!("APP__PUSH_ENABLED must be true or false, got '{v}'"),
        }
    }

    Ok(settings)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
