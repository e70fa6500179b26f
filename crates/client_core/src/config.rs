use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "teller.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub redirect_delay: Duration,
    pub session_expiry_redirect_delay: Duration,
    pub notification_autohide: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            redirect_delay: Duration::from_millis(1500),
            session_expiry_redirect_delay: Duration::from_millis(2000),
            notification_autohide: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    redirect_delay_ms: Option<u64>,
    session_expiry_redirect_ms: Option<u64>,
    notification_autohide_ms: Option<u64>,
}

/// Defaults, then `teller.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        apply_file_settings(&mut settings, file_cfg);
    }

    if let Some(v) = env("BANK_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(ms) = env_millis(&env, "APP__REDIRECT_DELAY_MS")? {
        settings.redirect_delay = ms;
    }
    if let Some(ms) = env_millis(&env, "APP__SESSION_EXPIRY_REDIRECT_MS")? {
        settings.session_expiry_redirect_delay = ms;
    }
    if let Some(ms) = env_millis(&env, "APP__NOTIFICATION_AUTOHIDE_MS")? {
        settings.notification_autohide = ms;
    }

    settings.server_url = normalize_server_url(&settings.server_url);
    Ok(settings)
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(ms) = file_cfg.redirect_delay_ms {
        settings.redirect_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = file_cfg.session_expiry_redirect_ms {
        settings.session_expiry_redirect_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = file_cfg.notification_autohide_ms {
        settings.notification_autohide = Duration::from_millis(ms);
    }
}

fn env_millis(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> anyhow::Result<Option<Duration>> {
    let Some(raw) = env(key) else {
        return Ok(None);
    };
    let ms = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of milliseconds, got '{raw}'"))?;
    Ok(Some(Duration::from_millis(ms)))
}

pub fn normalize_server_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return ClientSettings::default().server_url;
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
