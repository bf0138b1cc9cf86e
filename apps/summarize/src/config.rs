use std::{fs, path::Path, time::Duration};

use client_core::{IntakePolicy, RetryPolicy};
use serde::Deserialize;
use shared::protocol::DEFAULT_SUMMARY_ENDPOINT;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "summarizer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub max_file_bytes: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SUMMARY_ENDPOINT.into(),
            request_timeout_secs: 60,
            max_retries: 2,
            retry_delay_ms: 1000,
            max_file_bytes: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn intake_policy(&self) -> IntakePolicy {
        IntakePolicy::with_max_file_bytes(self.max_file_bytes)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    max_file_bytes: Option<u64>,
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file, then environment overrides.
pub fn load_settings_with(config_path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(
                path = %config_path.display(),
                "ignoring unparseable config file: {err}"
            ),
        }
    }

    if let Some(v) = env("SUMMARIZER_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = env("APP__ENDPOINT") {
        settings.endpoint = v;
    }

    if let Some(v) = parsed(&env, "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = parsed(&env, "APP__MAX_RETRIES") {
        settings.max_retries = v;
    }
    if let Some(v) = parsed(&env, "APP__RETRY_DELAY_MS") {
        settings.retry_delay_ms = v;
    }
    if let Some(v) = parsed(&env, "APP__MAX_FILE_BYTES") {
        settings.max_file_bytes = Some(v);
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.endpoint {
        settings.endpoint = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.max_retries {
        settings.max_retries = v;
    }
    if let Some(v) = file_cfg.retry_delay_ms {
        settings.retry_delay_ms = v;
    }
    if file_cfg.max_file_bytes.is_some() {
        settings.max_file_bytes = file_cfg.max_file_bytes;
    }
}

fn parsed<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    env(key).and_then(|raw| raw.trim().parse::<T>().ok())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
