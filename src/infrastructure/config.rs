use crate::domain::thresholds::ThresholdTable;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub thresholds: ThresholdSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_alarm_limit")]
    pub alarm_limit: usize,
    #[serde(default)]
    pub endpoints: EndpointSettings,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Path templates relative to `base_url`; `${var}` placeholders are expanded per call.
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointSettings {
    #[serde(default = "default_alarms_path")]
    pub alarms: String,
    #[serde(default = "default_readings_path")]
    pub readings: String,
    #[serde(default = "default_acknowledge_path")]
    pub acknowledge: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            alarms: default_alarms_path(),
            readings: default_readings_path(),
            acknowledge: default_acknowledge_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ThresholdSettings {
    pub path: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_alarm_limit() -> usize {
    500
}

fn default_alarms_path() -> String {
    "/alarms/?limit=${limit}".to_string()
}

fn default_readings_path() -> String {
    "/devices/${device_id}/readings?limit=${limit}".to_string()
}

fn default_acknowledge_path() -> String {
    "/alarms/${alarm_id}/acknowledge".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_top_n() -> usize {
    5
}

/// `config/service` overlaid with `ALARMS__SECTION__KEY` environment variables.
pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/service").required(false))
        .add_source(
            config::Environment::with_prefix("ALARMS")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Threshold table from a TOML file, or the built-in SMS defaults when no path is set.
pub fn load_threshold_table(path: Option<&Path>) -> anyhow::Result<ThresholdTable> {
    let table = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read thresholds from {}", path.display()))?;
            parse_threshold_table(&raw)
                .with_context(|| format!("Invalid thresholds in {}", path.display()))?
        }
        None => ThresholdTable::sms_defaults(),
    };
    Ok(table)
}

pub fn parse_threshold_table(raw: &str) -> anyhow::Result<ThresholdTable> {
    let table: ThresholdTable = toml::from_str(raw)?;
    table.validate()?;
    Ok(table)
}

/// Replace template variables in an endpoint path, URL-encoding each value
pub fn expand_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }
    result
}
