//! Environment-based configuration
//!
//! Everything operational comes from the environment (with `.env` support
//! in the binary); the job calendar optionally comes from a JSON file via
//! `CALENDAR_PATH`, otherwise the built-in schedule applies.

use crate::error::ConfigError;
use crate::scoring::ScoringConfig;
use std::env;
use std::path::PathBuf;

/// Deployment environment, used to pick the log format.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub symbols: Vec<String>,
    pub portfolio_symbols: Vec<String>,
    pub provider_base_url: String,
    pub artifact_dir: PathBuf,
    pub serve_dir: PathBuf,
    pub portfolio_serve_dir: PathBuf,
    pub checkpoint_path: PathBuf,
    pub pid_file: PathBuf,
    pub http_port: u16,
    pub poll_interval_secs: u64,
    pub calendar_path: Option<PathBuf>,
    pub scoring: ScoringConfig,
}

fn list_var(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Value {
            key: key.to_string(),
            value: raw,
        }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            symbols: list_var("SYMBOLS", "GOLD,SPX,CSI300,US10Y"),
            portfolio_symbols: list_var("PORTFOLIO_SYMBOLS", "GOLD,SPX"),
            provider_base_url: env::var("PROVIDER_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9100".to_string()),
            artifact_dir: env::var("ARTIFACT_DIR")
                .unwrap_or_else(|_| "artifacts".to_string())
                .into(),
            serve_dir: env::var("SERVE_DIR")
                .unwrap_or_else(|_| "serve/bt".to_string())
                .into(),
            portfolio_serve_dir: env::var("PORTFOLIO_SERVE_DIR")
                .unwrap_or_else(|_| "serve/portfolio".to_string())
                .into(),
            checkpoint_path: env::var("CHECKPOINT_PATH")
                .unwrap_or_else(|_| "state/runs.jsonl".to_string())
                .into(),
            pid_file: env::var("PID_FILE")
                .unwrap_or_else(|_| "state/marketpulse.pid".to_string())
                .into(),
            http_port: parsed_var("HTTP_PORT", 9200u16)?,
            poll_interval_secs: parsed_var("POLL_INTERVAL_SECS", 1u64)?,
            calendar_path: env::var("CALENDAR_PATH").ok().map(PathBuf::from),
            scoring: ScoringConfig::default(),
        })
    }
}
