use std::env;
use std::str::FromStr;
use std::time::Duration;

use emi_core::remote::ClassifierConfig;

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut classifier = ClassifierConfig::default();

        if let Some(url) = lookup("EMI_CLASSIFIER_URL").filter(|u| !u.trim().is_empty()) {
            classifier.endpoint = url;
        }
        if let Some(secs) = parse::<u64>(&lookup, "EMI_CLASSIFIER_TIMEOUT_SECS", "whole seconds")? {
            classifier.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse(&lookup, "EMI_CLASSIFIER_MAX_RETRIES", "a retry count")? {
            classifier.max_retries = retries;
        }
        if let Some(ms) = parse::<u64>(&lookup, "EMI_CLASSIFIER_BACKOFF_MS", "milliseconds")? {
            classifier.backoff_base = Duration::from_millis(ms);
        }
        if let Some(secs) = parse::<u64>(&lookup, "EMI_CACHE_TTL_SECS", "whole seconds")? {
            classifier.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(capacity) = parse(&lookup, "EMI_CACHE_CAPACITY", "an entry count")? {
            classifier.cache_capacity = capacity;
        }

        Ok(Self {
            classifier,
            log_level: lookup("EMI_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name,
                value: raw,
                expected,
            }),
    }
}
