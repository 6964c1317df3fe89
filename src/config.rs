//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by the
//! binary):
//! - `EARNINGS_TIME_SCALE` - Optional. Multiplier for task durations. Defaults to `1.0`.
//! - `EARNINGS_RESET_DELAY_MS` - Optional. Completed -> available delay. Defaults to `3000`.
//! - `EARNINGS_GUARD` - Optional. `strict` or `permissive`. Defaults to `strict`.
//! - `EARNINGS_OUTPUT` - Optional. Dashboard format, `text` or `json`. Defaults to `text`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::lifecycle::{EngineConfig, GuardPolicy};

pub const TIME_SCALE_VAR: &str = "EARNINGS_TIME_SCALE";
pub const RESET_DELAY_VAR: &str = "EARNINGS_RESET_DELAY_MS";
pub const GUARD_VAR: &str = "EARNINGS_GUARD";
pub const OUTPUT_VAR: &str = "EARNINGS_OUTPUT";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// How the binary prints the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputFormat,
}

impl Config {
    /// Reads configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// anything unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let time_scale = match lookup(TIME_SCALE_VAR) {
            Some(raw) => {
                let scale: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid(TIME_SCALE_VAR, &raw))?;
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(invalid(TIME_SCALE_VAR, &raw));
                }
                scale
            }
            None => {
                tracing::warn!("{} not set, using default {}", TIME_SCALE_VAR, defaults.time_scale);
                defaults.time_scale
            }
        };

        let reset_delay = match lookup(RESET_DELAY_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| invalid(RESET_DELAY_VAR, &raw))?,
            None => {
                tracing::warn!("{} not set, using default {:?}", RESET_DELAY_VAR, defaults.reset_delay);
                defaults.reset_delay
            }
        };

        let guard = match lookup(GUARD_VAR) {
            Some(raw) => raw
                .parse::<GuardPolicy>()
                .map_err(|_| invalid(GUARD_VAR, &raw))?,
            None => {
                tracing::warn!("{} not set, using default {}", GUARD_VAR, defaults.guard);
                defaults.guard
            }
        };

        let output = match lookup(OUTPUT_VAR) {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map_err(|_| invalid(OUTPUT_VAR, &raw))?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            engine: EngineConfig {
                guard,
                time_scale,
                reset_delay,
                ..defaults
            },
            output,
        })
    }
}

fn invalid(key: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.engine.time_scale, 1.0);
        assert_eq!(config.engine.reset_delay, Duration::from_secs(3));
        assert_eq!(config.engine.guard, GuardPolicy::Strict);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            (TIME_SCALE_VAR, "0.25"),
            (RESET_DELAY_VAR, "500"),
            (GUARD_VAR, "permissive"),
            (OUTPUT_VAR, "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.engine.time_scale, 0.25);
        assert_eq!(config.engine.reset_delay, Duration::from_millis(500));
        assert_eq!(config.engine.guard, GuardPolicy::Permissive);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn rejects_non_positive_time_scale() {
        let err = Config::from_lookup(lookup_from(&[(TIME_SCALE_VAR, "0")])).unwrap_err();

        assert_eq!(
            err,
            ConfigError::InvalidValue(TIME_SCALE_VAR.to_string(), "0".to_string())
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(Config::from_lookup(lookup_from(&[(RESET_DELAY_VAR, "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(GUARD_VAR, "lenient")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(OUTPUT_VAR, "yaml")])).is_err());
    }
}
