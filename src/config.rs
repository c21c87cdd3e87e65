//! Static session configuration.
//!
//! Values come from an optional TOML file followed by `FXTRADER__*`
//! environment variables. Every field has a default.

use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::session::RetryPolicy;
use crate::strategy::{StrategyKind, TradingHours};

pub const ENV_PREFIX: &str = "FXTRADER";
pub const DEFAULT_CONFIG_FILE: &str = "fxtrader.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub instrument: String,
    /// Bar duration string, e.g. "1min", "5min", "30s"
    pub bar_length: String,
    /// Units per position block
    pub units: i64,
    pub duration_minutes: i64,
    /// Inclusive [start, end] hour window
    pub trading_hours: (u32, u32),
    pub trading_timezone: String,
    pub history_days: i64,
    pub history_granularity: String,
    pub max_bars: usize,
    pub retry: RetrySettings,
    pub strategy: StrategyKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            instrument: "EUR_USD".to_string(),
            bar_length: "1min".to_string(),
            units: 1000,
            duration_minutes: 100,
            trading_hours: (0, 23),
            trading_timezone: "America/New_York".to_string(),
            history_days: 5,
            history_granularity: "S5".to_string(),
            max_bars: 10_000,
            retry: RetrySettings::default(),
            strategy: StrategyKind::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub initial_wait_secs: u64,
    pub wait_increase_secs: u64,
    pub max_attempts: Option<u32>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            initial_wait_secs: 15,
            wait_increase_secs: 0,
            max_attempts: None,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        RetryPolicy::new(
            std::time::Duration::from_secs(settings.initial_wait_secs),
            std::time::Duration::from_secs(settings.wait_increase_secs),
            settings.max_attempts,
        )
    }
}

impl SessionConfig {
    /// Load from `path` (if it exists) and the environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: SessionConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.trim().is_empty() {
            return Err(ConfigError::Invalid("instrument must not be empty".into()));
        }
        if self.units <= 0 {
            return Err(ConfigError::Invalid(format!(
                "units must be positive, got {}",
                self.units
            )));
        }
        if self.duration_minutes <= 0 {
            return Err(ConfigError::Invalid(format!(
                "duration_minutes must be positive, got {}",
                self.duration_minutes
            )));
        }
        if self.history_days <= 0 {
            return Err(ConfigError::Invalid("history_days must be positive".into()));
        }
        if self.max_bars == 0 {
            return Err(ConfigError::Invalid("max_bars must be positive".into()));
        }
        self.bar_length()?;
        parse_duration(&self.history_granularity)?;
        self.trading_window()?;
        let strategy = self
            .strategy
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.max_bars < strategy.min_lookback() {
            return Err(ConfigError::Invalid(format!(
                "max_bars {} is below the {} strategy's lookback of {} bars",
                self.max_bars,
                strategy.name(),
                strategy.min_lookback()
            )));
        }
        Ok(())
    }

    pub fn bar_length(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.bar_length)
    }

    pub fn session_duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes)
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.trading_timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.trading_timezone.clone()))
    }

    pub fn trading_window(&self) -> Result<TradingHours, ConfigError> {
        let (start, end) = self.trading_hours;
        if start > 23 || end > 23 || start > end {
            return Err(ConfigError::Invalid(format!(
                "trading hours must satisfy 0 <= start <= end <= 23, got ({start}, {end})"
            )));
        }
        Ok(TradingHours::new(start, end, self.timezone()?))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }
}

/// Parse a bar length or history granularity.
///
/// Accepts `<n><unit>` ("1min", "30s", "4h", "1D") and the broker
/// granularity form `<unit><n>` ("S5", "M1", "H4").
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());
    let s = input.trim();

    let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
    let (count, unit) = if split == 0 {
        match s.find(|c: char| c.is_ascii_digit()) {
            Some(i) => {
                let (unit, count) = s.split_at(i);
                (count, unit)
            }
            None => ("1", s),
        }
    } else {
        s.split_at(split)
    };

    let count: i64 = count.parse().map_err(|_| invalid())?;
    if count <= 0 {
        return Err(invalid());
    }

    let seconds_per_unit = match unit {
        "s" | "S" | "sec" | "secs" => 1,
        "min" | "T" | "m" | "M" => 60,
        "h" | "H" => 3_600,
        "d" | "D" => 86_400,
        _ => return Err(invalid()),
    };

    count
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}
