//! Application configuration.

use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Matcher configuration.
    pub matchers: MatcherConfig,
    /// Strategy configuration.
    pub strategies: StrategyConfig,
    /// Suspension service configuration.
    pub suspensions: SuspensionConfig,
}

/// Matcher configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Execution bounds for the regex matcher.
    pub regex: RegexLimits,
}

/// Execution bounds applied to every regex pattern evaluation.
///
/// The engine runs in linear time, so the bounds are enforced per compiled
/// pattern rather than through process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegexLimits {
    /// Maximum size of a compiled program, in bytes.
    pub size_limit: usize,
    /// Maximum size of the lazy DFA cache, in bytes.
    pub dfa_size_limit: usize,
    /// Maximum nesting depth accepted by the pattern parser.
    pub nest_limit: u32,
    /// Maximum length of a stored pattern, in bytes.
    pub max_pattern_length: usize,
}

impl Default for RegexLimits {
    fn default() -> Self {
        Self {
            size_limit: default_size_limit(),
            dfa_size_limit: default_dfa_size_limit(),
            nest_limit: default_nest_limit(),
            max_pattern_length: default_max_pattern_length(),
        }
    }
}

/// Strategy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// IANA timezone used by time windows that don't name one.
    pub default_timezone: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
        }
    }
}

/// Suspension service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuspensionConfig {
    /// Maximum length of a suspension reason.
    pub max_reason_length: usize,
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            max_reason_length: default_max_reason_length(),
        }
    }
}

const fn default_size_limit() -> usize {
    1024 * 1024
}

const fn default_dfa_size_limit() -> usize {
    2 * 1024 * 1024
}

const fn default_nest_limit() -> u32 {
    250
}

const fn default_max_pattern_length() -> usize {
    4096
}

fn default_timezone() -> String {
    "UTC".to_string()
}

const fn default_max_reason_length() -> usize {
    1000
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `SANCTION_ENV`)
    /// 4. Environment variables with `SANCTION_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("SANCTION_ENV").unwrap_or_else(|_| "development".to_string());
        tracing::debug!(environment = %env, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(Self::environment())
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;

        config.try_deserialize()
    }

    /// `SANCTION_` variables, with `__` between nested keys
    /// (`SANCTION_STRATEGIES__DEFAULT_TIMEZONE`).
    fn environment() -> config::Environment {
        config::Environment::with_prefix("SANCTION")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Regex execution bounds.
    #[must_use]
    pub const fn regex_limits(&self) -> RegexLimits {
        self.matchers.regex
    }

    /// Parse the configured default timezone.
    pub fn default_timezone(&self) -> AppResult<Tz> {
        self.strategies
            .default_timezone
            .parse::<Tz>()
            .map_err(|e| {
                AppError::Config(format!(
                    "Invalid default timezone '{}': {e}",
                    self.strategies.default_timezone
                ))
            })
    }
}
