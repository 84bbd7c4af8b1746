use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Ranking configuration, loaded from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    /// Leading feed slots recorded into the recency cache after placement.
    pub top_window: usize,
    /// Bound on the recent-top id set; `None` grows until explicitly
    /// cleared.
    pub recent_ids_capacity: Option<usize>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_window: 3,
            recent_ids_capacity: None,
        }
    }
}

impl RankingConfig {
    /// Load from `TOP_WINDOW` / `RECENT_IDS_CAPACITY`, falling back to
    /// defaults when unset. Malformed values are reported, not defaulted.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            top_window: parse_var("TOP_WINDOW", "usize", defaults.top_window)?,
            recent_ids_capacity: parse_optional_var("RECENT_IDS_CAPACITY", "usize")?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            var,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_optional_var<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var,
                expected,
                value,
            }),
        _ => Ok(None),
    }
}
