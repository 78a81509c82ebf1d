//! Runtime configuration, read from the environment once at start-up
//!
//! `main` calls `dotenv` first, so every key can also live in a `.env` file.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://www.cmegroup.com/CmeWS/mvc/Settlements/Futures/Settlements";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 500;
pub const DEFAULT_DASHBOARD_PATH: &str = "settlements.html";
pub const DEFAULT_CHART_WIDTH: u32 = 1024;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;

/// The settlements endpoint rejects obvious non-browser clients
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub user_agent: String,
    /// Explicit trade date; skips trading-day resolution when set
    pub trade_date: Option<NaiveDate>,
    /// Closures to honour on top of the built-in NYSE calendar
    pub extra_closures: Vec<NaiveDate>,
    pub dashboard_path: PathBuf,
    pub chart_png_path: Option<PathBuf>,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            trade_date: None,
            extra_closures: Vec::new(),
            dashboard_path: PathBuf::from(DEFAULT_DASHBOARD_PATH),
            chart_png_path: None,
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        if let Some(url) = get("SETTLE_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get("SETTLE_TIMEOUT_SECS") {
            let secs = parse_positive("SETTLE_TIMEOUT_SECS", &raw)?;
            config.timeout = Duration::from_secs(secs as u64);
        }
        if let Some(raw) = get("SETTLE_PAGE_SIZE") {
            config.page_size = parse_positive("SETTLE_PAGE_SIZE", &raw)?;
        }
        if let Some(agent) = get("SETTLE_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = get("SETTLE_TRADE_DATE") {
            config.trade_date = Some(parse_date("SETTLE_TRADE_DATE", &raw)?);
        }
        if let Some(raw) = get("SETTLE_EXTRA_CLOSURES") {
            config.extra_closures = raw
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| parse_date("SETTLE_EXTRA_CLOSURES", d))
                .collect::<Result<_, _>>()?;
        }
        if let Some(path) = get("SETTLE_DASHBOARD_PATH") {
            config.dashboard_path = PathBuf::from(path);
        }
        if let Some(path) = get("SETTLE_CHART_PNG") {
            config.chart_png_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = get("SETTLE_CHART_WIDTH") {
            config.chart_width = parse_positive("SETTLE_CHART_WIDTH", &raw)?;
        }
        if let Some(raw) = get("SETTLE_CHART_HEIGHT") {
            config.chart_height = parse_positive("SETTLE_CHART_HEIGHT", &raw)?;
        }

        Ok(config)
    }
}

fn parse_date(key: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        expected: "a YYYY-MM-DD date",
    })
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            expected: "a positive integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 500);
        assert!(config.trade_date.is_none());
        assert!(config.chart_png_path.is_none());
        assert!(config.extra_closures.is_empty());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("SETTLE_BASE_URL", "http://localhost:8080/settlements/"),
            ("SETTLE_TIMEOUT_SECS", "5"),
            ("SETTLE_TRADE_DATE", "2024-01-05"),
            ("SETTLE_CHART_PNG", "out.png"),
            ("SETTLE_CHART_WIDTH", " "),
            ("SETTLE_EXTRA_CLOSURES", "2024-12-24, 2025-07-03,"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/settlements");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.trade_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(config.chart_png_path, Some(PathBuf::from("out.png")));
        assert_eq!(config.chart_width, DEFAULT_CHART_WIDTH);
        assert_eq!(
            config.extra_closures,
            vec![
                NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
                NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()
            ]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SETTLE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("SETTLE_TIMEOUT_SECS"));

        let err = Config::from_lookup(lookup_from(&[("SETTLE_TRADE_DATE", "01/05/2024")])).unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));

        let err = Config::from_lookup(lookup_from(&[("SETTLE_EXTRA_CLOSURES", "2024-12-24,12/31")])).unwrap_err();
        assert!(err.to_string().contains("SETTLE_EXTRA_CLOSURES"));
        assert!(err.to_string().contains("'12/31'"));
    }
}
