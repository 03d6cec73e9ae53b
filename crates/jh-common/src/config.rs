//! Runtime configuration resolved from `JH_`-prefixed environment variables.

use std::time::Duration;

use crate::ranking::RankingWeights;

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Options recognized by the acquisition and ranking core.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub github_token: Option<String>,
    /// Per-request timeout for adapter fetches.
    pub request_timeout: Duration,
    /// Bounds of the politeness delay between requests to the same host.
    pub request_delay_min: f64,
    pub request_delay_max: f64,
    /// Sliding-window rate limit applied to job-board API calls.
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    /// Skip politeness delays entirely (test/bypass configurations).
    pub politeness_bypass: bool,
    /// Weights applied when preferences carry no explicit map.
    pub default_weights: RankingWeights,
    /// Score thresholds consumed by downstream notifiers, not by the core.
    pub high_score_threshold: f64,
    pub medium_score_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            github_token: None,
            request_timeout: Duration::from_secs(30),
            request_delay_min: 1.0,
            request_delay_max: 3.0,
            rate_limit_requests: 60,
            rate_limit_window: Duration::from_secs(60),
            politeness_bypass: false,
            default_weights: RankingWeights::default(),
            high_score_threshold: 0.8,
            medium_score_threshold: 0.6,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            github_token: std::env::var("JH_GITHUB_TOKEN").ok(),
            request_timeout: Duration::from_secs(env_parse(
                "JH_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            request_delay_min: env_parse("JH_REQUEST_DELAY_MIN", defaults.request_delay_min),
            request_delay_max: env_parse("JH_REQUEST_DELAY_MAX", defaults.request_delay_max),
            rate_limit_requests: env_parse("JH_RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            rate_limit_window: Duration::from_secs(env_parse(
                "JH_RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window.as_secs(),
            )),
            politeness_bypass: env_flag("JH_POLITENESS_BYPASS"),
            default_weights: RankingWeights {
                keywords: env_parse("JH_WEIGHT_KEYWORDS", defaults.default_weights.keywords),
                location: env_parse("JH_WEIGHT_LOCATION", defaults.default_weights.location),
                salary: env_parse("JH_WEIGHT_SALARY", defaults.default_weights.salary),
                experience: env_parse("JH_WEIGHT_EXPERIENCE", defaults.default_weights.experience),
                company: env_parse("JH_WEIGHT_COMPANY", defaults.default_weights.company),
                freshness: env_parse("JH_WEIGHT_FRESHNESS", defaults.default_weights.freshness),
            },
            high_score_threshold: env_parse(
                "JH_HIGH_SCORE_THRESHOLD",
                defaults.high_score_threshold,
            ),
            medium_score_threshold: env_parse(
                "JH_MEDIUM_SCORE_THRESHOLD",
                defaults.medium_score_threshold,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.request_delay_min <= config.request_delay_max);
        assert!(config.rate_limit_requests > 0);
        assert!((config.default_weights.sum() - 1.0).abs() < 1e-9);
        assert!(config.medium_score_threshold < config.high_score_threshold);
    }

    #[test]
    fn env_parse_falls_back_on_garbage() {
        assert_eq!(env_parse("JH_DOES_NOT_EXIST", 42_u32), 42);
    }
}
