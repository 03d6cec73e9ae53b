//! Shared HTTP plumbing: client construction, sliding-window rate limiting,
//! politeness delays, and the robots gate consulted before external fetches.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jh_common::config::Config;
use rand::Rng;
use tracing::debug;

/// Rotated desktop user agents for outbound requests.
pub static USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

pub fn random_user_agent() -> &'static str {
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Build the reqwest client every adapter shares.
pub fn build_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(random_user_agent())
        .build()
}

/// Sliding-window rate limiter: at most `max_requests` within `window`.
/// `acquire` sleeps until a slot frees up.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    stamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            stamps: Mutex::new(VecDeque::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rate_limit_requests, config.rate_limit_window)
    }

    /// Time to wait before the next request may go out; records the request
    /// when no wait is needed.
    fn reserve(&self) -> Option<Duration> {
        let mut stamps = self
            .stamps
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();

        while let Some(front) = stamps.front() {
            if now.duration_since(*front) >= self.window {
                stamps.pop_front();
            } else {
                break;
            }
        }

        if (stamps.len() as u32) < self.max_requests {
            stamps.push_back(now);
            return None;
        }

        stamps
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
    }

    pub async fn acquire(&self) {
        loop {
            match self.reserve() {
                None => return,
                Some(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// Bounded random delay between successive requests to the same host. A
/// scheduling courtesy, not a correctness requirement; bypassable in tests.
#[derive(Debug, Clone)]
pub struct Politeness {
    delay_min: f64,
    delay_max: f64,
    bypass: bool,
}

impl Politeness {
    pub fn new(delay_min: f64, delay_max: f64) -> Self {
        Self {
            delay_min: delay_min.max(0.0),
            delay_max: delay_max.max(delay_min).max(0.0),
            bypass: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut politeness = Self::new(config.request_delay_min, config.request_delay_max);
        politeness.bypass = config.politeness_bypass;
        politeness
    }

    /// No delays at all; for tests and offline runs.
    pub fn bypassed() -> Self {
        Self {
            delay_min: 0.0,
            delay_max: 0.0,
            bypass: true,
        }
    }

    pub async fn pause(&self) {
        if self.bypass {
            return;
        }
        let secs = if self.delay_max > self.delay_min {
            rand::thread_rng().gen_range(self.delay_min..=self.delay_max)
        } else {
            self.delay_min
        };
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}

/// Opaque compliance gate consulted before every external fetch. The
/// coordinator only requires an answer, never the policy behind it.
#[async_trait]
pub trait FetchGate: Send + Sync {
    async fn allow(&self, url: &str) -> bool;
}

/// Gate that permits everything; the default outside curated deployments.
pub struct PermissiveGate;

#[async_trait]
impl FetchGate for PermissiveGate {
    async fn allow(&self, _url: &str) -> bool {
        true
    }
}
