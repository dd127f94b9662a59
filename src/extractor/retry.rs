//! Bounded retry with client identity rotation
//!
//! Transient failures (403 blocks, generic extraction errors, flaky HTTP)
//! are retried with a delay that grows with the attempt number. Terminal
//! classifications such as private or age-restricted videos are returned on
//! the first occurrence.

use crate::utils::config::AppSettings;
use crate::utils::error::{MediagrabError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Retry configuration
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            max_attempts: settings.retry_attempts.max(1),
            base_delay: settings.retry_base_delay(),
        }
    }

    /// No waiting between attempts
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
        }
    }

    /// Delay after the zero-based `attempt` failed with `error`
    pub fn delay_for(&self, attempt: usize, error: &MediagrabError) -> Duration {
        let steps = if error.is_blocked() { 2 + attempt } else { 1 + attempt };
        self.base_delay * steps as u32
    }
}

/// Rotating set of browser identification strings
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
    offset: usize,
}

impl Default for UserAgentPool {
    fn default() -> Self {
        let offset = rand::thread_rng().gen_range(0..USER_AGENTS.len());
        Self {
            agents: USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            offset,
        }
    }
}

impl UserAgentPool {
    /// Fixed pool starting at the first agent
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents, offset: 0 }
    }

    /// Agent used for the zero-based `attempt`
    pub fn for_attempt(&self, attempt: usize) -> &str {
        if self.agents.is_empty() {
            return USER_AGENTS[0];
        }
        &self.agents[(self.offset + attempt) % self.agents.len()]
    }
}

/// Run `op` until it succeeds, fails terminally, or attempts run out.
///
/// `op` receives the zero-based attempt number and the user agent for it.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    agents: &UserAgentPool,
    what: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut(usize, String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let user_agent = agents.for_attempt(attempt).to_string();
        match op(attempt, user_agent).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", what, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = policy.delay_for(attempt, &e);
                warn!(
                    "{} attempt {} failed: {}. Retrying in {:?}...",
                    what,
                    attempt + 1,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!("{} failed after {} attempts: {}", what, attempt + 1, e);
                }
                return Err(e);
            }
        }
    }
}
