//! Minimum spacing between outbound sends.
//!
//! The venue rejects actions that arrive too close together. The throttle
//! measures from the last *successful* send: a failed request does not push
//! the next one back. Callers wait; nothing is dropped.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Throttle configuration.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Minimum time between two successful sends.
    pub min_interval: Duration,
    /// Extra wait added whenever the throttle has to wait at all.
    pub slack: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
            slack: Duration::from_millis(100),
        }
    }
}

/// Send throttle shared by every outbound action of a session.
#[derive(Debug)]
pub struct SendThrottle {
    config: ThrottleConfig,
    last_success: Mutex<Option<Instant>>,
}

impl SendThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            last_success: Mutex::new(None),
        }
    }

    /// How long a send issued now would have to wait.
    pub async fn wait_time(&self) -> Duration {
        let last = *self.last_success.lock().await;
        match last {
            Some(at) => {
                let elapsed = at.elapsed();
                if elapsed < self.config.min_interval {
                    self.config.min_interval - elapsed + self.config.slack
                } else {
                    Duration::ZERO
                }
            }
            None => Duration::ZERO,
        }
    }

    /// Sleep until a send is allowed.
    pub async fn wait(&self) {
        let delay = self.wait_time().await;
        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis() as u64, "throttling send");
            tokio::time::sleep(delay).await;
        }
    }

    /// Mark a send as accepted by the venue.
    pub async fn record_success(&self) {
        *self.last_success.lock().await = Some(Instant::now());
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }
}
