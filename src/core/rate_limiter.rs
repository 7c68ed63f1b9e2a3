use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_CALLS_PER_MINUTE: u32 = 60;

/// Sliding-window throttle: at most `max_calls` acquisitions within any
/// `window`. Never rejects a call, only delays it.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    recent: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        let max_calls = max_calls.max(1) as usize;
        Self {
            max_calls,
            window,
            recent: VecDeque::with_capacity(max_calls),
        }
    }

    pub fn per_minute(calls: u32) -> Self {
        Self::new(calls, Duration::from_secs(60))
    }

    /// Waits until one more call fits in the window, then records it.
    pub async fn acquire(&mut self) {
        loop {
            let now = Instant::now();
            while let Some(&oldest) = self.recent.front() {
                if now.duration_since(oldest) >= self.window {
                    self.recent.pop_front();
                } else {
                    break;
                }
            }

            if self.recent.len() < self.max_calls {
                self.recent.push_back(now);
                return;
            }

            if let Some(&oldest) = self.recent.front() {
                let ready_at = oldest + self.window;
                tracing::debug!(
                    "Rate limit of {} calls per {:?} reached, waiting {:?}",
                    self.max_calls,
                    self.window,
                    ready_at.saturating_duration_since(now)
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_minute(DEFAULT_CALLS_PER_MINUTE)
    }
}
