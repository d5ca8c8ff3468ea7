//! lint::throttle
//!
//! Fixed-window rate limiter.
//!
//! At most `limit` operations may start within one window. The limiter
//! only counts starts; how many operations are still outstanding is the
//! caller's concern.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

/// Limits how many operations start per window.
#[derive(Debug)]
pub struct Throttle {
    limit: usize,
    window: Duration,
    window_start: Option<Instant>,
    started: usize,
}

impl Throttle {
    /// Allow `limit` starts (at least one) per `window`.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            window_start: None,
            started: 0,
        }
    }

    /// Wait until another operation may start, and count it.
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        let mut start = match self.window_start {
            Some(start) if now.duration_since(start) < self.window => start,
            _ => {
                self.started = 0;
                now
            }
        };

        if self.started >= self.limit {
            let next = start + self.window;
            tracing::trace!(limit = self.limit, "window full, waiting");
            sleep_until(next).await;
            start = next;
            self.started = 0;
        }

        self.window_start = Some(start);
        self.started += 1;
    }
}
