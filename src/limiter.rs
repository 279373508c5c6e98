//! Client-side rate limiting for provider requests.
//!
//! A sliding 60-second window, enforced before every outbound request to
//! reduce the chance of upstream IP banning. The check-and-record step runs
//! under a mutex so concurrent request handlers cannot overshoot the limit;
//! callers past the limit are delayed until a slot frees, never dropped.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window rate limiter. A limit of zero disables pacing.
pub struct RateLimiter {
    requests_per_minute: u32,
    issued: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            issued: Mutex::new(VecDeque::new()),
        }
    }

    /// Record one request if the window has room, or return how long the
    /// caller must wait for the oldest recorded request to leave the window.
    pub fn try_acquire(&self) -> std::result::Result<(), Duration> {
        if self.requests_per_minute == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut issued = self.issued.lock().expect("rate limiter lock poisoned");

        while let Some(front) = issued.front() {
            if now.duration_since(*front) >= WINDOW {
                issued.pop_front();
            } else {
                break;
            }
        }

        if (issued.len() as u32) < self.requests_per_minute {
            issued.push_back(now);
            Ok(())
        } else {
            let oldest = *issued.front().expect("window is full but empty");
            Err(WINDOW - now.duration_since(oldest))
        }
    }

    /// Wait until a request slot is available, then claim it.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait) => {
                    debug!("Rate limit reached, waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

/// Per-client inbound limiter: one sliding window per client IP, protecting
/// the service itself from a single abusive caller. Distinct from the
/// outbound [`RateLimiter`] the resolver uses to pace provider requests.
///
/// Client entries persist for the life of the process; the per-client queues
/// are bounded by the limit itself.
pub struct KeyedRateLimiter {
    requests_per_minute: u32,
    clients: Mutex<HashMap<IpAddr, RateLimiter>>,
}

impl KeyedRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for the client if its window has room, or return
    /// how long the client must wait. A limit of zero disables limiting.
    pub fn try_acquire(&self, client: IpAddr) -> std::result::Result<(), Duration> {
        if self.requests_per_minute == 0 {
            return Ok(());
        }

        let mut clients = self.clients.lock().expect("inbound limiter lock poisoned");
        clients
            .entry(client)
            .or_insert_with(|| RateLimiter::new(self.requests_per_minute))
            .try_acquire()
    }
}
