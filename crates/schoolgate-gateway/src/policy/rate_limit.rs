//! Per-principal fixed-window rate limiter.
//!
//! Each principal gets a window of length `W` and a capacity `C`. The first
//! request after the window has elapsed resets the count to 1. Because the
//! window is fixed, a principal can burst up to `2C` requests across a window
//! boundary. The map is per process; multi-instance deployments need a shared
//! keyed counter store.
//!
//! Lifecycle: the map is created with the application state, entries are
//! overwritten when their window elapses, and [`FixedWindowLimiter::sweep`]
//! removes stale entries (the binary runs it periodically).

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    window_start: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    capacity: u32,
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, capacity: u32) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            entries: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of principals currently tracked.
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }

    pub fn allow(&self, principal_id: &str) -> bool {
        self.check(principal_id).is_allowed()
    }

    pub fn check(&self, principal_id: &str) -> RateDecision {
        self.check_at(principal_id, Instant::now())
    }

    /// Read-check-increment for one principal.
    ///
    /// `entry` holds the shard write lock for the whole sequence, so
    /// concurrent requests from the same principal are counted exactly.
    pub fn check_at(&self, principal_id: &str, now: Instant) -> RateDecision {
        let mut entry = self
            .entries
            .entry(principal_id.to_owned())
            .or_insert(WindowEntry {
                window_start: now,
                count: 0,
            });
        let e = entry.value_mut();

        if e.count == 0 || now.saturating_duration_since(e.window_start) > self.window {
            *e = WindowEntry {
                window_start: now,
                count: 1,
            };
            return RateDecision::Allowed {
                remaining: self.capacity - 1,
            };
        }

        if e.count < self.capacity {
            e.count += 1;
            return RateDecision::Allowed {
                remaining: self.capacity - e.count,
            };
        }

        RateDecision::Limited {
            retry_after: (e.window_start + self.window).saturating_duration_since(now),
        }
    }

    /// Drop entries whose window has elapsed. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.window_start) <= self.window);
        let removed = before.saturating_sub(self.entries.len());
        tracing::debug!(removed, remaining = self.entries.len(), "rate limit sweep");
        removed
    }

    /// Run [`sweep`](Self::sweep) on a fixed interval until the runtime shuts down.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tick.tick().await;
            loop {
                tick.tick().await;
                self.sweep(Instant::now());
            }
        })
    }
}
