//! Advisory fixed-window rate limiting keyed by `identifier:action`.
//!
//! State lives in the [`RateLimiter`] value itself; share it with `Arc`. Windows
//! are only replaced lazily when a caller arrives after `reset_time`, nothing is
//! evicted in the background.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;


/// Source of wall-clock time in Unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn starting_at(millis: i64) -> Self {
        Self {
            now: AtomicI64::new(millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(duration_millis(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Default request budget applied by the portfolio service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// End of the current window, Unix epoch milliseconds.
    pub reset_time: i64,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    reset_time: i64,
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, WindowState>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one request against `identifier:action`.
    ///
    /// A window expires once `now >= reset_time`; the next call opens a fresh
    /// window and is allowed. A budget of zero denies every call.
    pub fn check(
        &self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        window: Duration,
    ) -> RateLimitDecision {
        let now = self.clock.now_millis();
        let window_end = now.saturating_add(duration_millis(window));

        if max_requests == 0 {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_time: window_end,
            };
        }

        let key = format!("{identifier}:{action}");
        let mut windows = self.windows();

        match windows.get_mut(&key) {
            Some(state) if now < state.reset_time => {
                if state.count >= max_requests {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_time: state.reset_time,
                    };
                }

                state.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: max_requests - state.count,
                    reset_time: state.reset_time,
                }
            }
            _ => {
                windows.insert(
                    key,
                    WindowState {
                        count: 1,
                        reset_time: window_end,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: max_requests - 1,
                    reset_time: window_end,
                }
            }
        }
    }

    pub fn check_policy(
        &self,
        identifier: &str,
        action: &str,
        policy: &RateLimitPolicy,
    ) -> RateLimitDecision {
        self.check(identifier, action, policy.max_requests, policy.window)
    }

    /// Number of `identifier:action` keys with a recorded window.
    pub fn tracked_keys(&self) -> usize {
        self.windows().len()
    }

    // `check` never leaves the map half-updated, so a poisoned lock is reused.
    fn windows(&self) -> MutexGuard<'_, HashMap<String, WindowState>> {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
