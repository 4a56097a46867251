//! Token-bucket rate limiter.
//!
//! One [`RateLimiter`] guards one resource (in practice: one registered
//! tool). The bucket holds at most `capacity` tokens and refills
//! continuously at `capacity / 60` tokens per second, so a full bucket
//! admits a burst of `capacity` calls and then one call per `60 / capacity`
//! seconds.
//!
//! Refill, decision and consumption happen inside a single critical section,
//! so concurrent callers of the same limiter serialize their token use.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::core::clock::{Clock, SystemClock};

/// Slack for clock rounding when a refill lands exactly on a whole token.
const TOKEN_EPSILON: f64 = 1e-9;

#[derive(Debug)]
struct BucketState {
    available: f64,
    last_refill: Instant,
}

/// Token bucket admitting up to `capacity` calls per minute.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    state: Mutex<BucketState>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a full bucket using the system clock.
    pub fn per_minute(calls_per_minute: u32) -> Self {
        Self::with_clock(f64::from(calls_per_minute), Arc::new(SystemClock))
    }

    /// Create a full bucket driven by the given clock.
    ///
    /// Non-finite or negative capacities are treated as zero, which denies
    /// every call.
    pub fn with_clock(capacity: f64, clock: Arc<dyn Clock>) -> Self {
        let capacity = if capacity.is_finite() { capacity.max(0.0) } else { 0.0 };
        let now = clock.now();
        Self {
            capacity,
            state: Mutex::new(BucketState {
                available: capacity,
                last_refill: now,
            }),
            clock,
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Try to take one token. Returns `false` when the bucket is empty.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut state);

        if state.available + TOKEN_EPSILON < 1.0 {
            return false;
        }

        state.available = (state.available - 1.0).max(0.0);
        true
    }

    /// Tokens currently available, after applying any pending refill.
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut state);
        state.available
    }

    fn refill(&self, state: &mut BucketState) {
        let now = self.clock.now();
        let elapsed = now
            .saturating_duration_since(state.last_refill)
            .as_secs_f64();
        state.last_refill = now;

        let refilled = state.available + elapsed * self.capacity / 60.0;
        state.available = refilled.clamp(0.0, self.capacity);
    }
}
