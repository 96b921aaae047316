//! Login rate limiting.
//!
//! A token bucket per client key. Each key starts with a full bucket of
//! `capacity` attempts; attempts drain it and it refills proportionally
//! over `refill_period` (one attempt back every `refill_period / capacity`).
//! All attempts drain the bucket regardless of whether the login succeeds.
//!
//! Buckets are kept in a [`DashMap`] keyed by client key; a key's entry
//! guard serializes concurrent attempts for that key, so exactly `capacity`
//! of N simultaneous first attempts can pass. Keys are never removed, which
//! is acceptable for the expected client population; a bounded map would be
//! the first change for a public deployment.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

/// Per-client-key token bucket rate limiter.
///
/// Uses the monotonic clock, so wall-clock adjustments cannot grant or
/// withhold attempts.
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: u32,
    per_token: Duration,
}

impl RateLimiter {
    /// Creates a limiter from validated configuration.
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: config.capacity,
            per_token: config.refill_period / config.capacity,
        }
    }

    /// Attempts to consume one token for `key`.
    ///
    /// Returns `true` if the attempt may proceed, `false` if the bucket is
    /// empty and the caller must be refused.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    /// Returns how many attempts `key` has left right now, without
    /// consuming any. An unseen key has a full bucket.
    #[must_use]
    pub fn available(&self, key: &str) -> u32 {
        self.available_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket {
                tokens: self.capacity,
                last_refill: now,
            });

        Self::refill(&mut entry, self.capacity, self.per_token, now);

        if entry.tokens > 0 {
            entry.tokens -= 1;
            true
        } else {
            warn!(client_key = key, "Login rate limit exceeded");
            false
        }
    }

    fn available_at(&self, key: &str, now: Instant) -> u32 {
        match self.buckets.get(key) {
            Some(entry) => {
                let mut bucket = *entry;
                Self::refill(&mut bucket, self.capacity, self.per_token, now);
                bucket.tokens
            }
            None => self.capacity,
        }
    }

    /// Credits earned tokens and advances `last_refill` by exactly the time
    /// those tokens cost, so fractional progress toward the next token is
    /// never lost.
    fn refill(bucket: &mut Bucket, capacity: u32, per_token: Duration, now: Instant) {
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if per_token.is_zero() {
            bucket.tokens = capacity;
            bucket.last_refill = now;
            return;
        }

        let earned = (elapsed.as_nanos() / per_token.as_nanos()) as u64;
        if earned == 0 {
            return;
        }

        let earned = earned.min(u64::from(capacity)) as u32;
        if bucket.tokens.saturating_add(earned) >= capacity {
            bucket.tokens = capacity;
            bucket.last_refill = now;
        } else {
            bucket.tokens += earned;
            bucket.last_refill += per_token * earned;
        }
    }
}
