use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::errors::AppError;

/// How often idle buckets are swept, piggybacking on regular checks.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A token bucket which allows fractional tokens for precise refill
#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, refill_per_sec: f64, now: Instant) -> Self {
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        if elapsed > 0.0 {
            self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Takes one token, or returns how many whole seconds until one is available.
    fn try_consume(&mut self, now: Instant) -> Result<(), u64> {
        self.refill(now);
        // epsilon to avoid fp surprises
        if self.tokens + 1e-12 >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let needed = 1.0 - self.tokens;
            Err(((needed / self.refill_per_sec).ceil() as u64).max(1))
        }
    }

    fn is_full(&mut self, now: Instant) -> bool {
        self.refill(now);
        self.tokens + 1e-12 >= self.capacity
    }
}

/// Per-client budget for admin login attempts.
#[derive(Clone)]
pub struct LoginRateLimiter {
    buckets: Arc<DashMap<String, Arc<Mutex<TokenBucket>>>>,
    capacity: f64,
    refill_per_sec: f64,
    last_sweep: Arc<Mutex<Instant>>,
}

impl LoginRateLimiter {
    pub fn new(attempts_per_minute: u32) -> Self {
        let capacity = f64::from(attempts_per_minute.max(1));
        Self {
            buckets: Arc::new(DashMap::new()),
            capacity,
            refill_per_sec: capacity / 60.0,
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Spends one attempt for `key`.
    pub fn check(&self, key: &str) -> Result<(), AppError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), AppError> {
        self.sweep_idle(now);

        let bucket = self.get_bucket(key, now);
        let mut bucket = bucket.lock();
        bucket.try_consume(now).map_err(|retry_after_secs| {
            tracing::warn!(client = %key, retry_after_secs, "Login attempts exhausted");
            AppError::RateLimited { retry_after_secs }
        })
    }

    fn get_bucket(&self, key: &str, now: Instant) -> Arc<Mutex<TokenBucket>> {
        if let Some(existing) = self.buckets.get(key) {
            return existing.clone();
        }
        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(TokenBucket::new(self.capacity, self.refill_per_sec, now)))
            })
            .clone()
    }

    /// Drops buckets that have refilled completely; they behave like fresh ones.
    fn sweep_idle(&self, now: Instant) {
        {
            let mut last_sweep = self.last_sweep.lock();
            if now.duration_since(*last_sweep) < SWEEP_INTERVAL {
                return;
            }
            *last_sweep = now;
        }
        self.buckets.retain(|_, bucket| !bucket.lock().is_full(now));
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}
