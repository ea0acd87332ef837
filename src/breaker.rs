//! Circuit breaker guarding the upstream model endpoint.
//!
//! ```text
//! Closed   -> Open:     consecutive failures reach the threshold
//! Open     -> HalfOpen: cooldown elapsed
//! HalfOpen -> Closed:   every trial request succeeded
//! HalfOpen -> Open:     any trial request failed
//! ```
//!
//! Each transition, and each rolling-interval reset while closed, starts a
//! new generation. Outcomes reported for an older generation are dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

use crate::error::{FastOrderError, Result};
use crate::types::{BreakerConfig, CircuitState, Counts};

struct Inner {
    state: CircuitState,
    generation: u64,
    counts: Counts,
    expiry: Option<Instant>,
}

impl Inner {
    /// Resolve time-based transitions and return the effective state
    fn current_state(&mut self, config: &BreakerConfig, now: Instant) -> CircuitState {
        match self.state {
            CircuitState::Closed => {
                if self.expiry.is_some_and(|expiry| expiry <= now) {
                    self.new_generation(config, now);
                }
            }
            CircuitState::Open => {
                if self.expiry.is_some_and(|expiry| expiry <= now) {
                    self.set_state(config, CircuitState::HalfOpen, now);
                }
            }
            CircuitState::HalfOpen => {}
        }
        self.state
    }

    fn set_state(&mut self, config: &BreakerConfig, state: CircuitState, now: Instant) {
        if self.state == state {
            return;
        }
        let previous = self.state;
        self.state = state;
        self.new_generation(config, now);

        match state {
            CircuitState::Open => {
                tracing::warn!(breaker = %config.name, from = %previous, to = %state, "circuit breaker tripped")
            }
            _ => {
                tracing::info!(breaker = %config.name, from = %previous, to = %state, "circuit breaker state changed")
            }
        }
    }

    fn new_generation(&mut self, config: &BreakerConfig, now: Instant) {
        self.generation += 1;
        self.counts.clear();
        self.expiry = match self.state {
            CircuitState::Closed if config.interval.is_zero() => None,
            CircuitState::Closed => Some(now + config.interval),
            CircuitState::Open => Some(now + config.cooldown),
            CircuitState::HalfOpen => None,
        };
    }

    fn on_success(&mut self, config: &BreakerConfig, state: CircuitState, now: Instant) {
        match state {
            CircuitState::Closed => self.counts.on_success(),
            CircuitState::HalfOpen => {
                self.counts.on_success();
                if self.counts.consecutive_successes >= config.max_trial_requests {
                    self.set_state(config, CircuitState::Closed, now);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&mut self, config: &BreakerConfig, state: CircuitState, now: Instant) {
        match state {
            CircuitState::Closed => {
                self.counts.on_failure();
                if self.counts.consecutive_failures >= config.failure_threshold {
                    self.set_state(config, CircuitState::Open, now);
                }
            }
            CircuitState::HalfOpen => self.set_state(config, CircuitState::Open, now),
            CircuitState::Open => {}
        }
    }
}

/// Thread-safe circuit breaker
///
/// All reads and transitions happen under one mutex, so concurrent callers
/// see a single consistent state machine and the half-open quota is exact.
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        let mut inner = Inner {
            state: CircuitState::Closed,
            generation: 0,
            counts: Counts::default(),
            expiry: None,
        };
        inner.new_generation(&config, Instant::now());

        Self {
            config,
            inner: Mutex::new(inner),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current state, after applying any due timeouts
    pub fn state(&self) -> CircuitState {
        let now = Instant::now();
        self.lock().current_state(&self.config, now)
    }

    /// Counters for the current generation
    pub fn counts(&self) -> Counts {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.current_state(&self.config, now);
        inner.counts
    }

    /// Ask to make one upstream call
    ///
    /// Fails with `CircuitOpen` while open and with `TooManyTrialRequests`
    /// once the half-open quota is taken. The returned permit must be
    /// settled with the call outcome; dropping it counts as a failure.
    pub fn try_acquire(&self) -> Result<Permit<'_>> {
        let now = Instant::now();
        let mut inner = self.lock();

        match inner.current_state(&self.config, now) {
            CircuitState::Open => return Err(FastOrderError::CircuitOpen),
            CircuitState::HalfOpen if inner.counts.requests >= self.config.max_trial_requests => {
                return Err(FastOrderError::TooManyTrialRequests);
            }
            _ => {}
        }

        inner.counts.on_request();
        Ok(Permit {
            breaker: self,
            generation: inner.generation,
            settled: false,
        })
    }

    fn settle(&self, generation: u64, success: bool) {
        let now = Instant::now();
        let mut inner = self.lock();
        let state = inner.current_state(&self.config, now);
        if generation != inner.generation {
            return;
        }

        if success {
            inner.on_success(&self.config, state, now);
        } else {
            inner.on_failure(&self.config, state, now);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner is never left half-updated by a panic, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Admission ticket for one upstream call
#[must_use = "a permit must be settled with the call outcome"]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl Permit<'_> {
    pub fn success(mut self) {
        self.settle(true);
    }

    pub fn failure(mut self) {
        self.settle(false);
    }

    fn settle(&mut self, success: bool) {
        if !self.settled {
            self.settled = true;
            self.breaker.settle(self.generation, success);
        }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(breaker = %self.breaker.config.name, "permit dropped before completion");
            self.settle(false);
        }
    }
}
