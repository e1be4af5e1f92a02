//! Bounded exponential backoff for transient catalog reads.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::warn;

use crate::constants::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// No retry is started once this much wall-clock time would be exceeded.
    #[serde(with = "humantime_serde")]
    pub time_budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(RETRY_MAX_DELAY_MS),
            backoff_factor: RETRY_BACKOFF_FACTOR,
            time_budget: Duration::from_millis(RETRY_TIME_BUDGET_MS),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never sleeps.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("retry max_attempts must be at least 1".into()));
        }
        if self.backoff_factor.is_nan() || self.backoff_factor < 1.0 {
            return Err(Error::Config("retry backoff_factor must be >= 1".into()));
        }
        Ok(())
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        if secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }

    /// Point in time after which no retry is started, counted from now.
    /// `None` when the budget is too large to represent.
    pub fn deadline(&self) -> Option<Instant> {
        Instant::now().checked_add(self.time_budget)
    }

    /// Run `op` until it succeeds, fails permanently, or the policy is spent.
    pub fn run<T>(&self, op: impl FnMut(u32) -> Result<T>) -> Result<T> {
        self.run_until(self.deadline(), op)
    }

    /// Like [`RetryPolicy::run`], but against a deadline shared with other
    /// runs.
    pub fn run_until<T>(
        &self,
        deadline: Option<Instant>,
        op: impl FnMut(u32) -> Result<T>,
    ) -> Result<T> {
        self.run_with_sleep(deadline, op, std::thread::sleep)
    }

    pub(crate) fn run_with_sleep<T>(
        &self,
        deadline: Option<Instant>,
        mut op: impl FnMut(u32) -> Result<T>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T> {
        let mut attempt = 1;
        loop {
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_transient() || attempt >= self.max_attempts {
                return Err(err);
            }
            let delay = self.delay_for(attempt);
            if deadline.is_some_and(|d| Instant::now() + delay > d) {
                warn!(attempt, "retry budget exhausted: {err}");
                return Err(err);
            }
            warn!(attempt, ?delay, "transient failure, retrying: {err}");
            sleep(delay);
            attempt += 1;
        }
    }
}
