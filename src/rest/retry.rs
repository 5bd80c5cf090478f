/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Bounded retries with exponential backoff.
//!
//! Every failure counts the same, whether it came from the network, the XML parser or the API
//! itself. Callers that need to treat particular API errors differently should inspect the error
//! returned once attempts are exhausted.
use crate::rest::macros::retry_with_backoff;
use std::future::Future;
use std::time::Duration;

/// Where a [`Backoff`] is in its attempt cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting,
    Waiting(Duration),
    Succeeded,
    Failed,
}

/// Attempt counter and delay schedule for one retried operation.
///
/// At least one attempt is always made. The delay doubles after every wait.
#[derive(Debug, Clone)]
pub struct Backoff {
    remaining: u32,
    delay: Duration,
    state: RetryState,
}

impl Backoff {
    pub fn new(attempts: u32, initial_delay: Duration) -> Self {
        Self {
            remaining: attempts.max(1),
            delay: initial_delay,
            state: RetryState::Attempting,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Attempts left including the one in progress
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn succeeded(&mut self) {
        self.state = RetryState::Succeeded;
    }

    /// Records a failed attempt and returns how long to wait before the next one, or `None` when
    /// no attempts remain.
    pub fn failed(&mut self) -> Option<Duration> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = RetryState::Failed;
            return None;
        }
        let wait = self.delay;
        self.delay = self.delay.saturating_mul(2);
        self.state = RetryState::Waiting(wait);
        Some(wait)
    }

    /// Moves from waiting back to attempting
    pub fn resume(&mut self) {
        if let RetryState::Waiting(_) = self.state {
            self.state = RetryState::Attempting;
        }
    }
}

/// Runs `op` until it succeeds or `attempts` runs out, sleeping between failures.
///
/// Returns the first success, or the error of the final attempt.
pub async fn retry<T, E, F, Fut>(attempts: u32, initial_delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff!(attempts, initial_delay, op())
}
