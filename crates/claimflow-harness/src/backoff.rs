//! Adaptive delay between submissions, keyed on the consecutive-failure
//! streak at the end of a rolling outcome window.
//!
//! The delay is a table lookup, never a formula: each streak length maps to
//! a multiplier of the base delay unit. The tier table wraps around past the
//! last entry, which reproduces the production harness exactly (a ninth
//! consecutive failure drops back to the first tier). A success resets the
//! streak and the delay to zero.

use std::collections::VecDeque;
use std::time::Duration;

/// Result of one submission attempt, as the policy sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Base-delay multipliers indexed by `(streak - 1) % len`.
pub const TIER_MULTIPLIERS: [u32; 8] = [1, 1, 1, 2, 2, 2, 2, 4];

/// Default base delay unit of the production harness: 15 seconds.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(15);

const WINDOW_CAPACITY: usize = 25;

#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    window: VecDeque<Outcome>,
    base: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration) -> Self {
        Self {
            window: VecDeque::with_capacity(WINDOW_CAPACITY),
            base,
        }
    }

    /// Append an outcome to the rolling window.
    pub fn record(&mut self, outcome: Outcome) {
        if self.window.len() == WINDOW_CAPACITY {
            self.window.pop_front();
        }
        self.window.push_back(outcome);
    }

    /// Length of the failure streak at the end of the window.
    pub fn consecutive_failures(&self) -> usize {
        self.window
            .iter()
            .rev()
            .take_while(|outcome| **outcome == Outcome::Failure)
            .count()
    }

    /// Delay to apply before the next submission.
    pub fn delay(&self) -> Duration {
        match self.consecutive_failures() {
            0 => Duration::ZERO,
            streak => self.base * TIER_MULTIPLIERS[(streak - 1) % TIER_MULTIPLIERS.len()],
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}
