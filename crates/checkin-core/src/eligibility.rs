//! Check-in eligibility.
//!
//! Eligibility is derived from a single on-chain timestamp. Nothing here
//! keeps state between calls: the caller samples the clock and asks again,
//! so a late or skipped evaluation always lands on the true boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of the check-in window in seconds (one day).
pub const CHECK_IN_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Whether the check-in action is currently allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EligibilityState {
    Eligible,
    /// `remaining_secs` is always strictly positive.
    Waiting {
        remaining_secs: u64,
    },
}

impl EligibilityState {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityState::Eligible)
    }

    /// Countdown to display, `None` when eligible.
    pub fn countdown(&self) -> Option<Countdown> {
        match *self {
            EligibilityState::Eligible => None,
            EligibilityState::Waiting { remaining_secs } => {
                Some(Countdown::from_secs(remaining_secs))
            }
        }
    }
}

/// Evaluate eligibility for `last_check_in` at wall-clock time `now`.
///
/// A `last_check_in` of zero means the account never checked in and is
/// always eligible. The state flips to `Eligible` exactly at
/// `last_check_in + CHECK_IN_WINDOW_SECS`. Works from elapsed time so the
/// top of the `u64` range never clamps the window.
pub fn evaluate(last_check_in: u64, now: u64) -> EligibilityState {
    if last_check_in == 0 {
        return EligibilityState::Eligible;
    }
    if now < last_check_in {
        // Wall clock lags the chain timestamp.
        return EligibilityState::Waiting {
            remaining_secs: CHECK_IN_WINDOW_SECS.saturating_add(last_check_in - now),
        };
    }
    let elapsed = now - last_check_in;
    if elapsed >= CHECK_IN_WINDOW_SECS {
        EligibilityState::Eligible
    } else {
        EligibilityState::Waiting {
            remaining_secs: CHECK_IN_WINDOW_SECS - elapsed,
        }
    }
}

/// Whole hours, minutes and seconds of a remaining duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    pub fn from_secs(remaining: u64) -> Self {
        Self {
            hours: remaining / 3600,
            minutes: (remaining % 3600) / 60,
            seconds: remaining % 60,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}
