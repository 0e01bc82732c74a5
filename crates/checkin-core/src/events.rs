use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::eligibility::{Countdown, EligibilityState};
use crate::record::CheckInRecord;

/// Every state change visible to the user produces an Event.
/// The countdown engine publishes eligibility; the session publishes the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Check-in action enabled.
    CheckInEligible {
        at: DateTime<Utc>,
    },
    /// Check-in action disabled until the window closes.
    CheckInWaiting {
        remaining_secs: u64,
        hours: u64,
        minutes: u64,
        seconds: u64,
        at: DateTime<Utc>,
    },
    WalletConnected {
        address: String,
        chain_id: u64,
        at: DateTime<Utc>,
    },
    RecordLoaded {
        address: String,
        last_check_in: u64,
        streak: u64,
        points: u64,
        at: DateTime<Utc>,
    },
    CheckInSubmitted {
        tx_hash: String,
        /// Block explorer link for the transaction, when the network has one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tx_url: Option<String>,
        at: DateTime<Utc>,
    },
    CheckInConfirmed {
        tx_hash: String,
        streak: u64,
        points: u64,
        at: DateTime<Utc>,
    },
    CheckInFailed {
        reason: String,
        at: DateTime<Utc>,
    },
    /// First state has been published; an embedding host may reveal the view.
    Ready {
        at: DateTime<Utc>,
    },
}

/// Event timestamp for a clock reading in seconds since epoch.
///
/// Readings beyond chrono's range pin to its maximum.
pub fn timestamp(now: u64) -> DateTime<Utc> {
    i64::try_from(now)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Event {
    /// Eligibility event for `state` as evaluated at clock reading `now`.
    pub fn from_state(state: EligibilityState, now: u64) -> Self {
        let at = timestamp(now);
        match state {
            EligibilityState::Eligible => Event::CheckInEligible { at },
            EligibilityState::Waiting { remaining_secs } => {
                let Countdown {
                    hours,
                    minutes,
                    seconds,
                } = Countdown::from_secs(remaining_secs);
                Event::CheckInWaiting {
                    remaining_secs,
                    hours,
                    minutes,
                    seconds,
                    at,
                }
            }
        }
    }

    pub fn record_loaded(address: &str, record: &CheckInRecord, now: u64) -> Self {
        Event::RecordLoaded {
            address: address.to_string(),
            last_check_in: record.last_check_in,
            streak: record.streak,
            points: record.points,
            at: timestamp(now),
        }
    }

    /// Whether the event carries eligibility (as opposed to session progress).
    pub fn is_eligibility(&self) -> bool {
        matches!(
            self,
            Event::CheckInEligible { .. } | Event::CheckInWaiting { .. }
        )
    }

    /// Human-readable single line, used by plain terminal output.
    pub fn message(&self) -> String {
        match self {
            Event::CheckInEligible { .. } => "✅ You can check in now".to_string(),
            Event::CheckInWaiting {
                hours,
                minutes,
                seconds,
                ..
            } => format!("⏳ Next check-in in {hours}h {minutes}m {seconds}s"),
            Event::WalletConnected { address, .. } => {
                format!("Wallet: {}", crate::chain::short_address(address))
            }
            Event::RecordLoaded { streak, points, .. } => {
                format!("Streak: {streak}  Points: {points}")
            }
            Event::CheckInSubmitted {
                tx_hash,
                tx_url: Some(url),
                ..
            } => format!("Checking in... ({tx_hash}) {url}"),
            Event::CheckInSubmitted { tx_hash, .. } => format!("Checking in... ({tx_hash})"),
            Event::CheckInConfirmed { .. } => "✅ Check-in successful!".to_string(),
            Event::CheckInFailed { reason, .. } => format!("❌ {reason}"),
            Event::Ready { .. } => "ready".to_string(),
        }
    }
}
