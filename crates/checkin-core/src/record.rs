use serde::{Deserialize, Serialize};

/// Snapshot of the contract's per-account record.
///
/// Only the contract mutates this; clients read it after connecting and
/// after every confirmed check-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    /// Seconds since epoch of the last check-in, 0 if never.
    pub last_check_in: u64,
    pub streak: u64,
    pub points: u64,
}
