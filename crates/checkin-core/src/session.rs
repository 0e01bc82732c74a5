//! Connect, load, check in.
//!
//! The session wires a [`CheckInChain`] to a [`CountdownEngine`]: every
//! time a record is fetched (on connect and after each confirmed
//! check-in) the countdown is restarted from the record's timestamp.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::chain::CheckInChain;
use crate::clock::Clock;
use crate::countdown::CountdownEngine;
use crate::eligibility::EligibilityState;
use crate::error::{CoreError, Result, CHECK_IN_FALLBACK_REASON};
use crate::events::{self, Event};
use crate::record::CheckInRecord;
use crate::sink::UiSink;

pub struct Session<Ch, C, S> {
    chain: Ch,
    engine: CountdownEngine<C, S>,
    account: Option<String>,
    record: Option<CheckInRecord>,
    embedded: bool,
    ready_sent: bool,
}

impl<Ch, C, S> Session<Ch, C, S>
where
    Ch: CheckInChain,
    C: Clock + 'static,
    S: UiSink + 'static,
{
    pub fn new(chain: Ch, engine: CountdownEngine<C, S>) -> Self {
        Self {
            chain,
            engine,
            account: None,
            record: None,
            embedded: false,
            ready_sent: false,
        }
    }

    /// Publish `Ready` after the first state, for hosts embedding the client.
    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn record(&self) -> Option<&CheckInRecord> {
        self.record.as_ref()
    }

    pub fn eligibility(&self) -> EligibilityState {
        self.engine.current()
    }

    pub fn engine(&self) -> &CountdownEngine<C, S> {
        &self.engine
    }

    pub fn chain(&self) -> &Ch {
        &self.chain
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Connect as `account`, or as the wallet's first account when `None`,
    /// then load the record and start the countdown.
    pub async fn connect(&mut self, account: Option<&str>) -> Result<CheckInRecord> {
        let address = match account {
            Some(account) => crate::chain::abi::normalize_address(account)?,
            None => self.chain.request_account().await?,
        };
        let chain_id = self.chain.ensure_network().await?;
        info!(%address, chain_id, "wallet connected");
        self.publish(&Event::WalletConnected {
            address: address.clone(),
            chain_id,
            at: self.at(),
        });
        self.account = Some(address);
        self.refresh().await
    }

    /// Re-read the record and restart the countdown from it.
    pub async fn refresh(&mut self) -> Result<CheckInRecord> {
        let address = self.account.as_deref().ok_or(CoreError::NotConnected)?;
        let record = self.chain.get_user(address).await?;
        self.publish(&Event::record_loaded(address, &record, self.engine.now()));
        self.record = Some(record);
        self.engine.start(record.last_check_in);

        if self.embedded && !self.ready_sent {
            self.ready_sent = true;
            self.publish(&Event::Ready { at: self.at() });
        }
        Ok(record)
    }

    /// Submit a check-in if the window is open, wait for it, then reload.
    ///
    /// Failures are published as `CheckInFailed` before being returned.
    pub async fn check_in(&mut self) -> Result<CheckInRecord> {
        match self.try_check_in().await {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(error = %e, "check-in failed");
                self.publish(&Event::CheckInFailed {
                    reason: failure_reason(&e),
                    at: self.at(),
                });
                Err(e)
            }
        }
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    async fn try_check_in(&mut self) -> Result<CheckInRecord> {
        let account = self.account.clone().ok_or(CoreError::NotConnected)?;
        if let EligibilityState::Waiting { remaining_secs } = self.engine.current() {
            return Err(CoreError::AlreadyCheckedIn { remaining_secs });
        }

        let tx_hash = self.chain.check_in(&account).await?;
        self.publish(&Event::CheckInSubmitted {
            tx_url: self.chain.tx_url(&tx_hash),
            tx_hash: tx_hash.clone(),
            at: self.at(),
        });
        self.chain.wait_for_receipt(&tx_hash).await?;

        let record = self.refresh().await?;
        info!(%tx_hash, streak = record.streak, points = record.points, "check-in confirmed");
        self.publish(&Event::CheckInConfirmed {
            tx_hash,
            streak: record.streak,
            points: record.points,
            at: self.at(),
        });
        Ok(record)
    }

    fn at(&self) -> DateTime<Utc> {
        events::timestamp(self.engine.now())
    }

    fn publish(&self, event: &Event) {
        self.engine.sink().publish(event);
    }
}

/// Message shown for a failed check-in.
///
/// Reverts show their reason; anything else without a more specific
/// message falls back to the generic text.
pub fn failure_reason(err: &CoreError) -> String {
    match err {
        CoreError::TransactionReverted { reason } => reason.clone(),
        CoreError::NotConnected | CoreError::NoAccount | CoreError::WrongNetwork { .. } => {
            err.to_string()
        }
        _ => CHECK_IN_FALLBACK_REASON.to_string(),
    }
}
