//! # Daily Check-in Core Library
//!
//! Core logic for a once-per-day on-chain check-in client. All operations
//! are available through the `daily-checkin` CLI, which is a thin layer over
//! this library.
//!
//! ## Architecture
//!
//! - **Eligibility**: a pure function of the last check-in timestamp and
//!   the current time
//! - **Countdown Engine**: republishes eligibility once per second from an
//!   injected clock; one ticker per engine, replaced on every restart
//! - **Chain**: JSON-RPC wallet provider client, calldata codec and the
//!   contract's read/write calls
//! - **Session**: connect, load the record, check in, reload
//!
//! ## Key Components
//!
//! - [`evaluate`]: Eligibility state for a timestamp
//! - [`CountdownEngine`]: Periodic eligibility publisher
//! - [`Session`]: Wallet/contract flow driving the engine
//! - [`Config`]: Application configuration management

pub mod chain;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod eligibility;
pub mod error;
pub mod events;
pub mod record;
pub mod session;
pub mod sink;

pub use chain::{CheckInChain, CheckInContract, Network};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use countdown::CountdownEngine;
pub use eligibility::{evaluate, Countdown, EligibilityState, CHECK_IN_WINDOW_SECS};
pub use error::{AbiError, ConfigError, CoreError, Result, RpcError};
pub use events::Event;
pub use record::CheckInRecord;
pub use session::Session;
pub use sink::{ChannelSink, RecordingSink, UiSink};
