//! Core error types for checkin-core.
//!
//! The eligibility engine itself is total and never fails. Everything in
//! this module describes failures of the collaborators around it: the
//! JSON-RPC provider, the calldata codec, and the configuration file.

use std::path::PathBuf;
use thiserror::Error;

/// Fallback message shown when a check-in transaction fails without a
/// revert reason.
pub const CHECK_IN_FALLBACK_REASON: &str = "Already checked in today";

/// Core error type for checkin-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON-RPC transport or provider errors
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Calldata encoding/decoding errors
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An action was attempted before a wallet account was connected
    #[error("Connect wallet first")]
    NotConnected,

    /// The provider returned no accounts
    #[error("Wallet returned no accounts")]
    NoAccount,

    /// The provider is on a different chain and switching is disabled or failed
    #[error("Please switch to {expected_name} (chain {expected}); wallet is on chain {actual}")]
    WrongNetwork {
        expected: u64,
        expected_name: String,
        actual: u64,
    },

    /// Check-in requested while the window is still closed
    #[error("Already checked in today; next check-in in {remaining_secs}s")]
    AlreadyCheckedIn { remaining_secs: u64 },

    /// Transaction was mined but reverted, or rejected before mining
    #[error("{reason}")]
    TransactionReverted { reason: String },

    /// No receipt appeared within the configured timeout
    #[error("Transaction {tx_hash} not confirmed within {timeout_secs} seconds")]
    ReceiptTimeout { tx_hash: String, timeout_secs: u64 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-RPC errors.
#[derive(Error, Debug)]
pub enum RpcError {
    /// HTTP transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a JSON-RPC error object
    #[error("Provider error {code}: {message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The response had neither `result` nor `error`, or a mistyped result
    #[error("Malformed response to {method}: {message}")]
    Malformed { method: String, message: String },
}

impl RpcError {
    /// JSON-RPC "method not found".
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED: i64 = 4001;
    /// EIP-3326 "unrecognized chain id", raised by `wallet_switchEthereumChain`.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;

    /// Provider error code, if this is a remote error.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Calldata codec errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AbiError {
    /// Address is not 20 bytes of hex with a 0x prefix
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Hex payload could not be decoded
    #[error("Invalid hex data: {0}")]
    InvalidHex(String),

    /// Return data shorter than expected
    #[error("Return data too short: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// A uint256 word does not fit into u64
    #[error("Value of field '{field}' does not fit in 64 bits")]
    Overflow { field: &'static str },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Home directory could not be resolved
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
