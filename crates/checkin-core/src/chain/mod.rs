//! Everything that talks to the wallet provider and the contract.

pub mod abi;
pub mod contract;
pub mod network;
pub mod rpc;

use std::future::Future;

pub use contract::CheckInContract;
pub use network::Network;
pub use rpc::RpcClient;

use crate::error::Result;
use crate::record::CheckInRecord;

/// Operations the session needs from the chain side.
///
/// [`CheckInContract`] implements this over JSON-RPC.
pub trait CheckInChain: Send + Sync {
    /// Account to act as, requesting wallet access if needed.
    fn request_account(&self) -> impl Future<Output = Result<String>> + Send;

    /// Make sure the wallet is on the target network; returns its chain id.
    fn ensure_network(&self) -> impl Future<Output = Result<u64>> + Send;

    fn get_user(&self, address: &str) -> impl Future<Output = Result<CheckInRecord>> + Send;

    /// Submit the check-in transaction; returns its hash.
    fn check_in(&self, from: &str) -> impl Future<Output = Result<String>> + Send;

    /// Resolve once the transaction is mined successfully.
    fn wait_for_receipt(&self, tx_hash: &str) -> impl Future<Output = Result<()>> + Send;

    /// Link to the transaction on a block explorer, if there is one.
    fn tx_url(&self, _tx_hash: &str) -> Option<String> {
        None
    }
}

/// `0x1234...abcd` form used in the UI.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
