//! Target network description.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::abi;

/// Network the contract is deployed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Ask the wallet to switch (and add) the chain on mismatch.
    #[serde(default = "default_true")]
    pub auto_switch: bool,
}

fn default_chain_id() -> u64 {
    8453
}
fn default_name() -> String {
    "Base Mainnet".into()
}
fn default_rpc_url() -> String {
    "https://mainnet.base.org".into()
}
fn default_explorer_url() -> String {
    "https://basescan.org".into()
}
fn default_currency_symbol() -> String {
    "ETH".into()
}
fn default_true() -> bool {
    true
}

impl Default for Network {
    fn default() -> Self {
        Self::base_mainnet()
    }
}

impl Network {
    pub fn base_mainnet() -> Self {
        Self {
            chain_id: default_chain_id(),
            name: default_name(),
            rpc_url: default_rpc_url(),
            explorer_url: default_explorer_url(),
            currency_symbol: default_currency_symbol(),
            auto_switch: true,
        }
    }

    pub fn chain_id_hex(&self) -> String {
        abi::encode_quantity(self.chain_id)
    }

    /// Params for `wallet_switchEthereumChain`.
    pub fn switch_params(&self) -> Value {
        json!([{ "chainId": self.chain_id_hex() }])
    }

    /// Params for `wallet_addEthereumChain` (EIP-3085).
    pub fn add_chain_params(&self) -> Value {
        json!([{
            "chainId": self.chain_id_hex(),
            "chainName": self.name,
            "nativeCurrency": {
                "name": "Ether",
                "symbol": self.currency_symbol,
                "decimals": 18,
            },
            "rpcUrls": [self.rpc_url],
            "blockExplorerUrls": [self.explorer_url],
        }])
    }

    /// Explorer page for `tx_hash`; `None` when no explorer is configured.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        let base = self.explorer_url.trim().trim_end_matches('/');
        (!base.is_empty()).then(|| format!("{base}/tx/{tx_hash}"))
    }
}
