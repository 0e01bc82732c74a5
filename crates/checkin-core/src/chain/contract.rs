//! Check-in contract client over a JSON-RPC wallet provider.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

use super::abi;
use super::network::Network;
use super::rpc::RpcClient;
use super::CheckInChain;
use crate::config::Config;
use crate::error::{ConfigError, CoreError, Result, RpcError, CHECK_IN_FALLBACK_REASON};
use crate::record::CheckInRecord;

/// Floor for the receipt poll interval; a zero interval would spin.
pub const MIN_RECEIPT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Deserialize)]
struct Receipt {
    #[serde(default)]
    status: Option<String>,
}

/// Reads records from and submits check-ins to the contract.
#[derive(Debug)]
pub struct CheckInContract {
    rpc: RpcClient,
    network: Network,
    address: String,
    account: Option<String>,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl CheckInContract {
    pub fn new(rpc: RpcClient, network: Network, address: &str) -> Result<Self> {
        Ok(Self {
            rpc,
            network,
            address: abi::normalize_address(address)?,
            account: None,
            receipt_poll: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(120),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let url = Url::parse(&config.provider.url).map_err(|e| ConfigError::InvalidValue {
            key: "provider.url".into(),
            message: e.to_string(),
        })?;
        let mut contract = Self::new(
            RpcClient::new(url),
            config.network.clone(),
            &config.contract.address,
        )?
        .with_receipt_timing(
            Duration::from_millis(config.transaction.receipt_poll_ms),
            Duration::from_secs(config.transaction.receipt_timeout_secs),
        );
        if let Some(account) = config.account() {
            contract = contract.with_account(account)?;
        }
        Ok(contract)
    }

    /// Act as `account` without asking the wallet.
    pub fn with_account(mut self, account: &str) -> Result<Self> {
        self.account = Some(abi::normalize_address(account)?);
        Ok(self)
    }

    /// Poll every `poll` (at least [`MIN_RECEIPT_POLL`]) for up to `timeout`.
    pub fn with_receipt_timing(mut self, poll: Duration, timeout: Duration) -> Self {
        self.receipt_poll = poll.max(MIN_RECEIPT_POLL);
        self.receipt_timeout = timeout;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.rpc.call("eth_chainId", json!([])).await?;
        Ok(abi::parse_quantity(&hex)?)
    }

    fn wrong_network(&self, actual: u64) -> CoreError {
        CoreError::WrongNetwork {
            expected: self.network.chain_id,
            expected_name: self.network.name.clone(),
            actual,
        }
    }

    async fn poll_receipt(&self, tx_hash: &str) -> Result<()> {
        loop {
            let receipt: Option<Receipt> = self
                .rpc
                .call("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if let Some(receipt) = receipt {
                return match receipt.status.as_deref() {
                    Some("0x0") => Err(CoreError::TransactionReverted {
                        reason: CHECK_IN_FALLBACK_REASON.to_string(),
                    }),
                    _ => Ok(()),
                };
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
    }
}

impl CheckInChain for CheckInContract {
    async fn request_account(&self) -> Result<String> {
        if let Some(account) = &self.account {
            return Ok(account.clone());
        }

        let accounts: Vec<String> = match self.rpc.call("eth_requestAccounts", json!([])).await {
            Ok(accounts) => accounts,
            Err(e) if e.code() == Some(RpcError::METHOD_NOT_FOUND) => {
                self.rpc.call("eth_accounts", json!([])).await?
            }
            Err(e) => return Err(e.into()),
        };
        let first = accounts.into_iter().next().ok_or(CoreError::NoAccount)?;
        Ok(abi::normalize_address(&first)?)
    }

    async fn ensure_network(&self) -> Result<u64> {
        let actual = self.chain_id().await?;
        if actual == self.network.chain_id {
            return Ok(actual);
        }
        warn!(
            expected = self.network.chain_id,
            actual, "wallet is on the wrong network"
        );
        if !self.network.auto_switch {
            return Err(self.wrong_network(actual));
        }

        let switched = self
            .rpc
            .call::<Value>("wallet_switchEthereumChain", self.network.switch_params())
            .await;
        match switched {
            Ok(_) => {}
            Err(e) if e.code() == Some(RpcError::UNRECOGNIZED_CHAIN) => {
                info!(chain_id = self.network.chain_id, "adding network to wallet");
                self.rpc
                    .call::<Value>("wallet_addEthereumChain", self.network.add_chain_params())
                    .await?;
            }
            Err(e) => {
                warn!(error = %e, "network switch failed");
                return Err(self.wrong_network(actual));
            }
        }

        let now_on = self.chain_id().await?;
        if now_on != self.network.chain_id {
            return Err(self.wrong_network(now_on));
        }
        info!(chain_id = now_on, "switched network");
        Ok(now_on)
    }

    async fn get_user(&self, address: &str) -> Result<CheckInRecord> {
        let data = abi::encode_get_user(address)?;
        let params = json!([{ "to": self.address, "data": data }, "latest"]);
        let ret: String = self.rpc.call("eth_call", params).await?;
        Ok(abi::decode_user(&abi::decode_hex(&ret)?)?)
    }

    async fn check_in(&self, from: &str) -> Result<String> {
        let tx = json!([{
            "from": from,
            "to": self.address,
            "data": abi::encode_check_in(),
        }]);
        match self.rpc.call::<String>("eth_sendTransaction", tx).await {
            Ok(tx_hash) => {
                info!(%tx_hash, "check-in submitted");
                Ok(tx_hash)
            }
            Err(e) => Err(revert_error(e)),
        }
    }

    fn tx_url(&self, tx_hash: &str) -> Option<String> {
        self.network.tx_url(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<()> {
        tokio::time::timeout(self.receipt_timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| CoreError::ReceiptTimeout {
                tx_hash: tx_hash.to_string(),
                timeout_secs: self.receipt_timeout.as_secs(),
            })?
    }
}

/// Turn a provider error carrying a revert into `TransactionReverted`.
fn revert_error(err: RpcError) -> CoreError {
    let reason = match &err {
        RpcError::Remote { message, data, .. } => data
            .as_ref()
            .and_then(revert_data)
            .and_then(|bytes| abi::decode_revert_reason(&bytes))
            .or_else(|| {
                message
                    .strip_prefix("execution reverted: ")
                    .map(str::to_string)
            }),
        _ => None,
    };
    match reason {
        Some(reason) => CoreError::TransactionReverted { reason },
        None => err.into(),
    }
}

/// Revert bytes from an error `data` field, either bare hex or `{ "data": hex }`.
fn revert_data(data: &Value) -> Option<Vec<u8>> {
    let hex = match data {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("data")?.as_str()?,
        _ => return None,
    };
    abi::decode_hex(hex).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CONTRACT: &str = "0x074F7bf0837ef40E042b14749Bd43bC0aCc30Aed";
    const ACCOUNT: &str = "0x8ba1f109551bd432803012645ac136ddd64dba72";

    fn contract(server: &mockito::Server, network: Network) -> CheckInContract {
        let rpc = RpcClient::new(Url::parse(&server.url()).unwrap());
        CheckInContract::new(rpc, network, CONTRACT)
            .unwrap()
            .with_receipt_timing(MIN_RECEIPT_POLL, Duration::from_millis(500))
    }

    fn method(name: &str) -> Matcher {
        Matcher::PartialJson(json!({ "method": name }))
    }

    fn result(value: Value) -> String {
        json!({ "jsonrpc": "2.0", "id": 1, "result": value }).to_string()
    }

    fn error(code: i64, message: &str, data: Option<Value>) -> String {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": code, "message": message, "data": data },
        })
        .to_string()
    }

    /// Answers with `first` on the first call and `rest` on the second.
    async fn sequenced(
        server: &mut mockito::Server,
        name: &str,
        first: String,
        rest: String,
    ) -> mockito::Mock {
        let calls = Arc::new(AtomicUsize::new(0));
        server
            .mock("POST", "/")
            .match_body(method(name))
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    first.clone().into_bytes()
                } else {
                    rest.clone().into_bytes()
                }
            })
            .expect(2)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn get_user_decodes_record() {
        let mut server = mockito::Server::new_async().await;
        let ret = format!("0x{:064x}{:064x}{:064x}", 1_700_000_000u64, 3, 30);
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_call",
                "params": [{
                    "to": "0x074f7bf0837ef40e042b14749bd43bc0acc30aed",
                    "data": concat!(
                        "0x6f77926b",
                        "0000000000000000000000008ba1f109551bd432803012645ac136ddd64dba72",
                    ),
                }, "latest"],
            })))
            .with_header("content-type", "application/json")
            .with_body(result(json!(ret)))
            .create_async()
            .await;

        let record = contract(&server, Network::default())
            .get_user(ACCOUNT)
            .await
            .unwrap();
        assert_eq!(
            record,
            CheckInRecord {
                last_check_in: 1_700_000_000,
                streak: 3,
                points: 30
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn request_account_falls_back_to_eth_accounts() {
        let mut server = mockito::Server::new_async().await;
        let upper = "0x8BA1F109551BD432803012645AC136DDD64DBA72";
        server
            .mock("POST", "/")
            .match_body(method("eth_requestAccounts"))
            .with_header("content-type", "application/json")
            .with_body(error(-32601, "Method not found", None))
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(method("eth_accounts"))
            .with_header("content-type", "application/json")
            .with_body(result(json!([upper])))
            .create_async()
            .await;

        let account = contract(&server, Network::default())
            .request_account()
            .await
            .unwrap();
        assert_eq!(account, ACCOUNT);
    }

    #[tokio::test]
    async fn empty_account_list_is_no_account() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_requestAccounts"))
            .with_header("content-type", "application/json")
            .with_body(result(json!([])))
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .request_account()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoAccount));
    }

    #[tokio::test]
    async fn configured_account_skips_wallet() {
        let server = mockito::Server::new_async().await;
        let account = contract(&server, Network::default())
            .with_account("0x8BA1f109551bD432803012645Ac136ddd64DBA72")
            .unwrap()
            .request_account()
            .await
            .unwrap();
        assert_eq!(account, ACCOUNT);
    }

    #[tokio::test]
    async fn matching_network_needs_no_switch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_chainId"))
            .with_header("content-type", "application/json")
            .with_body(result(json!("0x2105")))
            .create_async()
            .await;
        let switch = server
            .mock("POST", "/")
            .match_body(method("wallet_switchEthereumChain"))
            .expect(0)
            .create_async()
            .await;

        let chain_id = contract(&server, Network::default())
            .ensure_network()
            .await
            .unwrap();
        assert_eq!(chain_id, 8453);
        switch.assert_async().await;
    }

    #[tokio::test]
    async fn wrong_network_without_auto_switch_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_chainId"))
            .with_header("content-type", "application/json")
            .with_body(result(json!("0x1")))
            .create_async()
            .await;

        let network = Network {
            auto_switch: false,
            ..Network::default()
        };
        let err = contract(&server, network)
            .ensure_network()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::WrongNetwork {
                expected: 8453,
                actual: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_chain_is_added_then_verified() {
        let mut server = mockito::Server::new_async().await;
        sequenced(
            &mut server,
            "eth_chainId",
            result(json!("0x1")),
            result(json!("0x2105")),
        )
        .await;
        server
            .mock("POST", "/")
            .match_body(method("wallet_switchEthereumChain"))
            .with_header("content-type", "application/json")
            .with_body(error(4902, "Unrecognized chain ID", None))
            .create_async()
            .await;
        let add = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "wallet_addEthereumChain",
                "params": [{ "chainId": "0x2105" }],
            })))
            .with_header("content-type", "application/json")
            .with_body(result(Value::Null))
            .create_async()
            .await;

        let chain_id = contract(&server, Network::default())
            .ensure_network()
            .await
            .unwrap();
        assert_eq!(chain_id, 8453);
        add.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_switch_is_wrong_network() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_chainId"))
            .with_header("content-type", "application/json")
            .with_body(result(json!("0x1")))
            .create_async()
            .await;
        server
            .mock("POST", "/")
            .match_body(method("wallet_switchEthereumChain"))
            .with_header("content-type", "application/json")
            .with_body(error(4001, "User rejected the request.", None))
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .ensure_network()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::WrongNetwork { actual: 1, .. }));
    }

    #[tokio::test]
    async fn check_in_sends_selector_to_contract() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "eth_sendTransaction",
                "params": [{
                    "from": ACCOUNT,
                    "to": "0x074f7bf0837ef40e042b14749bd43bc0acc30aed",
                    "data": "0x183ff085",
                }],
            })))
            .with_header("content-type", "application/json")
            .with_body(result(json!("0xfeed")))
            .create_async()
            .await;

        let tx_hash = contract(&server, Network::default())
            .check_in(ACCOUNT)
            .await
            .unwrap();
        assert_eq!(tx_hash, "0xfeed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn check_in_revert_reason_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let reason = "Wait 24h";
        let revert = format!(
            "0x08c379a0{:064x}{:064x}{}",
            32,
            reason.len(),
            format!("{:0<64}", hex::encode(reason))
        );
        server
            .mock("POST", "/")
            .match_body(method("eth_sendTransaction"))
            .with_header("content-type", "application/json")
            .with_body(error(3, "execution reverted", Some(json!(revert))))
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .check_in(ACCOUNT)
            .await
            .unwrap_err();
        match err {
            CoreError::TransactionReverted { reason } => assert_eq!(reason, "Wait 24h"),
            other => panic!("Expected TransactionReverted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_in_revert_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_sendTransaction"))
            .with_header("content-type", "application/json")
            .with_body(error(-32000, "execution reverted: Too soon", None))
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .check_in(ACCOUNT)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Too soon");
    }

    #[tokio::test]
    async fn rejected_check_in_stays_rpc_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_sendTransaction"))
            .with_header("content-type", "application/json")
            .with_body(error(4001, "User rejected the request.", None))
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .check_in(ACCOUNT)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Rpc(_)));
    }

    #[tokio::test]
    async fn waits_until_receipt_appears() {
        let mut server = mockito::Server::new_async().await;
        let mock = sequenced(
            &mut server,
            "eth_getTransactionReceipt",
            result(Value::Null),
            result(json!({ "status": "0x1" })),
        )
        .await;

        contract(&server, Network::default())
            .wait_for_receipt("0xfeed")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reverted_receipt_uses_fallback_reason() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_getTransactionReceipt"))
            .with_header("content-type", "application/json")
            .with_body(result(json!({ "status": "0x0" })))
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .wait_for_receipt("0xfeed")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), CHECK_IN_FALLBACK_REASON);
    }

    #[tokio::test]
    async fn missing_receipt_times_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .match_body(method("eth_getTransactionReceipt"))
            .with_header("content-type", "application/json")
            .with_body(result(Value::Null))
            .expect_at_least(1)
            .create_async()
            .await;

        let err = contract(&server, Network::default())
            .wait_for_receipt("0xfeed")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ReceiptTimeout { .. }));
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let rpc = RpcClient::new(Url::parse("http://127.0.0.1:1").unwrap());
        let contract = CheckInContract::new(rpc, Network::default(), CONTRACT)
            .unwrap()
            .with_receipt_timing(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(contract.receipt_poll, MIN_RECEIPT_POLL);
        assert_eq!(contract.receipt_timeout, Duration::from_secs(1));
    }

    #[test]
    fn tx_url_uses_network_explorer() {
        let contract = CheckInContract::from_config(&Config::default()).unwrap();
        assert_eq!(
            contract.tx_url("0xfeed").as_deref(),
            Some("https://basescan.org/tx/0xfeed")
        );
    }

    #[test]
    fn from_config_rejects_bad_provider_url() {
        let mut config = Config::default();
        config.provider.url = "not a url".into();
        let err = CheckInContract::from_config(&config).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn from_config_applies_account() {
        let mut config = Config::default();
        config.provider.account = ACCOUNT.to_uppercase().replacen("0X", "0x", 1);
        let contract = CheckInContract::from_config(&config).unwrap();
        assert_eq!(contract.account.as_deref(), Some(ACCOUNT));
        assert_eq!(contract.network().chain_id, 8453);
    }
}
