//! Minimal JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::error::RpcError;

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<ErrorObject>,
}

/// JSON-RPC client for a wallet provider or node.
#[derive(Debug)]
pub struct RpcClient {
    url: Url,
    http_client: Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            http_client: Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Call `method` and deserialize its result.
    ///
    /// A missing or `null` result is handed to `T` as `null`, so callers
    /// that expect "not yet available" should ask for an `Option`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(id, method, "rpc request");

        let resp: Response = self
            .http_client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.error {
            debug!(id, method, code = err.code, "rpc error");
            return Err(RpcError::Remote {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        serde_json::from_value(resp.result).map_err(|e| RpcError::Malformed {
            method: method.to_string(),
            message: e.to_string(),
        })
    }
}
