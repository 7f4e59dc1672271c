//! JSON-RPC client handle bound to a single chain.
//!
//! Construction performs no network I/O; the transport timeout is fixed when
//! the handle is built and every call made through it inherits it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;

use super::config::ChainConfig;
use crate::address::Address;
use crate::error::Error;

/// JSON-RPC protocol version sent with every request.
pub const JSON_RPC_VERSION: &str = "2.0";

/// Data structure representing a JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// ID this message corresponds to.
    pub id: u64,
    /// The JSON-RPC version.
    pub jsonrpc: String,
    /// The RPC method.
    pub method: String,
    /// Positional method parameters.
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a new request envelope.
    #[must_use]
    pub fn new(id: u64, method: &str, params: Value) -> Self {
        Self {
            id,
            jsonrpc: JSON_RPC_VERSION.to_owned(),
            method: method.to_owned(),
            params,
        }
    }
}

/// Enum representing a JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponse {
    /// A response with a result.
    Result(JsonRpcResult),
    /// A response carrying an error object.
    Error(JsonRpcError),
}

/// Data structure representing a successful JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResult {
    /// ID this message corresponds to.
    pub id: u64,
    /// The result for the message.
    pub result: Value,
}

/// Data structure representing a JSON-RPC error response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// The error object for the message.
    pub error: ErrorPayload,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    /// Error code.
    pub code: i64,
    /// Error message.
    pub message: String,
    /// Error data, if any.
    pub data: Option<Value>,
}

/// A configured connection to one chain's JSON-RPC endpoint.
///
/// Holds the chain descriptor, the parsed endpoint URL, and an HTTP client
/// carrying the fixed request timeout. Cheap to share behind an `Arc`;
/// stateless until a call is issued through it.
#[derive(Debug)]
pub struct RpcClient {
    chain: ChainConfig,
    endpoint: Url,
    timeout: Duration,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Build a client bound to `chain`'s RPC endpoint with the given
    /// transport timeout. No connection is opened here.
    ///
    /// # Errors
    ///
    /// Returns a chain error if the RPC URL is malformed or the HTTP client
    /// cannot be built.
    pub fn new(chain: ChainConfig, timeout: Duration) -> Result<Self, Error> {
        let endpoint = Url::parse(&chain.rpc_url).map_err(|e| {
            Error::chain(format!(
                "invalid RPC URL '{}' for chain '{}': {e}",
                chain.rpc_url, chain.slug
            ))
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::chain(format!(
                    "failed to build HTTP client for chain '{}': {e}",
                    chain.slug
                ))
            })?;
        Ok(Self {
            chain,
            endpoint,
            timeout,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// The chain this client is bound to.
    #[must_use]
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// The parsed endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The transport timeout applied to every request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue a single JSON-RPC call and return its `result` value.
    ///
    /// # Errors
    ///
    /// Returns an RPC error on transport failure, on a malformed response,
    /// or when the endpoint answers with a JSON-RPC error object.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = JsonRpcRequest::new(id, method, params);

        let http_response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                Error::rpc_with(format!("{method} request to chain '{}' failed", self.chain.slug), e)
            })?;
        let response: JsonRpcResponse = http_response.json().await.map_err(|e| {
            Error::rpc_with(
                format!("{method} response from chain '{}' is not valid JSON-RPC", self.chain.slug),
                e,
            )
        })?;

        match response {
            JsonRpcResponse::Result(success) => {
                if success.id != id {
                    return Err(Error::rpc(format!(
                        "{method} on chain '{}': response id {} does not match request id {id}",
                        self.chain.slug, success.id
                    )));
                }
                Ok(success.result)
            }
            JsonRpcResponse::Error(failure) => {
                let ErrorPayload { code, message, data } = failure.error;
                let detail = data.map(|d| format!(" ({d})")).unwrap_or_default();
                Err(Error::rpc(format!(
                    "{method} on chain '{}' failed with code {code}: {message}{detail}",
                    self.chain.slug
                )))
            }
        }
    }

    /// Latest block number via `eth_blockNumber`.
    ///
    /// # Errors
    ///
    /// Propagates [`RpcClient::request`] failures and quantity decode errors.
    pub async fn block_number(&self) -> Result<u64, Error> {
        let value = self.request("eth_blockNumber", json!([])).await?;
        into_u64(parse_quantity(&value)?)
    }

    /// Account balance in wei via `eth_getBalance` at the latest block.
    ///
    /// # Errors
    ///
    /// Propagates [`RpcClient::request`] failures and quantity decode errors.
    pub async fn balance(&self, address: &Address) -> Result<u128, Error> {
        let value = self
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        parse_quantity(&value)
    }

    /// Outgoing transaction count via `eth_getTransactionCount` at the
    /// latest block.
    ///
    /// # Errors
    ///
    /// Propagates [`RpcClient::request`] failures and quantity decode errors.
    pub async fn transaction_count(&self, address: &Address) -> Result<u64, Error> {
        let value = self
            .request("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        into_u64(parse_quantity(&value)?)
    }
}

/// Decode a `0x`-prefixed hex quantity from a JSON-RPC result value.
fn parse_quantity(value: &Value) -> Result<u128, Error> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::rpc(format!("expected hex quantity, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| Error::rpc(format!("quantity '{text}' is missing the 0x prefix")))?;
    u128::from_str_radix(digits, 16)
        .map_err(|e| Error::rpc(format!("quantity '{text}' is not valid hex: {e}")))
}

fn into_u64(quantity: u128) -> Result<u64, Error> {
    u64::try_from(quantity).map_err(|_| Error::rpc(format!("quantity {quantity} overflows u64")))
}
