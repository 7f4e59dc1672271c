//! HTTP route handlers for the scout API.
//!
//! All payloads use JSON with camelCase fields. Lookup failures come back as
//! JSON error bodies: unknown chains and invalid addresses are client errors
//! (400), upstream RPC failures surface as 502.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::address::Address;
use crate::chain::ClientRegistry;
use crate::collections::CollectionIndex;
use crate::error::Error;
use crate::xp::XpStore;

/// Shared application state injected into every handler.
#[derive(Debug)]
pub struct AppState {
    /// Chain client registry, one cached RPC client per chain.
    pub registry: ClientRegistry,
    /// Curated collection catalog.
    pub collections: CollectionIndex,
    /// Experience point ledger.
    pub xp: XpStore,
}

/// Type alias for the shared state used by axum route handlers.
pub type ScoutState = Arc<AppState>;

/// Creates the axum router with all scout endpoints.
pub fn routes() -> Router<ScoutState> {
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
        .route("/v1/chains", get(get_chains))
        .route("/v1/chains/{chain}/collections", get(get_collections))
        .route("/v1/wallets/{chain}/{address}", get(get_wallet_stats))
        .route("/v1/xp/{address}", get(get_xp).post(post_xp))
}

/// Error wrapper giving [`Error`] an HTTP response mapping.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ApiError(#[from] Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::UnsupportedChain(_) | Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::Rpc(_) => StatusCode::BAD_GATEWAY,
            Error::Chain(_) | Error::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// `GET /` returns a simple greeting.
async fn get_root() -> impl IntoResponse {
    (
        StatusCode::OK,
        concat!("Hello from ", env!("CARGO_PKG_NAME"), "!"),
    )
}

/// `GET /health` is a lightweight liveness check.
async fn get_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Wire form of a chain catalog entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChainSummary {
    slug: String,
    chain_id: u64,
    name: String,
    explorer: String,
}

/// `GET /v1/chains` lists the supported chain catalog.
#[instrument(skip_all)]
async fn get_chains(State(state): State<ScoutState>) -> impl IntoResponse {
    let mut chains: Vec<ChainSummary> = state
        .registry
        .chains()
        .map(|chain| ChainSummary {
            slug: chain.slug.clone(),
            chain_id: chain.id,
            name: chain.name.clone(),
            explorer: chain.explorer.clone(),
        })
        .collect();
    chains.sort_by_key(|chain| chain.chain_id);
    (StatusCode::OK, Json(json!({ "chains": chains })))
}

/// `GET /v1/chains/{chain}/collections` lists curated collections for a chain.
#[instrument(skip_all, fields(chain = %chain))]
async fn get_collections(
    State(state): State<ScoutState>,
    Path(chain): Path<String>,
) -> Response {
    if state.registry.chain(&chain).is_none() {
        return ApiError(Error::UnsupportedChain(chain)).into_response();
    }
    let collections = state.collections.for_chain(&chain);
    (
        StatusCode::OK,
        Json(json!({ "chain": chain, "collections": collections })),
    )
        .into_response()
}

/// Wire form of wallet interaction statistics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletStats {
    address: Address,
    chain: String,
    chain_id: u64,
    balance_wei: String,
    tx_count: u64,
    block_number: u64,
    explorer_url: String,
}

/// `GET /v1/wallets/{chain}/{address}` returns wallet interaction statistics,
/// fetched over JSON-RPC through the chain's cached client.
#[instrument(skip_all, fields(chain = %chain))]
async fn get_wallet_stats(
    State(state): State<ScoutState>,
    Path((chain, address)): Path<(String, String)>,
) -> Response {
    let address = match Address::from_str(&address) {
        Ok(address) => address,
        Err(error) => return ApiError(error).into_response(),
    };
    let client = match state.registry.client(&chain) {
        Ok(client) => client,
        Err(error) => return ApiError(error).into_response(),
    };

    let lookups = tokio::try_join!(
        client.balance(&address),
        client.transaction_count(&address),
        client.block_number(),
    );
    let (balance, tx_count, block_number) = match lookups {
        Ok(values) => values,
        Err(error) => {
            tracing::warn!(%address, ?error, "wallet stats lookup failed");
            return ApiError(error).into_response();
        }
    };

    let config = client.chain();
    let stats = WalletStats {
        chain: config.slug.clone(),
        chain_id: config.id,
        balance_wei: format!("{balance:#x}"),
        tx_count,
        block_number,
        explorer_url: format!(
            "{}/address/{address}",
            config.explorer.trim_end_matches('/')
        ),
        address,
    };
    (StatusCode::OK, Json(json!(stats))).into_response()
}

/// Wire form of an experience point total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct XpSummary {
    address: Address,
    xp: u64,
}

/// `GET /v1/xp/{address}` reads the current experience point total.
#[instrument(skip_all)]
async fn get_xp(State(state): State<ScoutState>, Path(address): Path<String>) -> Response {
    let address = match Address::from_str(&address) {
        Ok(address) => address,
        Err(error) => return ApiError(error).into_response(),
    };
    let xp = state.xp.total(&address);
    (StatusCode::OK, Json(json!(XpSummary { address, xp }))).into_response()
}

/// Body of `POST /v1/xp/{address}`.
#[derive(Debug, Clone, Copy, Deserialize)]
struct AwardRequest {
    amount: u64,
}

/// `POST /v1/xp/{address}` awards experience points, returning the new
/// total.
#[instrument(skip_all)]
async fn post_xp(
    State(state): State<ScoutState>,
    Path(address): Path<String>,
    body: Result<Json<AwardRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid request body" })),
        )
            .into_response();
    };
    let address = match Address::from_str(&address) {
        Ok(address) => address,
        Err(error) => return ApiError(error).into_response(),
    };
    let xp = state.xp.award(&address, request.amount);
    tracing::debug!(%address, amount = request.amount, "xp awarded");
    (StatusCode::OK, Json(json!(XpSummary { address, xp }))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::chain::{ChainConfig, ChainsConfig};
    use crate::collections::CollectionConfig;

    fn app() -> Router {
        let chains = ChainsConfig(vec![
            ChainConfig {
                slug: "ethereum".to_owned(),
                id: 1,
                name: "Ethereum".to_owned(),
                rpc_url: "https://eth.example".to_owned(),
                explorer: "https://etherscan.io".to_owned(),
            },
            ChainConfig {
                slug: "base".to_owned(),
                id: 8453,
                name: "Base".to_owned(),
                rpc_url: "https://mainnet.base.org".to_owned(),
                explorer: "https://basescan.org".to_owned(),
            },
        ]);
        let registry = ClientRegistry::new(&chains);
        let collections = CollectionIndex::build(
            &[CollectionConfig {
                chain: "ethereum".to_owned(),
                address: "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d".to_owned(),
                name: "Bored Ape Yacht Club".to_owned(),
            }],
            &registry,
        )
        .expect("test collections should build");

        let state = Arc::new(AppState {
            registry,
            collections,
            xp: XpStore::default(),
        });
        routes().with_state(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("request should be handled");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request should build")
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request should build")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app();
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn chains_catalog_is_sorted_by_chain_id() {
        let app = app();
        let (status, body) = send(&app, get("/v1/chains")).await;
        assert_eq!(status, StatusCode::OK);
        let chains = body["chains"].as_array().expect("chains array");
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0]["slug"], "ethereum");
        assert_eq!(chains[0]["chainId"], 1);
        assert_eq!(chains[1]["slug"], "base");
    }

    #[tokio::test]
    async fn collections_listed_for_known_chain() {
        let app = app();
        let (status, body) = send(&app, get("/v1/chains/ethereum/collections")).await;
        assert_eq!(status, StatusCode::OK);
        let collections = body["collections"].as_array().expect("collections array");
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0]["name"], "Bored Ape Yacht Club");
        assert_eq!(
            collections[0]["id"].as_str().expect("id string").len(),
            16
        );
    }

    #[tokio::test]
    async fn collections_empty_for_chain_without_entries() {
        let app = app();
        let (status, body) = send(&app, get("/v1/chains/base/collections")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collections"], json!([]));
    }

    #[tokio::test]
    async fn unknown_chain_is_rejected() {
        let app = app();
        let (status, body) = send(&app, get("/v1/chains/dogecoin/collections")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .contains("unsupported chain")
        );
    }

    #[tokio::test]
    async fn wallet_stats_rejects_invalid_address() {
        let app = app();
        let (status, body) = send(&app, get("/v1/wallets/ethereum/nothex")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body["error"]
                .as_str()
                .expect("error string")
                .contains("invalid address")
        );
    }

    #[tokio::test]
    async fn wallet_stats_rejects_unknown_chain() {
        let app = app();
        let (status, _) = send(
            &app,
            get("/v1/wallets/dogecoin/0x00000000000000000000000000000000000000aa"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn xp_awards_accumulate_across_requests() {
        let app = app();
        let address = "0x00000000000000000000000000000000000000aa";

        let (status, body) = send(&app, get(&format!("/v1/xp/{address}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["xp"], 0);

        let (status, body) = send(
            &app,
            post_json(&format!("/v1/xp/{address}"), r#"{"amount":25}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["xp"], 25);

        // Checksummed casing addresses the same ledger entry.
        let mixed = "0x00000000000000000000000000000000000000AA";
        let (_, body) = send(
            &app,
            post_json(&format!("/v1/xp/{mixed}"), r#"{"amount":40}"#),
        )
        .await;
        assert_eq!(body["xp"], 65);
        assert_eq!(body["address"], address);
    }

    #[tokio::test]
    async fn xp_award_rejects_malformed_body() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json(
                "/v1/xp/0x00000000000000000000000000000000000000aa",
                r#"{"amount":"lots"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid request body");
    }
}
