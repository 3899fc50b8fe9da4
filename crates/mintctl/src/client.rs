//! Gateway client: typed minter reads and fire-and-forget sends.
//!
//! Production talks to a toncenter-style JSON-RPC gateway over HTTP. The
//! gateway holds the operator's signer, so submissions are plain RPC calls
//! here; key custody never enters this process.
//!
//! The `MinterApi` trait is the seam the whole console is built against:
//! session, actions, and poller only see the trait, and tests drive them
//! with scripted fakes.

use async_trait::async_trait;
use base64::Engine;
use minter_common::{
    Address, ContentCell, ContractState, ContractStatus, JettonData, TokenAmount, TxPosition,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// TON attached to the mint transfer for the receiving wallet, in nano.
const FORWARD_TON_NANO: u128 = 50_000_000;
/// Total TON attached to the mint message, in nano.
const TOTAL_TON_NANO: u128 = 100_000_000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway error {code}: {message}")]
    Gateway { code: i64, message: String },

    #[error("malformed gateway response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Typed surface over the minter contract and the ledger.
///
/// Every send is fire and forget: `Ok` means "accepted for submission",
/// never "applied". Settlement and verification are the caller's problem.
#[async_trait]
pub trait MinterApi: Send + Sync {
    /// Raw account state, including the last-transaction position.
    async fn contract_state(&self, address: &Address) -> ApiResult<ContractState>;

    /// Bundled minter state read.
    async fn jetton_data(&self, minter: &Address) -> ApiResult<JettonData>;

    async fn admin_address(&self, minter: &Address) -> ApiResult<Address> {
        Ok(self.jetton_data(minter).await?.admin)
    }

    async fn total_supply(&self, minter: &Address) -> ApiResult<TokenAmount> {
        Ok(self.jetton_data(minter).await?.total_supply)
    }

    async fn content(&self, minter: &Address) -> ApiResult<ContentCell> {
        Ok(self.jetton_data(minter).await?.content)
    }

    async fn send_mint(
        &self,
        minter: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> ApiResult<()>;

    async fn send_change_admin(&self, minter: &Address, new_admin: &Address) -> ApiResult<()>;

    async fn send_change_content(&self, minter: &Address, content: &ContentCell) -> ApiResult<()>;
}

/// HTTP JSON-RPC gateway client.
pub struct JettonGateway {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    /// Wallet the gateway signs submissions with, when one is configured.
    wallet: Option<Address>,
}

impl JettonGateway {
    pub fn new(endpoint: String, api_key: Option<String>, wallet: Option<Address>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            wallet,
        }
    }

    async fn call(&self, method: &str, params: Value) -> ApiResult<Value> {
        debug!("gateway call: {}", method);
        let body = json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }
        let response: Value = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if response.get("ok").and_then(Value::as_bool) == Some(true) {
            response
                .get("result")
                .cloned()
                .ok_or_else(|| ApiError::Decode("missing result".into()))
        } else {
            Err(ApiError::Gateway {
                code: response.get("code").and_then(Value::as_i64).unwrap_or(-1),
                message: response
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown gateway failure")
                    .to_string(),
            })
        }
    }

    fn send_params(&self, minter: &Address, extra: Value) -> Value {
        let mut params = serde_json::Map::new();
        params.insert("minter".into(), Value::String(minter.to_string()));
        if let Some(wallet) = &self.wallet {
            params.insert("wallet".into(), Value::String(wallet.to_string()));
        }
        if let Value::Object(map) = extra {
            params.extend(map);
        }
        Value::Object(params)
    }
}

#[async_trait]
impl MinterApi for JettonGateway {
    async fn contract_state(&self, address: &Address) -> ApiResult<ContractState> {
        let result = self
            .call("getContractState", json!({ "address": address.to_string() }))
            .await?;
        decode_contract_state(&result)
    }

    async fn jetton_data(&self, minter: &Address) -> ApiResult<JettonData> {
        let result = self
            .call("getJettonData", json!({ "address": minter.to_string() }))
            .await?;
        decode_jetton_data(&result)
    }

    async fn send_mint(
        &self,
        minter: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> ApiResult<()> {
        let params = self.send_params(
            minter,
            json!({
                "to": to.to_string(),
                "amount": amount.as_nano().to_string(),
                "forward_ton_amount": FORWARD_TON_NANO.to_string(),
                "total_ton_amount": TOTAL_TON_NANO.to_string(),
            }),
        );
        self.call("sendMint", params).await.map(|_| ())
    }

    async fn send_change_admin(&self, minter: &Address, new_admin: &Address) -> ApiResult<()> {
        let params = self.send_params(minter, json!({ "new_admin": new_admin.to_string() }));
        self.call("sendChangeAdmin", params).await.map(|_| ())
    }

    async fn send_change_content(&self, minter: &Address, content: &ContentCell) -> ApiResult<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(content.as_bytes());
        let params = self.send_params(minter, json!({ "content": encoded }));
        self.call("sendChangeContent", params).await.map(|_| ())
    }
}

fn decode_contract_state(result: &Value) -> ApiResult<ContractState> {
    let status = match result.get("state").and_then(Value::as_str) {
        Some("active") => ContractStatus::Active,
        Some("frozen") => ContractStatus::Frozen,
        Some("uninitialized") | None => ContractStatus::Uninitialized,
        Some(other) => {
            return Err(ApiError::Decode(format!("unknown account state '{other}'")));
        }
    };

    let code = match result.get("code").and_then(Value::as_str) {
        None | Some("") => None,
        Some(encoded) => Some(
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| ApiError::Decode(format!("code image: {e}")))?,
        ),
    };

    // The gateway always reports a last_transaction_id node; lt 0 means the
    // account has no history.
    let last_transaction = match result.get("last_transaction_id") {
        None => None,
        Some(node) => {
            let lt: u64 = node
                .get("lt")
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::Decode("last_transaction_id.lt missing".into()))?
                .parse()
                .map_err(|_| ApiError::Decode("last_transaction_id.lt not a number".into()))?;
            if lt == 0 {
                None
            } else {
                let hash = node
                    .get("hash")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ApiError::Decode("last_transaction_id.hash missing".into()))?;
                Some(TxPosition::new(lt, hash))
            }
        }
    };

    Ok(ContractState {
        status,
        code,
        last_transaction,
    })
}

fn decode_jetton_data(result: &Value) -> ApiResult<JettonData> {
    let total_supply = result
        .get("total_supply")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Decode("total_supply missing".into()))?
        .parse::<u128>()
        .map(TokenAmount::from_nano)
        .map_err(|_| ApiError::Decode("total_supply not a number".into()))?;

    let mintable = result
        .get("mintable")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::Decode("mintable missing".into()))?;

    let admin = result
        .get("admin_address")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Decode("admin_address missing".into()))?
        .parse()
        .map_err(|e| ApiError::Decode(format!("admin_address: {e}")))?;

    let content = result
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Decode("content missing".into()))
        .and_then(|encoded| {
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map(ContentCell::from_bytes)
                .map_err(|e| ApiError::Decode(format!("content: {e}")))
        })?;

    Ok(JettonData {
        total_supply,
        mintable,
        admin,
        content,
    })
}
