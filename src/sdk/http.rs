//! reqwest-backed Delta Trade client
//!
//! Talks JSON to the Delta Trade API. Every response is wrapped in the
//! `{code, data, msg}` envelope; a non-zero `code` is an API error.
//!
//! The REST layout used here (`api/v1/pairs`, `api/v1/pairs/prices`,
//! `api/v1/account/assets`, `api/v1/dca/{vaults,create,close,claim}` under
//! `DELTA_TRADE_API_URL`) is an assumed contract, not a published one. Point
//! `DELTA_TRADE_API_URL` at a compatible service, or plug a different
//! [`ClientFactory`] into the server when the real backend differs.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::client::{ClientFactory, DeltaTradeClient, SdkError};
use super::types::{
    AccountAsset, CreateDcaVaultParams, PairPrice, PairType, TradingPair, VaultPage, VaultQuery,
};
use super::validation::validate_vault_params;
use crate::config::UpstreamConfig;

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    code: i64,
    data: Option<T>,
    #[serde(default)]
    msg: Option<String>,
}

/// Shares one connection pool between all per-account clients
#[derive(Clone)]
pub struct HttpClientFactory {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpClientFactory {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = config.api_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| SdkError::Config(format!("invalid Delta Trade API url '{}': {}", base, e)))?;

        Ok(Self { http, base_url })
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(&self, account_id: &str) -> Result<Arc<dyn DeltaTradeClient>, SdkError> {
        Ok(Arc::new(HttpDeltaTradeClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            account_id: account_id.to_string(),
        }))
    }
}

pub struct HttpDeltaTradeClient {
    http: reqwest::Client,
    base_url: Url,
    account_id: String,
}

impl HttpDeltaTradeClient {
    fn endpoint(&self, path: &str) -> Result<Url, SdkError> {
        self.base_url
            .join(path)
            .map_err(|e| SdkError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SdkError> {
        let url = self.endpoint(path)?;
        debug!("GET {} for account {}", url, self.account_id);
        let response = self.http.get(url).query(query).send().await?;
        read_envelope(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SdkError> {
        let url = self.endpoint(path)?;
        debug!("POST {} for account {}", url, self.account_id);
        let response = self.http.post(url).json(body).send().await?;
        read_envelope(response).await
    }

    /// Wraps `value` with the bound account id for write operations
    fn with_account(&self, value: Value) -> Value {
        match value {
            Value::Object(mut map) => {
                map.insert("accountId".into(), Value::String(self.account_id.clone()));
                Value::Object(map)
            }
            other => other,
        }
    }
}

async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SdkError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SdkError::Status { status: status.as_u16(), body });
    }

    let envelope: ApiEnvelope<T> = response
        .json()
        .await
        .map_err(|e| SdkError::Decode(e.to_string()))?;

    if envelope.code != 0 {
        return Err(SdkError::Api {
            code: envelope.code,
            message: envelope.msg.unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    envelope
        .data
        .ok_or_else(|| SdkError::Decode("response envelope carries no data".to_string()))
}

#[async_trait]
impl DeltaTradeClient for HttpDeltaTradeClient {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn get_pairs(&self, pair_type: Option<PairType>) -> Result<Vec<TradingPair>, SdkError> {
        let query: Vec<(&str, String)> = pair_type
            .map(|t| vec![("type", t.as_str().to_string())])
            .unwrap_or_default();
        self.get("api/v1/pairs", &query).await
    }

    async fn get_pair_prices(
        &self,
        pair_ids: &[String],
    ) -> Result<HashMap<String, PairPrice>, SdkError> {
        if pair_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.get("api/v1/pairs/prices", &[("pairIds", pair_ids.join(","))]).await
    }

    async fn get_account_assets(&self) -> Result<Vec<AccountAsset>, SdkError> {
        self.get("api/v1/account/assets", &[("accountId", self.account_id.clone())])
            .await
    }

    async fn get_my_dca_vaults(&self, query: &VaultQuery) -> Result<VaultPage, SdkError> {
        let params = [
            ("accountId", self.account_id.clone()),
            ("orderBy", query.order_by.clone()),
            ("dir", query.dir.clone()),
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        self.get("api/v1/dca/vaults", &params).await
    }

    async fn validate_dca_vault_params(
        &self,
        params: &CreateDcaVaultParams,
    ) -> Result<Option<Value>, SdkError> {
        Ok(validate_vault_params(params, chrono::Utc::now().timestamp_millis()))
    }

    async fn create_dca_vault(&self, params: &CreateDcaVaultParams) -> Result<Value, SdkError> {
        let body = serde_json::to_value(params).map_err(|e| SdkError::Decode(e.to_string()))?;
        self.post("api/v1/dca/create", &self.with_account(body)).await
    }

    async fn close_dca_vault(&self, vault_id: &str) -> Result<Value, SdkError> {
        let body = self.with_account(json!({ "vaultId": vault_id }));
        self.post("api/v1/dca/close", &body).await
    }

    async fn claim_dca_vault(&self, vault_id: &str) -> Result<Value, SdkError> {
        let body = self.with_account(json!({ "vaultId": vault_id }));
        self.post("api/v1/dca/claim", &body).await
    }
}
