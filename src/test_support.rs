//! In-memory SDK client and request helpers shared by unit tests.

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::config::{PluginConfig, ToolConfig};
use crate::manifest::{PluginManifest, build_document};
use crate::sdk::types::{
    AccountAsset, CreateDcaVaultParams, MyDcaVault, PairPrice, PairType, TokenInfo, TradingPair,
    VaultPage, VaultQuery,
};
use crate::sdk::validation::validate_vault_params;
use crate::sdk::{ClientFactory, DeltaTradeClient, SdkError};
use crate::server::{AppState, build_router};

/// Canned SDK data
#[derive(Clone, Default)]
pub struct MockData {
    pub pairs: Vec<TradingPair>,
    pub vaults: Vec<MyDcaVault>,
    pub assets: Vec<AccountAsset>,
    /// When set, every SDK call fails with this message
    pub failure: Option<String>,
}

pub struct MockClient {
    account_id: String,
    data: Arc<MockData>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockClient {
    fn record(&self, call: String) -> Result<(), SdkError> {
        self.calls.lock().unwrap().push(format!("{}:{}", self.account_id, call));
        match &self.data.failure {
            Some(message) => Err(SdkError::Api { code: 500, message: message.clone() }),
            None => Ok(()),
        }
    }

    fn payload(&self, method: &str) -> Value {
        json!([{
            "signerId": self.account_id,
            "receiverId": "dca.deltatrade.near",
            "actions": [{ "type": "FunctionCall", "params": { "methodName": method } }],
            "nonce": 1,
        }])
    }
}

#[async_trait]
impl DeltaTradeClient for MockClient {
    fn account_id(&self) -> &str {
        &self.account_id
    }

    async fn get_pairs(&self, pair_type: Option<PairType>) -> Result<Vec<TradingPair>, SdkError> {
        let label = pair_type.map(|t| t.to_string()).unwrap_or_else(|| "all".into());
        self.record(format!("get_pairs:{}", label))?;
        Ok(self.data.pairs.clone())
    }

    async fn get_pair_prices(
        &self,
        pair_ids: &[String],
    ) -> Result<HashMap<String, PairPrice>, SdkError> {
        self.record(format!("get_pair_prices:{}", pair_ids.join(",")))?;
        Ok(pair_ids
            .iter()
            .map(|id| {
                (id.clone(), PairPrice {
                    pair_id: id.clone(),
                    base_price: json!("5"),
                    quote_price: json!("1"),
                    pair_price: json!("5"),
                    ..Default::default()
                })
            })
            .collect())
    }

    async fn get_account_assets(&self) -> Result<Vec<AccountAsset>, SdkError> {
        self.record("get_account_assets".into())?;
        Ok(self.data.assets.clone())
    }

    async fn get_my_dca_vaults(&self, query: &VaultQuery) -> Result<VaultPage, SdkError> {
        self.record(format!("get_my_dca_vaults:{}:{}", query.order_by, query.page_size))?;
        Ok(VaultPage {
            list: self.data.vaults.clone(),
            total: Some(self.data.vaults.len() as u64),
            ..Default::default()
        })
    }

    async fn validate_dca_vault_params(
        &self,
        params: &CreateDcaVaultParams,
    ) -> Result<Option<Value>, SdkError> {
        self.record("validate_dca_vault_params".into())?;
        Ok(validate_vault_params(params, chrono::Utc::now().timestamp_millis()))
    }

    async fn create_dca_vault(&self, params: &CreateDcaVaultParams) -> Result<Value, SdkError> {
        self.record(format!("create_dca_vault:{}", params.pair_id))?;
        Ok(self.payload("create_dca_vault"))
    }

    async fn close_dca_vault(&self, vault_id: &str) -> Result<Value, SdkError> {
        self.record(format!("close_dca_vault:{}", vault_id))?;
        Ok(self.payload("close_vault"))
    }

    async fn claim_dca_vault(&self, vault_id: &str) -> Result<Value, SdkError> {
        self.record(format!("claim_dca_vault:{}", vault_id))?;
        Ok(self.payload("claim"))
    }
}

#[derive(Default)]
pub struct MockFactory {
    data: Arc<MockData>,
    calls: Arc<Mutex<Vec<String>>>,
    created: AtomicUsize,
    broken: bool,
}

impl MockFactory {
    pub fn with_data(data: MockData) -> Self {
        Self { data: Arc::new(data), ..Default::default() }
    }

    /// A factory that cannot build clients at all
    pub fn failing() -> Self {
        Self { broken: true, ..Default::default() }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ClientFactory for MockFactory {
    fn create(&self, account_id: &str) -> Result<Arc<dyn DeltaTradeClient>, SdkError> {
        if self.broken {
            return Err(SdkError::Config("mock factory is broken".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockClient {
            account_id: account_id.to_string(),
            data: Arc::clone(&self.data),
            calls: Arc::clone(&self.calls),
        }))
    }
}

pub fn sample_pair(id: &str, name: &str) -> TradingPair {
    TradingPair {
        pair_id: id.into(),
        name: name.into(),
        base_token: TokenInfo { symbol: name.split('/').next().unwrap_or_default().into(), ..Default::default() },
        quote_token: TokenInfo { symbol: "USDC".into(), ..Default::default() },
        price: json!("5.1"),
        change: json!(2.4),
        support_dca: true,
        ..Default::default()
    }
}

pub fn sample_data() -> MockData {
    MockData {
        pairs: vec![
            sample_pair("wrap.near:usdc", "NEAR/USDC"),
            sample_pair("token.v2.ref-finance.near:usdc", "REF/USDC"),
        ],
        vaults: vec![MyDcaVault {
            id: json!(11),
            name: "Weekly NEAR".into(),
            side: "buy".into(),
            profit_percent: json!("4.2"),
            ..Default::default()
        }],
        assets: vec![AccountAsset {
            token: TokenInfo { symbol: "NEAR".into(), code: "wrap.near".into(), ..Default::default() },
            balance: json!("12.5"),
            price: json!(5.1),
            internal_balance: json!("0"),
            ..Default::default()
        }],
        failure: None,
    }
}

pub fn tool_config() -> ToolConfig {
    ToolConfig { default_pair_id: None, require_account: false }
}

pub fn app(factory: Arc<MockFactory>, tools: ToolConfig) -> Router {
    let manifest = PluginManifest::new(&build_document(&PluginConfig {
        account_id: Some("plugin.near".into()),
        server_url: "https://dca.example.com".into(),
    }));
    build_router(AppState::new(factory, manifest, tools))
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

pub async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(router, request).await;
    let value = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

pub fn as_account(mut request: Request<Body>, account_id: &str) -> Request<Body> {
    let metadata = json!({ "accountId": account_id }).to_string();
    request.headers_mut().insert("mb-metadata", metadata.parse().unwrap());
    request
}
