//! The SDK seam
//!
//! Handlers only ever talk to [`DeltaTradeClient`]. Concrete clients are built
//! per account by a [`ClientFactory`], which keeps the transport swappable.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::types::{
    AccountAsset, CreateDcaVaultParams, PairPrice, PairType, TradingPair, VaultPage, VaultQuery,
};
use std::collections::HashMap;

/// Failures reported by an SDK client
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request to Delta Trade API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Delta Trade API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Delta Trade API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("unexpected response from Delta Trade API: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Operations the gateway needs from the Delta Trade SDK, bound to one account.
#[async_trait]
pub trait DeltaTradeClient: Send + Sync {
    /// Account this client signs transactions for
    fn account_id(&self) -> &str;

    async fn get_pairs(&self, pair_type: Option<PairType>) -> Result<Vec<TradingPair>, SdkError>;

    async fn get_pair_prices(
        &self,
        pair_ids: &[String],
    ) -> Result<HashMap<String, PairPrice>, SdkError>;

    async fn get_account_assets(&self) -> Result<Vec<AccountAsset>, SdkError>;

    async fn get_my_dca_vaults(&self, query: &VaultQuery) -> Result<VaultPage, SdkError>;

    /// Returns `Ok(None)` when the parameters are acceptable, otherwise a
    /// field-to-message details object.
    async fn validate_dca_vault_params(
        &self,
        params: &CreateDcaVaultParams,
    ) -> Result<Option<Value>, SdkError>;

    /// The write operations return the unsigned transactions exactly as the
    /// SDK produced them, usually a list of
    /// `{signerId, receiverId, actions}` objects. Callers forward them
    /// untouched for the user to sign.
    async fn create_dca_vault(&self, params: &CreateDcaVaultParams) -> Result<Value, SdkError>;

    async fn close_dca_vault(&self, vault_id: &str) -> Result<Value, SdkError>;

    async fn claim_dca_vault(&self, vault_id: &str) -> Result<Value, SdkError>;
}

/// Builds a client bound to a given account
pub trait ClientFactory: Send + Sync {
    fn create(&self, account_id: &str) -> Result<Arc<dyn DeltaTradeClient>, SdkError>;
}
