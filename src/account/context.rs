//! Caller account resolution
//!
//! The assistant runtime forwards the caller's identity as a JSON blob in the
//! `mb-metadata` header. Two shapes are in circulation:
//!
//! ```json
//! { "accountId": "alice.near" }
//! { "accountData": { "accountId": "alice.near" } }
//! ```
//!
//! Anything else resolves to the default account.

use axum::{extract::FromRequestParts, http::{HeaderMap, request::Parts}};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

pub const METADATA_HEADER: &str = "mb-metadata";
pub const DEFAULT_ACCOUNT_ID: &str = "near";

#[derive(Debug, Default, Deserialize)]
struct MbMetadata {
    #[serde(rename = "accountId")]
    account_id: Option<String>,
    #[serde(rename = "accountData")]
    account_data: Option<AccountData>,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(rename = "accountId")]
    account_id: Option<String>,
}

/// Account a request acts on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountContext {
    account_id: String,
    /// `false` when the id fell back to the default
    explicit: bool,
}

impl AccountContext {
    pub fn explicit(account_id: impl Into<String>) -> Self {
        Self { account_id: account_id.into(), explicit: true }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let metadata = headers
            .get(METADATA_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| match serde_json::from_str::<MbMetadata>(raw) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::warn!("Ignoring unparseable {} header: {}", METADATA_HEADER, e);
                    None
                }
            })
            .unwrap_or_default();

        let account_id = metadata
            .account_id
            .or_else(|| metadata.account_data.and_then(|data| data.account_id))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        match account_id {
            Some(id) => Self::explicit(id),
            None => Self::default(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }
}

impl Default for AccountContext {
    fn default() -> Self {
        Self { account_id: DEFAULT_ACCOUNT_ID.to_string(), explicit: false }
    }
}

impl<S> FromRequestParts<S> for AccountContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
