//! API error envelope
//!
//! Every handler failure is rendered as `{"error": ..., "details": ...}`.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::sdk::SdkError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Parameter validation failed")]
    Validation { details: Value },

    #[error("{0} parameter is required")]
    MissingParameter(&'static str),

    #[error("Invalid {name} parameter: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("No account id")]
    MissingAccount,

    #[error("No valid trading pairs found")]
    NoTradingPairs,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `context` names the failed operation, e.g. "Failed to close DCA vault"
    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: SdkError,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn upstream(context: &'static str) -> impl FnOnce(SdkError) -> ApiError {
        move |source| ApiError::Upstream { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. }
            | ApiError::MissingParameter(_)
            | ApiError::InvalidParameter { .. }
            | ApiError::MissingAccount
            | ApiError::NoTradingPairs => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Validation { details } => Some(details.clone()),
            ApiError::Upstream { source, .. } => Some(Value::String(source.to_string())),
            _ => None,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidParameter {
            name: "query",
            reason: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}: {:?}", self, self.details());
        } else {
            tracing::warn!("Rejected tool call ({}): {}", status, self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for known paths hit with the wrong verb
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
