//! # Plugin Manifest
//!
//! The OpenAPI-style document the assistant framework reads to discover the
//! tools. It is assembled once at startup and served with a weak ETag.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use ring::digest::{SHA256, digest};
use serde_json::{Value, json};

use crate::config::PluginConfig;
use crate::sdk::validation::{MAX_EXECUTION_COUNT, MIN_EXECUTION_COUNT, MIN_INTERVAL_MS, MIN_SINGLE_AMOUNT_IN};

const ASSISTANT_IMAGE: &str = "https://assets.deltatrade.ai/assets/img/logo-b.svg";
const WEEK_MS: u64 = 604_800_000;

const INSTRUCTIONS: &str = "You help users set up Dollar Cost Averaging (DCA) plans on NEAR with Delta Trade. \
Check current prices with get-pair-prices before proposing a plan. \
Collect the trade direction, the interval between trades in milliseconds (daily 86400000, weekly 604800000, monthly 2592000000), \
the amount per trade and the number of executions before calling create-dca, and ask for anything missing. \
Always remind the user that the plan starts only after they sign the returned transactions.";

/// Serialized manifest plus its validator
#[derive(Debug, Clone)]
pub struct PluginManifest {
    body: String,
    etag: String,
}

impl PluginManifest {
    pub fn new(document: &Value) -> Self {
        let body = document.to_string();
        let etag = compute_etag(body.as_bytes());
        Self { body, etag }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// Evaluates an `If-None-Match` header value against this manifest
    pub fn matches(&self, if_none_match: &str) -> bool {
        let ours = strip_weak(&self.etag);
        if_none_match
            .split(',')
            .map(str::trim)
            .any(|candidate| candidate == "*" || strip_weak(candidate) == ours)
    }
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

pub fn compute_etag(bytes: &[u8]) -> String {
    let hash = digest(&SHA256, bytes);
    format!("W/\"{}\"", STANDARD.encode(hash.as_ref()))
}

fn query_param(name: &str, required: bool, schema: Value, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": required,
        "schema": schema,
        "description": description,
    })
}

fn detail_param(what: &str) -> Value {
    query_param(
        "detail",
        false,
        json!({ "type": "boolean", "default": false }),
        &format!("Whether to return detailed {} information", what),
    )
}

fn vault_id_param(action: &str) -> Value {
    query_param(
        "vaultId",
        true,
        json!({ "type": "string" }),
        &format!("The ID of the DCA vault to {}", action),
    )
}

fn transactions_response(description: &str) -> Value {
    json!({
        "200": {
            "description": description,
            "content": { "application/json": { "schema": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "signerId": { "type": "string" },
                        "receiverId": { "type": "string" },
                        "actions": { "type": "array", "items": { "type": "object" } }
                    }
                }
            }}}
        }
    })
}

fn display_schema(list_field: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            list_field: { "type": "array", "items": { "type": "string" } }
        }
    })
}

/// Assembles the manifest document for this deployment
pub fn build_document(config: &PluginConfig) -> Value {
    if config.account_id.is_none() {
        tracing::error!("BITTE_KEY carries no accountId; manifest will be published without an owner");
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Delta Trade DCA Bot",
            "description": "API for creating and managing DCA trading bots on NEAR",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "servers": [{ "url": config.server_url }],
        "x-mb": {
            "account-id": config.account_id,
            "assistant": {
                "name": "Delta Trade DCA Helper",
                "description": "A friendly assistant that helps you set up DCA plans to buy NEAR and other tokens",
                "instructions": INSTRUCTIONS,
                "tools": [{ "type": "generate-transaction" }],
                "image": ASSISTANT_IMAGE,
            }
        },
        "paths": {
            "/api/tools/get-pairs": { "get": {
                "operationId": "get-pairs",
                "summary": "Get Available Trading Pairs",
                "parameters": [
                    query_param("type", false,
                        json!({ "type": "string", "enum": ["dca", "grid", "swing"], "default": "dca" }),
                        "Type of trading pairs to retrieve"),
                    detail_param("trading pair"),
                ],
                "responses": { "200": {
                    "description": "Successfully retrieved trading pairs",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": {
                            "pairs": { "type": "array", "items": { "type": "object" } },
                            "display": display_schema("formatted_pairs"),
                        }
                    }}}
                }}
            }},
            "/api/tools/get-pair-prices": { "get": {
                "operationId": "get-pair-prices",
                "summary": "Get Prices of Trading Pairs",
                "parameters": [
                    query_param("pairIds", false, json!({ "type": "string" }),
                        "Comma-separated list of pair IDs; defaults to every DCA pair"),
                ],
                "responses": { "200": {
                    "description": "Map of pair IDs to their current prices",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": { "pairPrices": {
                            "type": "object",
                            "additionalProperties": {
                                "type": "object",
                                "properties": {
                                    "pair_id": { "type": "string" },
                                    "basePrice": { "type": "string" },
                                    "quotePrice": { "type": "string" },
                                    "pairPrice": { "type": "string" }
                                }
                            }
                        }},
                        "required": ["pairPrices"]
                    }}}
                }}
            }},
            "/api/tools/create-dca": { "post": {
                "operationId": "get-dca-transactions",
                "summary": "Create DCA Plan",
                "description": "Returns the transactions that create a DCA vault once signed",
                "parameters": [
                    query_param("pairId", false, json!({ "type": "string" }),
                        "Trading pair ID; defaults to the main NEAR/USDC pair"),
                    query_param("tradeType", true,
                        json!({ "type": "string", "enum": ["buy", "sell"], "default": "buy" }),
                        "Trading direction"),
                    query_param("intervalTime", true,
                        json!({ "type": "number", "default": WEEK_MS, "minimum": MIN_INTERVAL_MS }),
                        "Time between executions in milliseconds"),
                    query_param("startTime", false, json!({ "type": "number" }),
                        "Start of the plan in milliseconds since epoch; defaults to five minutes from now"),
                    query_param("singleAmountIn", true,
                        json!({ "type": "number", "minimum": MIN_SINGLE_AMOUNT_IN }),
                        "Amount per execution (quote token for buy, base token for sell)"),
                    query_param("count", true,
                        json!({ "type": "integer", "minimum": MIN_EXECUTION_COUNT, "maximum": MAX_EXECUTION_COUNT }),
                        "Number of executions"),
                    query_param("lowestPrice", false, json!({ "type": "number" }), "Optional lowest price limit"),
                    query_param("highestPrice", false, json!({ "type": "number" }), "Optional highest price limit"),
                    query_param("name", false, json!({ "type": "string" }), "Name for the DCA plan"),
                ],
                "responses": { "200": {
                    "description": "Transactions to sign plus the submitted parameters",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": {
                            "status": { "type": "string" },
                            "transaction": { "type": "array", "items": { "type": "object" } },
                            "vaultParams": { "type": "object" }
                        }
                    }}}
                }}
            }},
            "/api/tools/close-dca": { "post": {
                "operationId": "close-dca",
                "summary": "Close DCA Vault",
                "parameters": [vault_id_param("close")],
                "responses": transactions_response("Transactions that close the vault"),
            }},
            "/api/tools/claim-dca": { "post": {
                "operationId": "claim-dca",
                "summary": "Claim DCA Rewards",
                "parameters": [vault_id_param("claim rewards from")],
                "responses": transactions_response("Transactions that claim the vault rewards"),
            }},
            "/api/tools/my-dca-vaults": { "get": {
                "operationId": "get-my-dca-vaults",
                "summary": "List My DCA Vaults",
                "parameters": [detail_param("vault")],
                "responses": { "200": {
                    "description": "The caller's DCA vaults ordered by 24h profit",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": {
                            "vaults": { "type": "object" },
                            "display": display_schema("formatted_vaults"),
                        }
                    }}}
                }}
            }},
            "/api/tools/my-assets": { "get": {
                "operationId": "get-my-assets",
                "summary": "Get User Token Assets",
                "parameters": [detail_param("asset")],
                "responses": { "200": {
                    "description": "Returns list of user token assets",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": {
                            "assets": { "type": "array", "items": { "type": "object" } },
                            "display": display_schema("formatted_assets"),
                        }
                    }}}
                }}
            }},
            "/api/tools/get-user": { "get": {
                "operationId": "get-user",
                "summary": "Get the calling account",
                "responses": { "200": {
                    "description": "Account the assistant is acting for",
                    "content": { "application/json": { "schema": {
                        "type": "object",
                        "properties": { "accountId": { "type": "string" } }
                    }}}
                }}
            }}
        }
    })
}
