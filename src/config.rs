//! Configuration module for environment variables and application settings

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    /// NEAR network the SDK operates on
    pub network: NearNetwork,

    /// Server configuration
    pub server: ServerConfig,

    /// Values published in the plugin manifest
    pub plugin: PluginConfig,

    /// Delta Trade API connection
    pub upstream: UpstreamConfig,

    /// Tool endpoint behaviour
    pub tools: ToolConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearNetwork {
    Mainnet,
    Testnet,
}

impl NearNetwork {
    fn default_api_url(&self) -> &'static str {
        match self {
            NearNetwork::Mainnet => "https://api.deltatrade.ai",
            NearNetwork::Testnet => "https://testnet.api.deltatrade.ai",
        }
    }
}

impl FromStr for NearNetwork {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NearNetwork::Mainnet),
            "testnet" => Ok(NearNetwork::Testnet),
            other => Err(anyhow!("NEAR_ENV must be mainnet or testnet, got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Account that owns the plugin (`BITTE_KEY.accountId`)
    pub account_id: Option<String>,
    /// Public base url of this deployment (`BITTE_CONFIG.url`)
    pub server_url: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Pair used by create-dca when the caller names none
    pub default_pair_id: Option<String>,
    /// Reject tool calls that carry no account metadata
    pub require_account: bool,
}

#[derive(Debug, Default, Deserialize)]
struct BitteKey {
    #[serde(rename = "accountId")]
    account_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BitteConfig {
    url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let network = match var("NEAR_ENV") {
            Some(raw) => raw.parse()?,
            None => NearNetwork::Mainnet,
        };

        let server = ServerConfig {
            host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: match var("PORT") {
                Some(raw) => raw.parse().with_context(|| format!("PORT is not a valid port: {}", raw))?,
                None => 3000,
            },
        };

        let key: BitteKey = parse_json_var("BITTE_KEY", var("BITTE_KEY"))?;
        let bitte_config: BitteConfig = parse_json_var("BITTE_CONFIG", var("BITTE_CONFIG"))?;

        let server_url = bitte_config
            .url
            .unwrap_or_else(|| format!("http://localhost:{}", server.port));
        Url::parse(&server_url).with_context(|| format!("BITTE_CONFIG.url is not a valid url: {}", server_url))?;

        let api_url = var("DELTA_TRADE_API_URL").unwrap_or_else(|| network.default_api_url().to_string());
        Url::parse(&api_url).with_context(|| format!("DELTA_TRADE_API_URL is not a valid url: {}", api_url))?;

        let timeout_secs = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("UPSTREAM_TIMEOUT_SECS is not a number: {}", raw))?,
            None => 10,
        };
        if timeout_secs == 0 {
            bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
        }

        let require_account = match var("REQUIRE_ACCOUNT").as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => bail!("REQUIRE_ACCOUNT must be true or false, got '{}'", other),
        };

        Ok(Self {
            network,
            server,
            plugin: PluginConfig {
                account_id: key.account_id.filter(|id| !id.is_empty()),
                server_url,
            },
            upstream: UpstreamConfig { api_url, timeout_secs },
            tools: ToolConfig {
                default_pair_id: var("DEFAULT_PAIR_ID"),
                require_account,
            },
        })
    }
}

fn parse_json_var<T>(name: &str, raw: Option<String>) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match raw {
        Some(raw) => serde_json::from_str(&raw).with_context(|| format!("{} must be a JSON object", name)),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.network, NearNetwork::Mainnet);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.plugin.account_id, None);
        assert_eq!(config.plugin.server_url, "http://localhost:3000");
        assert_eq!(config.upstream.api_url, "https://api.deltatrade.ai");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert!(!config.tools.require_account);
    }

    #[test]
    fn reads_bitte_json_blobs() {
        let config = load(&[
            ("BITTE_KEY", r#"{"accountId":"plugin.near"}"#),
            ("BITTE_CONFIG", r#"{"url":"https://dca.example.com"}"#),
            ("NEAR_ENV", "testnet"),
        ])
        .unwrap();
        assert_eq!(config.plugin.account_id.as_deref(), Some("plugin.near"));
        assert_eq!(config.plugin.server_url, "https://dca.example.com");
        assert_eq!(config.upstream.api_url, "https://testnet.api.deltatrade.ai");
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(load(&[("BITTE_KEY", "{not json")]).is_err());
        assert!(load(&[("NEAR_ENV", "devnet")]).is_err());
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("REQUIRE_ACCOUNT", "maybe")]).is_err());
    }
}
