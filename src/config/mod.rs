use std::env;

use alloy::primitives::Address;

use crate::anthropic::client::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::bsc::explorer::BSCSCAN_API_BASE;
use crate::bsc::prices::COINGECKO_API_BASE;

const DEFAULT_RPC_URL: &str = "https://bsc-dataseed.binance.org";
const DEFAULT_CHAIN_ID: u64 = 56;

#[derive(Clone, Default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on `/api/*` routes when set.
    pub api_token: Option<String>,

    // Block explorer and prices
    pub bscscan_api_key: String,
    pub bscscan_api_url: String,
    pub coingecko_api_url: String,

    // AI synthesis: deterministic fallback without a key
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_max_tokens: u32,

    // Strategy registry: in-process registry without an address
    pub registry_address: Option<Address>,
    pub registry_rpc_url: String,
    pub registry_chain_id: u64,
    pub registry_private_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("bscscan_api_url", &self.bscscan_api_url)
            .field("coingecko_api_url", &self.coingecko_api_url)
            .field("anthropic_enabled", &self.anthropic_api_key.is_some())
            .field("anthropic_model", &self.anthropic_model)
            .field("registry_address", &self.registry_address)
            .field("registry_rpc_url", &self.registry_rpc_url)
            .field("registry_chain_id", &self.registry_chain_id)
            .field("registry_signer", &self.registry_private_key.is_some())
            .finish()
    }
}

/// Non-empty, trimmed value of an environment variable.
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let registry_address = match optional("REGISTRY_ADDRESS") {
            Some(raw) => {
                let address: Address = raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("REGISTRY_ADDRESS is invalid: {e}"))?;
                // The zero address is the "not deployed" placeholder
                (!address.is_zero()).then_some(address)
            }
            None => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            api_token: optional("API_TOKEN"),

            bscscan_api_key: env::var("BSCSCAN_API_KEY").unwrap_or_default(),
            bscscan_api_url: optional("BSCSCAN_API_URL").unwrap_or_else(|| BSCSCAN_API_BASE.into()),
            coingecko_api_url: optional("COINGECKO_API_URL")
                .unwrap_or_else(|| COINGECKO_API_BASE.into()),

            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            anthropic_model: optional("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            anthropic_max_tokens: match optional("ANTHROPIC_MAX_TOKENS") {
                Some(raw) => raw.parse()?,
                None => DEFAULT_MAX_TOKENS,
            },

            registry_address,
            registry_rpc_url: optional("REGISTRY_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.into()),
            registry_chain_id: match optional("REGISTRY_CHAIN_ID") {
                Some(raw) => raw.parse()?,
                None => DEFAULT_CHAIN_ID,
            },
            registry_private_key: optional("REGISTRY_PRIVATE_KEY"),
        })
    }

    /// Defaults for every setting, with no credentials. Used by tests.
    pub fn offline() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            bscscan_api_url: BSCSCAN_API_BASE.into(),
            coingecko_api_url: COINGECKO_API_BASE.into(),
            anthropic_model: DEFAULT_MODEL.into(),
            anthropic_max_tokens: DEFAULT_MAX_TOKENS,
            registry_rpc_url: DEFAULT_RPC_URL.into(),
            registry_chain_id: DEFAULT_CHAIN_ID,
            ..Default::default()
        }
    }

    pub fn has_ai(&self) -> bool {
        self.anthropic_api_key.is_some()
    }

    /// True when a deployed registry contract is configured.
    pub fn has_chain_registry(&self) -> bool {
        self.registry_address.is_some()
    }
}
