use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marker stored in `TokenHolding::contract` for the chain's native coin.
pub const NATIVE_CONTRACT: &str = "native";

/// A single token position held by the scanned wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(default, rename = "valueUSD", with = "rust_decimal::serde::float")]
    pub value_usd: Decimal,
    #[serde(default)]
    pub contract: String,
}

impl TokenHolding {
    pub fn new(symbol: &str, value_usd: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            balance: Decimal::ZERO,
            value_usd,
            contract: String::new(),
        }
    }

    pub fn is_native(&self) -> bool {
        self.contract == NATIVE_CONTRACT
    }
}

/// Headline reference prices echoed back with a portfolio scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePrices {
    #[serde(rename = "BNB", with = "rust_decimal::serde::float")]
    pub bnb: Decimal,
    #[serde(rename = "ETH", with = "rust_decimal::serde::float")]
    pub eth: Decimal,
    #[serde(rename = "BTCB", with = "rust_decimal::serde::float")]
    pub btcb: Decimal,
}

/// Result of scanning a wallet: holdings plus detected protocol interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub address: String,
    pub tokens: Vec<TokenHolding>,
    #[serde(rename = "totalValueUSD", with = "rust_decimal::serde::float")]
    pub total_value_usd: Decimal,
    pub protocols: Vec<String>,
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<ReferencePrices>,
    pub timestamp: i64,
}
