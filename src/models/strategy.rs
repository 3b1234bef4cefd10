use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A published strategy as stored by the registry, keyed by `token_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecord {
    pub token_id: u64,
    pub owner: Address,
    pub creator: Address,
    pub wallet_analyzed: Address,
    pub risk_score: u8,
    #[serde(rename = "expectedAPY")]
    pub expected_apy: u16,
    pub protocol_count: u8,
    pub strategy_hash: B256,
    #[serde(rename = "strategyURI")]
    pub strategy_uri: String,
    /// Unix seconds.
    pub timestamp: u64,
    pub chain_id: u64,
}

/// Arguments of `publishStrategy`. The caller is supplied separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishStrategy {
    pub wallet_analyzed: Address,
    pub risk_score: u8,
    #[serde(rename = "expectedAPY")]
    pub expected_apy: u16,
    pub protocol_count: u8,
    pub strategy_hash: B256,
    #[serde(default, rename = "strategyURI")]
    pub strategy_uri: String,
    pub chain_id: u64,
}

impl PublishStrategy {
    /// Map an analysis summary onto registry arguments. Values wider than the
    /// on-chain field types saturate; a zero protocol count is raised to one
    /// the same way the dashboard publish button does.
    pub fn from_summary(
        wallet: Address,
        risk_score: u8,
        expected_apy: u32,
        protocol_count: usize,
        strategy_hash: B256,
        strategy_uri: String,
        chain_id: u64,
    ) -> Self {
        Self {
            wallet_analyzed: wallet,
            risk_score,
            expected_apy: u16::try_from(expected_apy).unwrap_or(u16::MAX),
            protocol_count: u8::try_from(protocol_count.max(1)).unwrap_or(u8::MAX),
            strategy_hash,
            strategy_uri,
            chain_id,
        }
    }
}

/// Global registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub strategy_count: u64,
    pub total_strategies: u64,
    pub total_protocols_analyzed: u64,
}
