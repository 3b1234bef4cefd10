pub mod analysis;
pub mod holding;
pub mod strategy;

pub use analysis::{AiAnalysis, AnalysisReport, AnalysisRequest, ModuleResult, Risk, StrategySummary};
pub use holding::{PortfolioSnapshot, ReferencePrices, TokenHolding, NATIVE_CONTRACT};
pub use strategy::{PublishStrategy, RegistryStats, StrategyRecord};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PortfolioInput: shared input of every scoring module
// ---------------------------------------------------------------------------

/// Token holdings and protocol keys handed to the scoring modules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub tokens: Vec<TokenHolding>,
    pub protocols: Vec<String>,
}

impl PortfolioInput {
    pub fn new(tokens: Vec<TokenHolding>, protocols: Vec<String>) -> Self {
        Self { tokens, protocols }
    }

    /// Sum of `valueUSD`, saturating at the `Decimal` bounds.
    pub fn total_value(&self) -> rust_decimal::Decimal {
        self.tokens
            .iter()
            .fold(rust_decimal::Decimal::ZERO, |acc, t| acc.saturating_add(t.value_usd))
    }
}
