pub mod concentration;
pub mod gas;
pub mod health;
pub mod impermanent_loss;
pub mod liquidation;
pub mod protocol_risk;
pub mod sentiment;
pub mod synthesis;
pub mod yield_optimizer;

pub use synthesis::{fallback_analysis, parse_analysis, Synthesizer, SynthesisInput};

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::models::{ModuleResult, PortfolioInput, TokenHolding};

/// The eight scoring modules. Each one is a pure function of the same
/// `PortfolioInput`; none depends on another's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoringModule {
    Health,
    Yield,
    ImpermanentLoss,
    Liquidation,
    ProtocolRisk,
    Concentration,
    Gas,
    Sentiment,
}

impl ScoringModule {
    /// Evaluation and report order.
    pub const ALL: [ScoringModule; 8] = [
        ScoringModule::Health,
        ScoringModule::Yield,
        ScoringModule::ImpermanentLoss,
        ScoringModule::Liquidation,
        ScoringModule::ProtocolRisk,
        ScoringModule::Concentration,
        ScoringModule::Gas,
        ScoringModule::Sentiment,
    ];

    /// Display name, also used as `ModuleResult::name`.
    pub fn name(&self) -> &'static str {
        match self {
            ScoringModule::Health => health::NAME,
            ScoringModule::Yield => yield_optimizer::NAME,
            ScoringModule::ImpermanentLoss => impermanent_loss::NAME,
            ScoringModule::Liquidation => liquidation::NAME,
            ScoringModule::ProtocolRisk => protocol_risk::NAME,
            ScoringModule::Concentration => concentration::NAME,
            ScoringModule::Gas => gas::NAME,
            ScoringModule::Sentiment => sentiment::NAME,
        }
    }

    pub fn run(&self, input: &PortfolioInput) -> ModuleResult {
        match self {
            ScoringModule::Health => health::portfolio_health(&input.tokens, &input.protocols),
            ScoringModule::Yield => yield_optimizer::yield_optimizer(&input.tokens, &input.protocols),
            ScoringModule::ImpermanentLoss => impermanent_loss::impermanent_loss(&input.tokens),
            ScoringModule::Liquidation => liquidation::liquidation_monitor(&input.tokens, &input.protocols),
            ScoringModule::ProtocolRisk => protocol_risk::protocol_risk(&input.protocols),
            ScoringModule::Concentration => concentration::concentration_risk(&input.tokens, &input.protocols),
            ScoringModule::Gas => gas::gas_optimizer(&input.tokens, &input.protocols),
            ScoringModule::Sentiment => sentiment::market_sentiment(),
        }
    }
}

impl fmt::Display for ScoringModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run all eight modules in report order.
pub fn score_portfolio(input: &PortfolioInput) -> Vec<ModuleResult> {
    ScoringModule::ALL.iter().map(|m| m.run(input)).collect()
}

/// Arithmetic mean of the module scores; zero for an empty slice.
pub fn mean_score(results: &[ModuleResult]) -> Decimal {
    if results.is_empty() {
        return Decimal::ZERO;
    }
    let sum: u32 = results.iter().map(|r| u32::from(r.score)).sum();
    Decimal::from(sum) / Decimal::from(results.len() as u64)
}

/// Saturating sum of `valueUSD` over `tokens`.
pub(crate) fn sum_usd<'a>(tokens: impl IntoIterator<Item = &'a TokenHolding>) -> Decimal {
    tokens
        .into_iter()
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.value_usd))
}

/// `part / total`, clamped to the `Decimal` range when the quotient does not fit.
pub(crate) fn ratio(part: Decimal, total: Decimal) -> Decimal {
    part.checked_div(total).unwrap_or_else(|| {
        if part.is_sign_negative() == total.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// JSON number for module `data`: whole values are written as integers
/// (`900`, not `900.0`).
pub(crate) fn json_number(value: Decimal) -> Value {
    if value.fract().is_zero() {
        if let Some(n) = value.to_i64() {
            return Value::from(n);
        }
    }
    Value::from(value.to_f64().unwrap_or(0.0))
}

/// Round half away from zero to a whole number.
pub(crate) fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-point rendering with exactly `dp` decimals.
pub(crate) fn fmt_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Percentage (`ratio × 100`) with `dp` decimals.
pub(crate) fn fmt_pct(ratio: Decimal, dp: u32) -> String {
    fmt_fixed(ratio.saturating_mul(Decimal::ONE_HUNDRED), dp)
}
