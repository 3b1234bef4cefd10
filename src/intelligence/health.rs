use rust_decimal::Decimal;

use crate::catalog::{self, is_stablecoin};
use crate::models::{ModuleResult, TokenHolding};

use super::{fmt_fixed, fmt_pct, ratio, sum_usd};

pub const NAME: &str = "Portfolio Health";

/// Overall portfolio health.
///
/// Starts at 50 and adjusts for:
/// - Herfindahl concentration of USD value (skipped when the portfolio is worth nothing)
/// - number of protocols in use
/// - every protocol being audited
/// - stablecoin share of value
pub fn portfolio_health(tokens: &[TokenHolding], protocols: &[String]) -> ModuleResult {
    let mut findings = Vec::new();
    let mut score: i32 = 50;

    let total = sum_usd(tokens);

    if total > Decimal::ZERO {
        let hhi = herfindahl_index(tokens, total);
        let hhi_str = fmt_fixed(hhi, 3);
        if hhi < Decimal::new(25, 2) {
            score += 20;
            findings.push(format!("Well-diversified portfolio (HHI: {hhi_str})"));
        } else if hhi < Decimal::new(5, 1) {
            score += 10;
            findings.push(format!("Moderate diversification (HHI: {hhi_str})"));
        } else {
            score -= 10;
            findings.push(format!("Highly concentrated portfolio (HHI: {hhi_str})"));
        }
    }

    let protocol_count = protocols.len();
    if protocol_count >= 3 {
        score += 10;
        findings.push(format!("Using {protocol_count} protocols — good distribution"));
    } else if protocol_count >= 1 {
        score += 5;
        findings.push(format!(
            "Only {protocol_count} protocol(s) detected — consider diversifying"
        ));
    } else {
        findings.push("No DeFi protocols detected — holding idle assets".into());
    }

    let audited = protocols
        .iter()
        .filter(|p| catalog::protocol(p).is_some_and(|info| info.audited))
        .count();
    if protocol_count > 0 && audited == protocol_count {
        score += 10;
        findings.push("All protocols are audited".into());
    }

    let stable_ratio = stablecoin_ratio(tokens, total);
    if stable_ratio > Decimal::new(3, 1) && stable_ratio < Decimal::new(7, 1) {
        score += 10;
        findings.push(format!(
            "Balanced stablecoin ratio: {}%",
            fmt_pct(stable_ratio, 0)
        ));
    } else if stable_ratio > Decimal::new(7, 1) {
        findings.push(format!(
            "High stablecoin allocation: {}% — safe but low yield potential",
            fmt_pct(stable_ratio, 0)
        ));
    } else if stable_ratio < Decimal::new(1, 1) {
        score -= 5;
        findings.push("Very low stablecoin allocation — high volatility exposure".into());
    }

    ModuleResult::scored(NAME, score, findings)
}

/// Sum of squared value shares. `total` must be positive.
pub fn herfindahl_index(tokens: &[TokenHolding], total: Decimal) -> Decimal {
    tokens
        .iter()
        .map(|t| {
            let share = ratio(t.value_usd, total);
            share.saturating_mul(share)
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Stablecoin share of `total`; zero when `total` is not positive.
pub fn stablecoin_ratio(tokens: &[TokenHolding], total: Decimal) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let stable = sum_usd(tokens.iter().filter(|t| is_stablecoin(&t.symbol)));
    ratio(stable, total)
}
