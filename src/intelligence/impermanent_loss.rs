use crate::models::{ModuleResult, Risk, TokenHolding};

use super::fmt_fixed;

pub const NAME: &str = "Impermanent Loss";

const LP_PENALTY: i32 = 10;

/// LP positions are recognised by symbol alone: anything containing `-` or `LP`.
pub fn is_lp_position(symbol: &str) -> bool {
    symbol.contains('-') || symbol.contains("LP")
}

pub fn impermanent_loss(tokens: &[TokenHolding]) -> ModuleResult {
    let lp_tokens: Vec<&TokenHolding> = tokens.iter().filter(|t| is_lp_position(&t.symbol)).collect();

    if lp_tokens.is_empty() {
        return ModuleResult::fixed(
            NAME,
            90,
            Risk::Low,
            vec!["No liquidity pool positions detected".into()],
        );
    }

    let mut findings = Vec::new();
    let mut score: i32 = 80;

    for lp in &lp_tokens {
        score -= LP_PENALTY;
        findings.push(format!(
            "LP position detected: {} (${})",
            lp.symbol,
            fmt_fixed(lp.value_usd, 2)
        ));
        findings.push(format!(
            "Estimated IL risk for {}: moderate (volatile pair)",
            lp.symbol
        ));
    }
    findings.push("Consider single-sided staking to avoid IL exposure".into());

    ModuleResult::scored(NAME, score, findings)
}
