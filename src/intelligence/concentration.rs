use rust_decimal::Decimal;

use crate::models::{ModuleResult, Risk, TokenHolding};

use super::{fmt_fixed, ratio, sum_usd};

pub const NAME: &str = "Concentration Risk";

/// Penalties for over-exposure to single tokens or a single protocol.
///
/// Per token: `> 50%` of value costs 25, `> 30%` costs 10. Exactly one
/// protocol costs 15. Two or fewer tokens cost 10.
pub fn concentration_risk(tokens: &[TokenHolding], protocols: &[String]) -> ModuleResult {
    let total = sum_usd(tokens);
    if total.is_zero() {
        return ModuleResult::fixed(
            NAME,
            50,
            Risk::Medium,
            vec!["No portfolio value detected".into()],
        );
    }

    let mut findings = Vec::new();
    let mut score: i32 = 80;

    for token in tokens {
        let pct = ratio(token.value_usd, total).saturating_mul(Decimal::ONE_HUNDRED);
        if pct > Decimal::from(50) {
            score -= 25;
            findings.push(format!(
                "HIGH: {} represents {}% of portfolio — severely over-exposed",
                token.symbol,
                fmt_fixed(pct, 1)
            ));
        } else if pct > Decimal::from(30) {
            score -= 10;
            findings.push(format!(
                "MEDIUM: {} at {}% — consider rebalancing",
                token.symbol,
                fmt_fixed(pct, 1)
            ));
        }
    }

    match protocols.len() {
        1 => {
            score -= 15;
            findings.push("Single protocol dependency — high concentration risk".into());
        }
        0 => findings.push("No protocol diversification (tokens held idle)".into()),
        n => findings.push(format!("Spread across {n} protocols — acceptable concentration")),
    }

    if tokens.len() <= 2 {
        score -= 10;
        findings.push("Very few tokens held — low diversification".into());
    }

    ModuleResult::scored(NAME, score, findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(symbol: &str, value: i64) -> TokenHolding {
        TokenHolding::new(symbol, Decimal::from(value))
    }

    #[test]
    fn test_zero_value_early_exit() {
        let result = concentration_risk(&[token("BNB", 0)], &[]);
        assert_eq!(result.score, 50);
        assert_eq!(result.risk, Risk::Medium);
        assert_eq!(result.findings, vec!["No portfolio value detected"]);
    }

    #[test]
    fn test_single_token_takes_majority_branch() {
        let result = concentration_risk(&[token("BNB", 1234)], &[]);
        assert_eq!(
            result.findings[0],
            "HIGH: BNB represents 100.0% of portfolio — severely over-exposed"
        );
        // 80 − 25 − 10 (≤2 tokens)
        assert_eq!(result.score, 45);
    }

    #[test]
    fn test_bnb_usdt_single_protocol() {
        let tokens = vec![token("BNB", 7500), token("USDT", 5000)];
        let result = concentration_risk(&tokens, &["pancakeswap".into()]);
        // BNB 60% → −25, USDT 40% → −10, one protocol → −15, two tokens → −10
        assert_eq!(result.score, 20);
        assert_eq!(result.risk, Risk::High);
        assert_eq!(
            result.findings[0],
            "HIGH: BNB represents 60.0% of portfolio — severely over-exposed"
        );
        assert_eq!(result.findings[1], "MEDIUM: USDT at 40.0% — consider rebalancing");
        assert!(result
            .findings
            .contains(&"Single protocol dependency — high concentration risk".to_string()));
    }

    #[test]
    fn test_spread_portfolio() {
        let tokens = vec![
            token("BNB", 25),
            token("USDT", 25),
            token("CAKE", 25),
            token("ETH", 25),
        ];
        let result = concentration_risk(&tokens, &["venus".into(), "thena".into()]);
        assert_eq!(result.score, 80);
        assert_eq!(
            result.findings,
            vec!["Spread across 2 protocols — acceptable concentration"]
        );
    }
}
