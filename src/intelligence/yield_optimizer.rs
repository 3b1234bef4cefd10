use rust_decimal::Decimal;
use serde_json::json;

use crate::catalog::{self, ProtocolInfo, PROTOCOLS};
use crate::models::{ModuleResult, TokenHolding};

use super::{fmt_fixed, json_number};

pub const NAME: &str = "Yield Optimizer";

/// Estimates the APY the wallet currently earns from its active protocols and
/// the best APY reachable for the tokens it holds. All figures in basis points.
pub fn yield_optimizer(tokens: &[TokenHolding], protocols: &[String]) -> ModuleResult {
    let mut findings = Vec::new();

    let active: Vec<&ProtocolInfo> = protocols
        .iter()
        .filter_map(|p| catalog::protocol(p))
        .collect();

    let current_apy = current_apy(&active);
    if active.is_empty() {
        findings.push("No yield-generating positions detected".into());
    }

    let mut optimized_apy: u32 = 0;
    for token in tokens {
        if let Some((best, proto)) = best_yield(&token.symbol) {
            optimized_apy = optimized_apy.max(best);
            findings.push(format!(
                "{}: Best yield {}% APY on {}",
                token.symbol,
                fmt_fixed(Decimal::from(best) / Decimal::ONE_HUNDRED, 2),
                proto.name
            ));
        }
    }

    let optimized = Decimal::from(optimized_apy);
    if optimized > current_apy + Decimal::from(200) {
        findings.push(format!(
            "Potential yield improvement: {}% additional APY",
            fmt_fixed((optimized - current_apy) / Decimal::ONE_HUNDRED, 2)
        ));
    }

    let score = if current_apy > Decimal::from(500) {
        80
    } else if current_apy > Decimal::from(200) {
        60
    } else {
        40
    };

    ModuleResult::scored(NAME, score, findings).with_data(json!({
        "currentAPY": json_number(current_apy),
        "optimizedAPY": optimized_apy,
    }))
}

/// Mean over active protocols of each protocol's mean advertised yield.
pub fn current_apy(active: &[&ProtocolInfo]) -> Decimal {
    if active.is_empty() {
        return Decimal::ZERO;
    }
    let n = Decimal::from(active.len() as u64);
    active.iter().map(|p| p.mean_yield() / n).sum()
}

/// Highest catalog yield for `symbol`; the first protocol wins ties.
pub fn best_yield(symbol: &str) -> Option<(u32, &'static ProtocolInfo)> {
    let mut best: Option<(u32, &'static ProtocolInfo)> = None;
    for proto in PROTOCOLS {
        if let Some(bps) = proto.yield_for(symbol) {
            if bps > 0 && best.map_or(true, |(b, _)| bps > b) {
                best = Some((bps, proto));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Risk;

    fn token(symbol: &str) -> TokenHolding {
        TokenHolding::new(symbol, Decimal::from(100))
    }

    #[test]
    fn test_no_protocols() {
        let result = yield_optimizer(&[], &[]);
        assert_eq!(result.score, 40);
        assert_eq!(result.risk, Risk::High);
        assert_eq!(result.findings, vec!["No yield-generating positions detected"]);
        let data = result.data.unwrap();
        assert_eq!(data["optimizedAPY"], 0);
    }

    #[test]
    fn test_best_yield_prefers_highest() {
        // BNB: venus 150, alpaca 800
        let (bps, proto) = best_yield("BNB").unwrap();
        assert_eq!(bps, 800);
        assert_eq!(proto.name, "Alpaca Finance");
        assert!(best_yield("DOGE").is_none());
    }

    #[test]
    fn test_current_apy_averages_protocol_means() {
        // venus mean 200, pancakeswap mean 1600 → 900
        let result = yield_optimizer(&[], &["venus".into(), "pancakeswap".into()]);
        assert_eq!(result.score, 80);
        let data = result.data.unwrap();
        assert_eq!(data["currentAPY"], 900);
        assert!(data.to_string().contains(r#""currentAPY":900,"#));
    }

    #[test]
    fn test_unknown_protocols_ignored_for_apy() {
        let result = yield_optimizer(&[], &["mystery".into()]);
        assert_eq!(result.score, 40);
        assert_eq!(result.findings[0], "No yield-generating positions detected");
    }

    #[test]
    fn test_improvement_finding() {
        let result = yield_optimizer(&[token("CAKE"), token("USDT")], &["venus".into()]);
        // current 200 → score 40; CAKE best 1500 on PancakeSwap
        assert_eq!(result.score, 40);
        assert!(result
            .findings
            .contains(&"CAKE: Best yield 15.00% APY on PancakeSwap".to_string()));
        assert!(result
            .findings
            .contains(&"USDT: Best yield 6.00% APY on Alpaca Finance".to_string()));
        assert!(result
            .findings
            .contains(&"Potential yield improvement: 13.00% additional APY".to_string()));
        assert_eq!(result.data.unwrap()["optimizedAPY"], 1500);
    }
}
