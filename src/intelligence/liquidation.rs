use rust_decimal::Decimal;

use crate::catalog::{self, is_stablecoin, ProtocolKind};
use crate::models::{ModuleResult, Risk, TokenHolding};

use super::sum_usd;

pub const NAME: &str = "Liquidation Monitor";

/// Liquidation exposure. Only meaningful when a lending protocol is in use;
/// otherwise the module exits early with a fixed safe result.
pub fn liquidation_monitor(tokens: &[TokenHolding], protocols: &[String]) -> ModuleResult {
    let has_lending = protocols
        .iter()
        .filter_map(|p| catalog::protocol(p))
        .any(|info| info.kind == ProtocolKind::Lending);

    if !has_lending {
        return ModuleResult::fixed(
            NAME,
            95,
            Risk::Low,
            vec!["No lending positions detected — no liquidation risk".into()],
        );
    }

    let mut findings = Vec::new();
    let mut score: i32 = 85;

    let total = sum_usd(tokens);
    let stable = sum_usd(tokens.iter().filter(|t| is_stablecoin(&t.symbol)));
    let volatile = total.saturating_sub(stable);

    if volatile > total * Decimal::new(7, 1) {
        score -= 20;
        findings.push(
            "High volatile collateral ratio — liquidation risk increases in market downturns"
                .into(),
        );
        findings.push("Estimated health factor: 1.3-1.8 (monitor closely)".into());
    } else {
        findings.push("Estimated health factor: 2.0+ (safe zone)".into());
    }

    findings.push(
        "Recommendation: Set up price alerts for BNB below $400 to manage collateral".into(),
    );
    if protocols.iter().any(|p| p == "venus") {
        findings.push("Venus positions detected — monitor vToken exchange rates".into());
    }

    ModuleResult::scored(NAME, score, findings)
}
