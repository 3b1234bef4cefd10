use rust_decimal::Decimal;
use serde_json::json;

use crate::models::{ModuleResult, TokenHolding};

use super::{fmt_fixed, json_number};

pub const NAME: &str = "Gas Optimizer";

/// Average gas per transaction on BSC, in BNB.
const AVG_GAS_BNB: (i64, u32) = (1, 3);
/// BNB price used to convert gas to USD.
const GAS_BNB_PRICE_USD: i64 = 600;

/// Rebalancing transactions: one per token, two per protocol.
pub fn estimated_tx_count(tokens: usize, protocols: usize) -> usize {
    tokens + protocols * 2
}

pub fn estimated_gas_cost(tx_count: usize) -> Decimal {
    Decimal::from(tx_count as u64)
        * Decimal::new(AVG_GAS_BNB.0, AVG_GAS_BNB.1)
        * Decimal::from(GAS_BNB_PRICE_USD)
}

pub fn gas_optimizer(tokens: &[TokenHolding], protocols: &[String]) -> ModuleResult {
    let mut findings = Vec::new();

    let tx_count = estimated_tx_count(tokens.len(), protocols.len());
    let cost = estimated_gas_cost(tx_count);

    findings.push(format!("Estimated rebalancing transactions: {tx_count}"));
    findings.push(format!(
        "Estimated total gas cost: ${} (BSC avg)",
        fmt_fixed(cost, 2)
    ));

    let score = if cost < Decimal::from(5) {
        findings.push("Gas costs are minimal on BSC — proceed freely".into());
        90
    } else if cost < Decimal::from(20) {
        findings.push("Moderate gas costs — consider batching transactions".into());
        75
    } else {
        findings.push("High gas costs — batch transactions and use off-peak hours".into());
        50
    };

    findings.push("BSC gas tip: Transactions are cheapest between 00:00-06:00 UTC".into());
    if protocols.len() > 2 {
        findings.push(
            "Multi-protocol rebalancing: Consider using an aggregator for fewer transactions"
                .into(),
        );
    }

    ModuleResult::scored(NAME, score, findings).with_data(json!({
        "estimatedGasCost": json_number(cost),
        "estimatedTxCount": tx_count,
    }))
}
