use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::catalog::{self, ProtocolInfo, ProtocolRisk};
use crate::models::{ModuleResult, Risk};

use super::round_half_up;

pub const NAME: &str = "Protocol Risk";

/// Component score for a protocol missing from the catalog.
const UNKNOWN_PROTOCOL_SCORE: i32 = 30;

/// Per-protocol safety score: 50 base, up to +20 for TVL, +20 if audited,
/// +10 for a low risk tier.
pub fn component_score(info: &ProtocolInfo) -> i32 {
    let tvl = info.tvl_billions();
    let mut score = 50;
    if tvl >= Decimal::ONE {
        score += 20;
    } else if tvl >= Decimal::new(3, 1) {
        score += 10;
    }
    if info.audited {
        score += 20;
    }
    if info.risk_level == ProtocolRisk::Low {
        score += 10;
    }
    score
}

/// Mean (rounded) of the per-protocol component scores.
pub fn protocol_risk(protocols: &[String]) -> ModuleResult {
    if protocols.is_empty() {
        return ModuleResult::fixed(
            NAME,
            50,
            Risk::Medium,
            vec!["No DeFi protocols detected in use".into()],
        );
    }

    let mut findings = Vec::new();
    let mut total: i32 = 0;

    for key in protocols {
        let Some(info) = catalog::protocol(key) else {
            findings.push(format!("Unknown protocol: {key} — exercise caution"));
            total += UNKNOWN_PROTOCOL_SCORE;
            continue;
        };

        let proto_score = component_score(info);
        total += proto_score;

        let tag = if proto_score > 70 {
            "LOW"
        } else if proto_score > 50 {
            "MEDIUM"
        } else {
            "HIGH"
        };
        findings.push(format!(
            "{}: Risk {} (TVL: ${}B, Audited: {})",
            info.name,
            tag,
            info.tvl_billions().normalize(),
            if info.audited { "Yes" } else { "No" }
        ));
    }

    let mean = Decimal::from(total) / Decimal::from(protocols.len() as u64);
    let score = round_half_up(mean).to_i32().unwrap_or(0);

    ModuleResult::scored(NAME, score, findings)
}
