use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TokenHolding;

/// Risk band attached to every module result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Medium,
    High,
    Critical,
}

impl Risk {
    /// `>70 → low`, `>40 → medium`, everything else `high`.
    pub fn from_score(score: u8) -> Self {
        if score > 70 {
            Risk::Low
        } else if score > 40 {
            Risk::Medium
        } else {
            Risk::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
            Risk::Critical => "critical",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Risk::High | Risk::Critical)
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one scoring module. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub name: String,
    pub score: u8,
    pub risk: Risk,
    pub findings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ModuleResult {
    /// Clamp a raw score into `[0,100]` and derive its risk band.
    pub fn scored(name: &str, raw_score: i32, findings: Vec<String>) -> Self {
        let score = raw_score.clamp(0, 100) as u8;
        Self {
            name: name.to_string(),
            score,
            risk: Risk::from_score(score),
            findings,
            data: None,
        }
    }

    /// Fixed score and risk, used by the early-exit branches.
    pub fn fixed(name: &str, score: u8, risk: Risk, findings: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            score,
            risk,
            findings,
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Narrative synthesis over the module results. Same shape whether it came
/// from the LLM or from the local fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub overall_assessment: String,
    pub risk_score: u8,
    #[serde(rename = "expectedAPY")]
    pub expected_apy: u32,
    pub top_recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tokens: Vec<TokenHolding>,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default, rename = "totalValueUSD", with = "rust_decimal::serde::float_option")]
    pub total_value_usd: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub address: String,
    #[serde(rename = "totalValueUSD", with = "rust_decimal::serde::float")]
    pub total_value_usd: Decimal,
    pub risk_score: u8,
    #[serde(rename = "expectedAPY")]
    pub expected_apy: u32,
    pub protocol_count: usize,
    pub token_count: usize,
    pub strategy_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub summary: StrategySummary,
    pub modules: Vec<ModuleResult>,
    pub ai_analysis: AiAnalysis,
    pub timestamp: i64,
}
