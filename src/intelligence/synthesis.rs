use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::anthropic::AnthropicClient;
use crate::models::{AiAnalysis, ModuleResult, TokenHolding};

use super::{fmt_fixed, mean_score, round_half_up, yield_optimizer};

/// Expected APY reported when no module offers a better figure (5%).
pub const DEFAULT_EXPECTED_APY: u32 = 500;

const FALLBACK_RECOMMENDATIONS: [&str; 5] = [
    "Diversify across at least 3 DeFi protocols to reduce concentration risk",
    "Maintain 20-40% in stablecoins for stability and buying opportunities",
    "Consider Venus Protocol for lending idle stablecoins at 3-5% APY",
    "Use PancakeSwap for CAKE staking at ~15% APY",
    "Set up liquidation alerts if using leveraged positions",
];

/// Everything the synthesis step looks at.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub address: &'a str,
    pub tokens: &'a [TokenHolding],
    pub protocols: &'a [String],
    pub total_value_usd: Decimal,
    pub modules: &'a [ModuleResult],
}

/// Produces an `AiAnalysis` from the module results. The LLM is consulted
/// when a client is configured; every failure path ends in
/// [`fallback_analysis`], so callers always get a well-formed result.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    client: Option<AnthropicClient>,
}

impl Synthesizer {
    pub fn new(client: Option<AnthropicClient>) -> Self {
        Self { client }
    }

    /// Deterministic synthesis only.
    pub fn offline() -> Self {
        Self { client: None }
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn synthesize(&self, input: &SynthesisInput<'_>) -> AiAnalysis {
        let Some(client) = &self.client else {
            return fallback_analysis(input);
        };

        let prompt = build_prompt(input);
        let text = match client.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, address = %input.address, "AI synthesis call failed, using fallback");
                metrics::counter!("ai_fallbacks_total").increment(1);
                return fallback_analysis(input);
            }
        };

        match parse_analysis(&text) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!(error = %e, address = %input.address, "AI synthesis returned malformed JSON, using fallback");
                metrics::counter!("ai_fallbacks_total").increment(1);
                fallback_analysis(input)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LLM response parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    overall_assessment: String,
    risk_score: f64,
    #[serde(rename = "expectedAPY")]
    expected_apy: f64,
    #[serde(default)]
    top_recommendations: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

/// Parse the model's reply. The reply must be a bare JSON object; numeric
/// fields are rounded and `riskScore` is clamped to `[0,100]`.
pub fn parse_analysis(text: &str) -> Result<AiAnalysis, serde_json::Error> {
    let raw: RawAnalysis = serde_json::from_str(text.trim())?;
    Ok(AiAnalysis {
        overall_assessment: raw.overall_assessment,
        risk_score: raw.risk_score.round().clamp(0.0, 100.0) as u8,
        expected_apy: raw.expected_apy.round().max(0.0) as u32,
        top_recommendations: raw.top_recommendations,
        warnings: raw.warnings,
    })
}

fn build_prompt(input: &SynthesisInput<'_>) -> String {
    let tokens: Vec<_> = input
        .tokens
        .iter()
        .map(|t| json!({ "symbol": t.symbol, "value": t.value_usd.to_f64().unwrap_or(0.0) }))
        .collect();
    let modules: Vec<_> = input
        .modules
        .iter()
        .map(|m| {
            json!({
                "name": m.name,
                "score": m.score,
                "risk": m.risk,
                "topFinding": m.findings.first(),
            })
        })
        .collect();

    format!(
        "You are a DeFi portfolio advisor specialized in BNB Smart Chain. Analyze this portfolio and return ONLY valid JSON (no markdown, no code blocks).\n\n\
         Return this exact JSON structure:\n\
         {{\"overallAssessment\": \"2-3 paragraph analysis string\", \"riskScore\": 0-100, \"expectedAPY\": number in basis points, \"topRecommendations\": [\"action1\", \"action2\", \"action3\", \"action4\", \"action5\"], \"warnings\": [\"warning1\"]}}\n\n\
         Portfolio data:\n\
         - Wallet: {}\n\
         - Total Value: ${}\n\
         - Tokens: {}\n\
         - Protocols: {}\n\
         - Module scores: {}\n\n\
         Provide personalized, actionable DeFi strategy recommendations for BNB Chain.",
        input.address,
        fmt_fixed(input.total_value_usd, 2),
        serde_json::Value::from(tokens),
        json!(input.protocols),
        serde_json::Value::from(modules),
    )
}

// ---------------------------------------------------------------------------
// Deterministic fallback
// ---------------------------------------------------------------------------

/// Local synthesis used whenever the LLM is unavailable.
///
/// `riskScore = round(100 - mean(module scores))`, expected APY is the Yield
/// module's optimized APY (or [`DEFAULT_EXPECTED_APY`] when it found nothing),
/// warnings come from modules rated high or critical.
pub fn fallback_analysis(input: &SynthesisInput<'_>) -> AiAnalysis {
    let mean = mean_score(input.modules);

    let verdict = if mean > Decimal::from(70) {
        "This is a well-managed portfolio with good diversification."
    } else if mean > Decimal::from(40) {
        "There is room for improvement in diversification and yield optimization."
    } else {
        "This portfolio needs attention — consider rebalancing and diversifying."
    };

    let key_findings: Vec<&str> = input
        .modules
        .iter()
        .flat_map(|m| m.findings.iter().map(String::as_str))
        .take(5)
        .collect();

    let overall_assessment = format!(
        "Portfolio analysis for {} with ${} total value across {} tokens and {} DeFi protocols.\n\n\
         Your portfolio health score is {}/100. {}\n\n\
         Key findings from our {}-module analysis: {}. Review the detailed module breakdowns below for specific recommendations on improving your DeFi strategy.",
        short_address(input.address),
        fmt_fixed(input.total_value_usd, 2),
        input.tokens.len(),
        input.protocols.len(),
        fmt_fixed(mean, 0),
        verdict,
        input.modules.len(),
        key_findings.join(". "),
    );

    let warnings = input
        .modules
        .iter()
        .filter(|m| m.risk.is_elevated())
        .map(|m| {
            format!(
                "{}: {}",
                m.name,
                m.findings.first().map(String::as_str).unwrap_or("High risk detected")
            )
        })
        .collect();

    AiAnalysis {
        overall_assessment,
        risk_score: derived_risk_score(input.modules),
        expected_apy: optimized_apy(input.modules).unwrap_or(DEFAULT_EXPECTED_APY),
        top_recommendations: FALLBACK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        warnings,
    }
}

/// `round(100 - mean(scores))`, always within `[0,100]`.
pub fn derived_risk_score(modules: &[ModuleResult]) -> u8 {
    let risk = round_half_up(Decimal::ONE_HUNDRED - mean_score(modules));
    risk.to_u8().unwrap_or(0).min(100)
}

/// The Yield module's optimized APY, when it found a non-zero one.
fn optimized_apy(modules: &[ModuleResult]) -> Option<u32> {
    modules
        .iter()
        .find(|m| m.name == yield_optimizer::NAME)
        .and_then(|m| m.data.as_ref())
        .and_then(|d| d.get("optimizedAPY"))
        .and_then(|v| v.as_u64())
        .filter(|apy| *apy > 0)
        .map(|apy| u32::try_from(apy).unwrap_or(u32::MAX))
}

fn short_address(address: &str) -> String {
    if address.len() > 10 && address.is_ascii() {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::score_portfolio;
    use crate::models::{PortfolioInput, Risk};

    const ADDRESS: &str = "0x1234567890123456789012345678901234567890";

    fn scored(input: &PortfolioInput) -> Vec<ModuleResult> {
        score_portfolio(input)
    }

    fn synthesis_input<'a>(input: &'a PortfolioInput, modules: &'a [ModuleResult]) -> SynthesisInput<'a> {
        SynthesisInput {
            address: ADDRESS,
            tokens: &input.tokens,
            protocols: &input.protocols,
            total_value_usd: input.total_value(),
            modules,
        }
    }

    #[test]
    fn test_fallback_risk_score_matches_module_mean() {
        let input = PortfolioInput::new(
            vec![
                TokenHolding::new("BNB", Decimal::from(7500)),
                TokenHolding::new("USDT", Decimal::from(5000)),
            ],
            vec!["pancakeswap".into()],
        );
        let modules = scored(&input);
        let sum: u32 = modules.iter().map(|m| u32::from(m.score)).sum();
        let expected = (100.0 - f64::from(sum) / 8.0).round() as u8;

        let ai = fallback_analysis(&synthesis_input(&input, &modules));
        assert_eq!(ai.risk_score, expected);
        assert_eq!(ai.top_recommendations.len(), 5);
    }

    #[test]
    fn test_fallback_uses_optimized_apy() {
        let input = PortfolioInput::new(
            vec![TokenHolding::new("CAKE", Decimal::from(100))],
            vec![],
        );
        let modules = scored(&input);
        let ai = fallback_analysis(&synthesis_input(&input, &modules));
        assert_eq!(ai.expected_apy, 1500);
    }

    #[test]
    fn test_fallback_default_apy_when_no_yield() {
        let input = PortfolioInput::default();
        let modules = scored(&input);
        let ai = fallback_analysis(&synthesis_input(&input, &modules));
        assert_eq!(ai.expected_apy, DEFAULT_EXPECTED_APY);
    }

    #[test]
    fn test_fallback_warnings_from_elevated_modules() {
        let modules = vec![
            ModuleResult::scored("Alpha", 20, vec!["alpha is bad".into()]),
            ModuleResult::scored("Beta", 90, vec!["beta is fine".into()]),
            ModuleResult::fixed("Gamma", 10, Risk::Critical, vec![]),
        ];
        let input = PortfolioInput::default();
        let ai = fallback_analysis(&synthesis_input(&input, &modules));
        assert_eq!(
            ai.warnings,
            vec!["Alpha: alpha is bad", "Gamma: High risk detected"]
        );
    }

    #[test]
    fn test_fallback_narrative_mentions_wallet() {
        let input = PortfolioInput::default();
        let modules = scored(&input);
        let ai = fallback_analysis(&synthesis_input(&input, &modules));
        assert!(ai.overall_assessment.starts_with("Portfolio analysis for 0x1234...7890 with $0.00"));
    }

    #[test]
    fn test_parse_analysis_normalizes() {
        let text = r#"
            {"overallAssessment": "Solid.", "riskScore": 142.4, "expectedAPY": 1250.6,
             "topRecommendations": ["a", "b"], "warnings": []}
        "#;
        let ai = parse_analysis(text).unwrap();
        assert_eq!(ai.risk_score, 100);
        assert_eq!(ai.expected_apy, 1251);
        assert_eq!(ai.top_recommendations, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_analysis_rejects_markdown() {
        assert!(parse_analysis("```json\n{}\n```").is_err());
        assert!(parse_analysis(r#"{"overallAssessment": "x"}"#).is_err());
    }

    #[tokio::test]
    async fn test_offline_synthesizer_falls_back() {
        let input = PortfolioInput::default();
        let modules = scored(&input);
        let si = synthesis_input(&input, &modules);
        let synth = Synthesizer::offline();
        assert!(!synth.is_ai_enabled());
        assert_eq!(synth.synthesize(&si).await, fallback_analysis(&si));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address(ADDRESS), "0x1234...7890");
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
