use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::intelligence::synthesis::{derived_risk_score, DEFAULT_EXPECTED_APY};
use crate::intelligence::{score_portfolio, SynthesisInput, Synthesizer};
use crate::models::{
    AiAnalysis, AnalysisReport, AnalysisRequest, ModuleResult, PortfolioInput, StrategySummary,
    TokenHolding,
};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Address required")]
    MissingAddress,

    #[error("Invalid token value for {0}")]
    InvalidTokenValue(String),

    #[error("failed to encode strategy for hashing: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Content addressed by the strategy hash, serialized in this field order.
#[derive(Serialize)]
struct HashedStrategy<'a> {
    address: &'a str,
    modules: &'a [ModuleResult],
    ai: &'a AiAnalysis,
}

/// `0x`-prefixed hex SHA-256 of the JSON encoding of `{address, modules, ai}`.
pub fn strategy_hash(
    address: &str,
    modules: &[ModuleResult],
    ai: &AiAnalysis,
) -> Result<String, serde_json::Error> {
    let encoded = serde_json::to_vec(&HashedStrategy { address, modules, ai })?;
    let digest = Sha256::digest(&encoded);
    Ok(alloy::primitives::hex::encode_prefixed(digest))
}

/// Token values must be non-negative and their sum must fit in a `Decimal`.
fn validate_token_values(tokens: &[TokenHolding]) -> Result<(), AnalyzeError> {
    let mut sum = Decimal::ZERO;
    for token in tokens {
        let invalid = || AnalyzeError::InvalidTokenValue(token.symbol.clone());
        if token.value_usd < Decimal::ZERO {
            return Err(invalid());
        }
        sum = sum.checked_add(token.value_usd).ok_or_else(invalid)?;
    }
    Ok(())
}

/// Run the full pipeline: score, synthesize, hash, summarize.
pub async fn analyze(
    request: AnalysisRequest,
    synthesizer: &Synthesizer,
) -> Result<AnalysisReport, AnalyzeError> {
    let started = Instant::now();

    let address = request
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or(AnalyzeError::MissingAddress)?;
    validate_token_values(&request.tokens)?;
    let total_value_usd = request.total_value_usd.unwrap_or(Decimal::ZERO);
    let input = PortfolioInput::new(request.tokens, request.protocols);

    let modules = score_portfolio(&input);
    let ai = synthesizer
        .synthesize(&SynthesisInput {
            address: &address,
            tokens: &input.tokens,
            protocols: &input.protocols,
            total_value_usd,
            modules: &modules,
        })
        .await;

    let hash = strategy_hash(&address, &modules, &ai)?;

    let summary = StrategySummary {
        risk_score: if ai.risk_score == 0 { derived_risk_score(&modules) } else { ai.risk_score },
        expected_apy: if ai.expected_apy == 0 { DEFAULT_EXPECTED_APY } else { ai.expected_apy },
        protocol_count: input.protocols.len(),
        token_count: input.tokens.len(),
        strategy_hash: hash,
        total_value_usd,
        address,
    };

    metrics::counter!("analyses_total").increment(1);
    metrics::histogram!("analysis_latency_seconds").record(started.elapsed().as_secs_f64());
    tracing::info!(
        address = %summary.address,
        risk_score = summary.risk_score,
        expected_apy = summary.expected_apy,
        strategy_hash = %summary.strategy_hash,
        "Analysis complete"
    );

    Ok(AnalysisReport {
        summary,
        modules,
        ai_analysis: ai,
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            address: Some(WALLET.into()),
            tokens: vec![
                TokenHolding::new("BNB", Decimal::from(7500)),
                TokenHolding::new("USDT", Decimal::from(5000)),
            ],
            protocols: vec!["pancakeswap".into()],
            total_value_usd: Some(Decimal::from(12500)),
        }
    }

    fn sample_ai() -> AiAnalysis {
        AiAnalysis {
            overall_assessment: "ok".into(),
            risk_score: 40,
            expected_apy: 800,
            top_recommendations: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn test_hash_format_and_determinism() {
        let modules = score_portfolio(&PortfolioInput::default());
        let a = strategy_hash(WALLET, &modules, &sample_ai()).unwrap();
        let b = strategy_hash(WALLET, &modules, &sample_ai()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 66);
        assert!(a.starts_with("0x"));
        assert!(a[2..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_changes_with_single_finding() {
        let modules = score_portfolio(&PortfolioInput::default());
        let mut altered = modules.clone();
        altered[0].findings.push("extra".into());

        let a = strategy_hash(WALLET, &modules, &sample_ai()).unwrap();
        let b = strategy_hash(WALLET, &altered, &sample_ai()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_of_known_input() {
        let ai = AiAnalysis {
            overall_assessment: String::new(),
            risk_score: 0,
            expected_apy: 0,
            top_recommendations: vec![],
            warnings: vec![],
        };
        let encoded = serde_json::to_string(&HashedStrategy { address: "0x", modules: &[], ai: &ai }).unwrap();
        assert_eq!(
            encoded,
            r#"{"address":"0x","modules":[],"ai":{"overallAssessment":"","riskScore":0,"expectedAPY":0,"topRecommendations":[],"warnings":[]}}"#
        );
    }

    #[tokio::test]
    async fn test_analyze_offline() {
        let report = analyze(request(), &Synthesizer::offline()).await.unwrap();

        assert_eq!(report.modules.len(), 8);
        assert_eq!(report.summary.address, WALLET);
        assert_eq!(report.summary.token_count, 2);
        assert_eq!(report.summary.protocol_count, 1);
        assert_eq!(report.summary.total_value_usd, Decimal::from(12500));
        assert_eq!(report.summary.risk_score, derived_risk_score(&report.modules));
        assert_eq!(report.summary.risk_score, report.ai_analysis.risk_score);
        assert_eq!(
            report.summary.strategy_hash,
            strategy_hash(WALLET, &report.modules, &report.ai_analysis).unwrap()
        );
    }

    #[tokio::test]
    async fn test_analyze_is_deterministic_offline() {
        let a = analyze(request(), &Synthesizer::offline()).await.unwrap();
        let b = analyze(request(), &Synthesizer::offline()).await.unwrap();
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.ai_analysis, b.ai_analysis);
    }

    #[tokio::test]
    async fn test_analyze_requires_address() {
        let mut req = request();
        req.address = Some("  ".into());
        let err = analyze(req, &Synthesizer::offline()).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingAddress));
        assert_eq!(err.to_string(), "Address required");

        let err = analyze(AnalysisRequest::default(), &Synthesizer::offline()).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::MissingAddress));
    }

    #[tokio::test]
    async fn test_empty_portfolio_defaults() {
        let req = AnalysisRequest {
            address: Some(WALLET.into()),
            ..Default::default()
        };
        let report = analyze(req, &Synthesizer::offline()).await.unwrap();
        assert_eq!(report.summary.total_value_usd, Decimal::ZERO);
        assert_eq!(report.summary.token_count, 0);
        assert_eq!(report.summary.expected_apy, DEFAULT_EXPECTED_APY);
    }

    #[tokio::test]
    async fn test_analyze_rejects_out_of_range_values() {
        let big = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let req = AnalysisRequest {
            address: Some(WALLET.into()),
            tokens: vec![TokenHolding::new("AAA", big), TokenHolding::new("BBB", big)],
            ..Default::default()
        };
        let err = analyze(req, &Synthesizer::offline()).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidTokenValue(ref s) if s == "BBB"));

        let mut req = request();
        req.tokens.push(TokenHolding::new("DEBT", Decimal::from(-5)));
        let err = analyze(req, &Synthesizer::offline()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid token value for DEBT");
    }
}
