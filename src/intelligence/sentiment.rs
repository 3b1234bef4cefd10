use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::models::ModuleResult;

use super::json_number;

pub const NAME: &str = "Market Sentiment";

/// Reference BNB price the sentiment heuristic is evaluated against.
pub const REFERENCE_BNB_PRICE: i64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

impl Sentiment {
    pub fn from_bnb_price(price: Decimal) -> Self {
        if price > Decimal::from(500) {
            Sentiment::Bullish
        } else if price > Decimal::from(300) {
            Sentiment::Neutral
        } else {
            Sentiment::Bearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Neutral => "neutral",
            Sentiment::Bearish => "bearish",
        }
    }

    fn score(&self) -> i32 {
        match self {
            Sentiment::Bullish => 75,
            Sentiment::Neutral => 55,
            Sentiment::Bearish => 30,
        }
    }
}

/// Market sentiment at the reference price. Independent of the portfolio.
pub fn market_sentiment() -> ModuleResult {
    sentiment_at(Decimal::from(REFERENCE_BNB_PRICE))
}

pub fn sentiment_at(bnb_price: Decimal) -> ModuleResult {
    let sentiment = Sentiment::from_bnb_price(bnb_price);
    let mut findings = vec![
        format!("BNB price range: ~${bnb_price} — {} territory", sentiment.as_str()),
        "BSC DeFi TVL: Stable with moderate growth trend".to_string(),
    ];

    match sentiment {
        Sentiment::Bullish => {
            findings.push("Market conditions favor yield farming and LP positions".into());
            findings.push("Consider increasing exposure to volatile assets for upside".into());
        }
        Sentiment::Neutral => {
            findings.push("Market conditions suggest maintaining current positions".into());
            findings.push("Good time to accumulate stablecoins for future opportunities".into());
        }
        Sentiment::Bearish => {
            findings.push(
                "Defensive positioning recommended — increase stablecoin allocation".into(),
            );
            findings.push("Avoid high-leverage positions and monitor collateral closely".into());
        }
    }

    ModuleResult::scored(NAME, sentiment.score(), findings).with_data(json!({
        "sentiment": sentiment,
        "bnbPrice": json_number(bnb_price),
    }))
}
