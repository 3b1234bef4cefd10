use std::collections::HashMap;

use reqwest::{Client, Url};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::catalog::tokens::{fallback_price, fallback_symbols};
use crate::models::ReferencePrices;

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko coin id → the symbols priced from it.
const PRICE_IDS: &[(&str, &[&str])] = &[
    ("binancecoin", &["BNB", "WBNB"]),
    ("tether", &["USDT"]),
    ("usd-coin", &["USDC"]),
    ("binance-usd", &["BUSD"]),
    ("ethereum", &["ETH"]),
    ("bitcoin", &["BTCB"]),
    ("pancakeswap-token", &["CAKE"]),
    ("venus", &["XVS"]),
];

#[derive(Debug, Error)]
pub enum PriceClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(String),
}

/// USD price per token symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    prices: HashMap<String, Decimal>,
}

impl PriceTable {
    /// The static fallback table.
    pub fn fallback() -> Self {
        let prices = fallback_symbols()
            .filter_map(|s| fallback_price(s).map(|p| (s.to_string(), p)))
            .collect();
        Self { prices }
    }

    /// Build from a CoinGecko `simple/price` body. Symbols with a missing or
    /// non-positive quote keep their fallback price.
    pub fn from_quotes(quotes: &HashMap<String, HashMap<String, f64>>) -> Self {
        let mut table = Self::fallback();
        for (id, symbols) in PRICE_IDS {
            let usd = quotes
                .get(*id)
                .and_then(|q| q.get("usd"))
                .copied()
                .filter(|p| p.is_finite() && *p > 0.0)
                .and_then(|p| Decimal::try_from(p).ok());
            if let Some(usd) = usd {
                for symbol in symbols.iter() {
                    table.prices.insert(symbol.to_string(), usd);
                }
            }
        }
        table
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    pub fn reference(&self) -> ReferencePrices {
        ReferencePrices {
            bnb: self.get("BNB").unwrap_or_default(),
            eth: self.get("ETH").unwrap_or_default(),
            btcb: self.get("BTCB").unwrap_or_default(),
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Client for the CoinGecko public price API.
#[derive(Debug, Clone)]
pub struct PriceClient {
    http: Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub async fn fetch_prices(&self) -> Result<PriceTable, PriceClientError> {
        let ids = PRICE_IDS.iter().map(|(id, _)| *id).collect::<Vec<_>>().join(",");
        let endpoint = format!("{}/simple/price", self.base_url.trim_end_matches('/'));
        let url = Url::parse_with_params(&endpoint, &[("ids", ids.as_str()), ("vs_currencies", "usd")])
            .map_err(|e| PriceClientError::Url(e.to_string()))?;

        let quotes: HashMap<String, HashMap<String, f64>> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(PriceTable::from_quotes(&quotes))
    }
}
