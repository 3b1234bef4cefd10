use rust_decimal::Decimal;

/// A BEP-20 token whose balance is checked directly on every scan.
#[derive(Debug)]
pub struct KnownToken {
    /// Lowercase contract address.
    pub contract: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u32,
}

pub static KNOWN_TOKENS: &[KnownToken] = &[
    KnownToken { contract: "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c", symbol: "WBNB", name: "Wrapped BNB", decimals: 18 },
    KnownToken { contract: "0x55d398326f99059ff775485246999027b3197955", symbol: "USDT", name: "Tether USD", decimals: 18 },
    KnownToken { contract: "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d", symbol: "USDC", name: "USD Coin", decimals: 18 },
    KnownToken { contract: "0xe9e7cea3dedca5984780bafc599bd69add087d56", symbol: "BUSD", name: "Binance USD", decimals: 18 },
    KnownToken { contract: "0x2170ed0880ac9a755fd29b2688956bd959f933f8", symbol: "ETH", name: "Ethereum", decimals: 18 },
    KnownToken { contract: "0x7130d2a12b9bcbfae4f2634d864a1ee1ce3ead9c", symbol: "BTCB", name: "Bitcoin BEP2", decimals: 18 },
    KnownToken { contract: "0x0e09fabb73bd3ade0a17ecc321fd13a19e81ce82", symbol: "CAKE", name: "PancakeSwap", decimals: 18 },
    KnownToken { contract: "0xcf6bb5389c92bdda8a3747ddb454cb7a64626c63", symbol: "XVS", name: "Venus", decimals: 18 },
];

pub fn known_token(contract: &str) -> Option<&'static KnownToken> {
    let lower = contract.to_ascii_lowercase();
    KNOWN_TOKENS.iter().find(|t| t.contract == lower)
}

pub const STABLECOINS: &[&str] = &["USDT", "USDC", "BUSD", "DAI", "TUSD"];

pub fn is_stablecoin(symbol: &str) -> bool {
    STABLECOINS.contains(&symbol)
}

/// Native coin decimals on BSC.
pub const NATIVE_DECIMALS: u32 = 18;

/// USD prices used whenever the live price feed is unavailable.
/// Entries are (symbol, mantissa, scale).
const FALLBACK_PRICES: &[(&str, i64, u32)] = &[
    ("WBNB", 600, 0),
    ("BNB", 600, 0),
    ("USDT", 1, 0),
    ("USDC", 1, 0),
    ("BUSD", 1, 0),
    ("ETH", 3200, 0),
    ("BTCB", 95000, 0),
    ("CAKE", 25, 1),
    ("XVS", 8, 0),
];

pub fn fallback_price(symbol: &str) -> Option<Decimal> {
    FALLBACK_PRICES
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, m, scale)| Decimal::new(*m, *scale))
}

pub fn fallback_symbols() -> impl Iterator<Item = &'static str> {
    FALLBACK_PRICES.iter().map(|(s, _, _)| *s)
}
