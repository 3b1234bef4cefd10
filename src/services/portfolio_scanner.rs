use futures_util::future::join_all;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::bsc::{parse_units, ExplorerClient, NormalTx, PriceClient, PriceTable, TokenTransfer};
use crate::catalog::{known_token, protocol_by_contract, KnownToken, ProtocolKey, KNOWN_TOKENS, NATIVE_DECIMALS};
use crate::models::{PortfolioSnapshot, TokenHolding, NATIVE_CONTRACT};

/// Balances at or below this many units are treated as dust and skipped.
pub const DUST_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Reads a wallet's holdings and protocol interactions from the block
/// explorer and values them with live prices.
#[derive(Debug, Clone)]
pub struct PortfolioScanner {
    explorer: ExplorerClient,
    prices: PriceClient,
}

/// Raw upstream results for one scan. Any failed call contributes its
/// empty value.
#[derive(Debug, Clone, Default)]
pub struct ScanParts {
    pub prices: PriceTable,
    pub native_balance: Option<Decimal>,
    pub token_balances: Vec<(&'static KnownToken, Decimal)>,
    pub transfers: Vec<TokenTransfer>,
    pub transactions: Vec<NormalTx>,
}

impl PortfolioScanner {
    pub fn new(explorer: ExplorerClient, prices: PriceClient) -> Self {
        Self { explorer, prices }
    }

    pub async fn scan(&self, address: &str) -> PortfolioSnapshot {
        let balances = join_all(KNOWN_TOKENS.iter().map(|token| async move {
            let result = self
                .explorer
                .token_balance(address, token.contract, token.decimals)
                .await;
            (token, result)
        }));

        let (prices, native, balances, transfers, transactions) = tokio::join!(
            self.prices.fetch_prices(),
            self.explorer.native_balance(address),
            balances,
            self.explorer.token_transfers(address),
            self.explorer.transactions(address),
        );

        let prices = prices.unwrap_or_else(|e| {
            upstream_failure("prices", address, &e);
            PriceTable::fallback()
        });

        let native_balance = native
            .map_err(|e| upstream_failure("balance", address, &e))
            .ok();

        let token_balances = balances
            .into_iter()
            .filter_map(|(token, result)| match result {
                Ok(balance) => Some((token, balance)),
                Err(e) => {
                    tracing::warn!(error = %e, address, token = token.symbol, "Token balance lookup failed");
                    metrics::counter!("upstream_failures_total", "source" => "tokenbalance").increment(1);
                    None
                }
            })
            .collect();

        let transfers = transfers.unwrap_or_else(|e| {
            upstream_failure("tokentx", address, &e);
            Vec::new()
        });
        let transactions = transactions.unwrap_or_else(|e| {
            upstream_failure("txlist", address, &e);
            Vec::new()
        });

        let parts = ScanParts {
            prices,
            native_balance,
            token_balances,
            transfers,
            transactions,
        };
        let snapshot = build_snapshot(address, parts, chrono::Utc::now().timestamp_millis());

        metrics::counter!("portfolio_scans_total").increment(1);
        tracing::info!(
            address,
            tokens = snapshot.token_count,
            protocols = snapshot.protocols.len(),
            total_value_usd = %snapshot.total_value_usd,
            "Portfolio scanned"
        );

        snapshot
    }
}

fn upstream_failure(source: &'static str, address: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(error = %error, address, source, "Upstream call failed");
    metrics::counter!("upstream_failures_total", "source" => source).increment(1);
}

/// Assemble a snapshot from upstream results.
pub fn build_snapshot(address: &str, parts: ScanParts, timestamp: i64) -> PortfolioSnapshot {
    let wallet = address.to_ascii_lowercase();
    let mut tokens: Vec<TokenHolding> = Vec::new();
    let mut protocols: Vec<ProtocolKey> = Vec::new();

    if let Some(balance) = parts.native_balance.filter(|b| *b > DUST_THRESHOLD) {
        tokens.push(TokenHolding {
            symbol: "BNB".into(),
            name: "BNB".into(),
            balance,
            value_usd: balance.saturating_mul(parts.prices.get("BNB").unwrap_or_default()),
            contract: NATIVE_CONTRACT.into(),
        });
    }

    for (token, balance) in parts.token_balances {
        if balance <= DUST_THRESHOLD {
            continue;
        }
        tokens.push(TokenHolding {
            symbol: token.symbol.into(),
            name: token.name.into(),
            balance,
            value_usd: balance.saturating_mul(parts.prices.get(token.symbol).unwrap_or_default()),
            contract: token.contract.into(),
        });
    }

    for tx in &parts.transfers {
        for counterparty in [&tx.from, &tx.to] {
            if let Some(key) = protocol_by_contract(counterparty) {
                note_protocol(&mut protocols, key);
            }
        }

        // Incoming transfers of tokens outside the known list hint at holdings
        // we cannot price.
        let contract = tx.contract_address.to_ascii_lowercase();
        if tx.token_symbol.is_empty()
            || tx.to.to_ascii_lowercase() != wallet
            || known_token(&contract).is_some()
            || tokens.iter().any(|t| t.contract == contract)
        {
            continue;
        }
        let decimals = tx.token_decimal.parse().unwrap_or(NATIVE_DECIMALS);
        let amount = parse_units(&tx.value, decimals).unwrap_or_default();
        if amount > Decimal::ZERO {
            let name = if tx.token_name.is_empty() { &tx.token_symbol } else { &tx.token_name };
            tokens.push(TokenHolding {
                symbol: tx.token_symbol.clone(),
                name: name.clone(),
                balance: amount,
                value_usd: Decimal::ZERO,
                contract,
            });
        }
    }

    for tx in &parts.transactions {
        if let Some(key) = protocol_by_contract(&tx.to) {
            note_protocol(&mut protocols, key);
        }
    }

    tokens.sort_by(|a, b| b.value_usd.cmp(&a.value_usd));
    let total = tokens
        .iter()
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.value_usd));

    PortfolioSnapshot {
        address: address.to_string(),
        token_count: tokens.len(),
        tokens,
        total_value_usd: total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        protocols: protocols.iter().map(|k| k.as_str().to_string()).collect(),
        prices: Some(parts.prices.reference()),
        timestamp,
    }
}

fn note_protocol(protocols: &mut Vec<ProtocolKey>, key: ProtocolKey) {
    if !protocols.contains(&key) {
        protocols.push(key);
    }
}
