use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::parse_units;
use super::types::{ExplorerEnvelope, NormalTx, TokenTransfer};
use crate::catalog::NATIVE_DECIMALS;

pub const BSCSCAN_API_BASE: &str = "https://api.bscscan.com/api";

/// Number of most recent token transfers inspected per scan.
pub const TOKEN_TX_PAGE_SIZE: u32 = 100;
/// Number of most recent normal transactions inspected per scan.
pub const NORMAL_TX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(String),

    #[error("explorer API error: {0}")]
    Api(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Client for a BscScan-compatible block explorer API.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ExplorerClient {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Native BNB balance, in BNB.
    pub async fn native_balance(&self, address: &str) -> Result<Decimal, ExplorerError> {
        let raw: String = self
            .call(&[
                ("module", "account"),
                ("action", "balance"),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;

        parse_units(&raw, NATIVE_DECIMALS)
            .ok_or_else(|| ExplorerError::Unexpected(format!("bad balance: {raw}")))
    }

    /// BEP-20 balance for one token contract, in token units.
    pub async fn token_balance(
        &self,
        address: &str,
        contract: &str,
        decimals: u32,
    ) -> Result<Decimal, ExplorerError> {
        let raw: String = self
            .call(&[
                ("module", "account"),
                ("action", "tokenbalance"),
                ("contractaddress", contract),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;

        parse_units(&raw, decimals)
            .ok_or_else(|| ExplorerError::Unexpected(format!("bad token balance: {raw}")))
    }

    /// Most recent BEP-20 transfers touching `address`, newest first.
    pub async fn token_transfers(&self, address: &str) -> Result<Vec<TokenTransfer>, ExplorerError> {
        let offset = TOKEN_TX_PAGE_SIZE.to_string();
        self.call(&[
            ("module", "account"),
            ("action", "tokentx"),
            ("address", address),
            ("page", "1"),
            ("offset", offset.as_str()),
            ("sort", "desc"),
        ])
        .await
    }

    /// Most recent normal transactions sent from or to `address`, newest first.
    pub async fn transactions(&self, address: &str) -> Result<Vec<NormalTx>, ExplorerError> {
        let offset = NORMAL_TX_PAGE_SIZE.to_string();
        self.call(&[
            ("module", "account"),
            ("action", "txlist"),
            ("address", address),
            ("page", "1"),
            ("offset", offset.as_str()),
            ("sort", "desc"),
        ])
        .await
    }

    async fn call<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, ExplorerError> {
        let mut pairs = params.to_vec();
        pairs.push(("apikey", self.api_key.as_str()));
        let url = Url::parse_with_params(&self.base_url, &pairs)
            .map_err(|e| ExplorerError::Url(e.to_string()))?;

        let envelope: ExplorerEnvelope = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        unwrap_envelope(envelope)
    }
}

/// Extract `result` from an explorer envelope. A `"0"` status with an empty
/// list (e.g. "No transactions found") is a successful empty result.
pub fn unwrap_envelope<T: DeserializeOwned>(envelope: ExplorerEnvelope) -> Result<T, ExplorerError> {
    let empty_list = envelope.result.as_array().is_some_and(|a| a.is_empty());
    if envelope.status != "1" && !empty_list {
        let detail = envelope
            .result
            .as_str()
            .map(str::to_string)
            .unwrap_or(envelope.message);
        return Err(ExplorerError::Api(detail));
    }

    serde_json::from_value(envelope.result).map_err(|e| ExplorerError::Unexpected(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ExplorerEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_unwrap_balance() {
        let raw: String =
            unwrap_envelope(envelope(r#"{"status":"1","message":"OK","result":"42"}"#)).unwrap();
        assert_eq!(raw, "42");
    }

    #[test]
    fn test_unwrap_error_string() {
        let err = unwrap_envelope::<Vec<NormalTx>>(envelope(
            r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("Max rate limit reached"));
    }

    #[test]
    fn test_unwrap_no_transactions_is_empty() {
        let txs: Vec<NormalTx> = unwrap_envelope(envelope(
            r#"{"status":"0","message":"No transactions found","result":[]}"#,
        ))
        .unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn test_unwrap_token_transfers() {
        let transfers: Vec<TokenTransfer> = unwrap_envelope(envelope(
            r#"{"status":"1","message":"OK","result":[{
                "from":"0xaaa","to":"0xbbb","contractAddress":"0xccc",
                "tokenSymbol":"FOO","tokenName":"Foo","tokenDecimal":"9","value":"1000000000",
                "blockNumber":"1"
            }]}"#,
        ))
        .unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].token_symbol, "FOO");
        assert_eq!(transfers[0].contract_address, "0xccc");
    }
}
