use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Explorer API envelope
// ---------------------------------------------------------------------------

/// Every BscScan-style response: `status` is `"1"` on success, otherwise
/// `result` usually carries an error string.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

// ---------------------------------------------------------------------------
// account/tokentx
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token_decimal: String,
    #[serde(default)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// account/txlist
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NormalTx {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}
