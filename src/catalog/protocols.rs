use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    Lending,
    Dex,
    Yield,
    Bridge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolRisk {
    Low,
    Medium,
    High,
}

/// Keys of the supported BSC protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKey {
    Venus,
    Pancakeswap,
    Alpaca,
    Beefy,
    Stargate,
    Thena,
}

impl ProtocolKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolKey::Venus => "venus",
            ProtocolKey::Pancakeswap => "pancakeswap",
            ProtocolKey::Alpaca => "alpaca",
            ProtocolKey::Beefy => "beefy",
            ProtocolKey::Stargate => "stargate",
            ProtocolKey::Thena => "thena",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        PROTOCOLS.iter().map(|p| p.key).find(|k| k.as_str() == key)
    }
}

impl fmt::Display for ProtocolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata for one protocol.
#[derive(Debug)]
pub struct ProtocolInfo {
    pub key: ProtocolKey,
    pub name: &'static str,
    pub kind: ProtocolKind,
    /// TVL in billions of USD, as (mantissa, scale).
    tvl_billions: (i64, u32),
    pub audited: bool,
    pub risk_level: ProtocolRisk,
    /// Advertised yields in basis points, in declaration order.
    pub yields: &'static [(&'static str, u32)],
    /// Lowercase contract addresses whose interaction marks the protocol as used.
    pub contracts: &'static [&'static str],
}

impl ProtocolInfo {
    pub fn tvl_billions(&self) -> Decimal {
        Decimal::new(self.tvl_billions.0, self.tvl_billions.1)
    }

    pub fn yield_for(&self, symbol: &str) -> Option<u32> {
        self.yields
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, bps)| *bps)
    }

    /// Mean of the advertised yields, in basis points.
    pub fn mean_yield(&self) -> Decimal {
        if self.yields.is_empty() {
            return Decimal::ZERO;
        }
        let sum: u32 = self.yields.iter().map(|(_, bps)| bps).sum();
        Decimal::from(sum) / Decimal::from(self.yields.len() as u64)
    }
}

/// Protocol catalog. Order matters: the yield module keeps the first
/// protocol offering the strictly highest yield.
pub static PROTOCOLS: &[ProtocolInfo] = &[
    ProtocolInfo {
        key: ProtocolKey::Venus,
        name: "Venus Protocol",
        kind: ProtocolKind::Lending,
        tvl_billions: (15, 1),
        audited: true,
        risk_level: ProtocolRisk::Low,
        yields: &[("USDT", 350), ("USDC", 300), ("BNB", 150), ("BTCB", 80), ("ETH", 120)],
        contracts: &[
            "0xcf6bb5389c92bdda8a3747ddb454cb7a64626c63",
            "0xa07c5b74c9b40447a954e1466938b865b6bbea36",
            "0xeca88125a5adbe82614ffc12d0db554e2e2867c8",
            "0xfd5840cd36d94d7229439859c0112a4185bc0255",
            "0xfd36e2c2a6789db23113685031d7f16329158384",
        ],
    },
    ProtocolInfo {
        key: ProtocolKey::Pancakeswap,
        name: "PancakeSwap",
        kind: ProtocolKind::Dex,
        tvl_billions: (20, 1),
        audited: true,
        risk_level: ProtocolRisk::Low,
        yields: &[("CAKE", 1500), ("CAKE-BNB", 2500), ("USDT-BNB", 800)],
        contracts: &[
            "0x10ed43c718714eb63d5aa57b78b54704e256024e",
            "0x73feaa1ee314f8c655e354234017be2193c9e24e",
            "0x13f4ea83d0bd40e75c8222255bc855a974568dd4",
            "0x0bfbcf9fa4f9c56b0f40a671ad40e0805a091865",
            "0x46a15b0b27311cedf172ab29e4f4766fbe7f4364",
            "0x556b9306565093c855aea9ae92a594704c2cd59e",
        ],
    },
    ProtocolInfo {
        key: ProtocolKey::Alpaca,
        name: "Alpaca Finance",
        kind: ProtocolKind::Yield,
        tvl_billions: (3, 1),
        audited: true,
        risk_level: ProtocolRisk::Medium,
        yields: &[("BNB", 800), ("USDT", 600), ("BUSD", 550)],
        contracts: &["0xa625ab01b08ce023b2a342dbb12a16f2c8489a8f"],
    },
    ProtocolInfo {
        key: ProtocolKey::Beefy,
        name: "Beefy Finance",
        kind: ProtocolKind::Yield,
        tvl_billions: (4, 1),
        audited: true,
        risk_level: ProtocolRisk::Low,
        yields: &[("AUTO-COMPOUND", 1200)],
        contracts: &[],
    },
    ProtocolInfo {
        key: ProtocolKey::Stargate,
        name: "Stargate Finance",
        kind: ProtocolKind::Bridge,
        tvl_billions: (5, 1),
        audited: true,
        risk_level: ProtocolRisk::Medium,
        yields: &[("USDT", 250), ("USDC", 200)],
        contracts: &[
            "0x4a364f8c717caad9a442737eb7b8a55cc6cf18d8",
            "0x3052a0f6ab15b4ae1df39962d5ddefaca86dab47",
        ],
    },
    ProtocolInfo {
        key: ProtocolKey::Thena,
        name: "Thena",
        kind: ProtocolKind::Dex,
        tvl_billions: (1, 1),
        audited: true,
        risk_level: ProtocolRisk::Medium,
        yields: &[("THE-BNB", 3000), ("USDT-USDC", 400)],
        contracts: &[
            "0xd4ae6eca985340dd434d38f470accce4dc78d109",
            "0x20a304a7d126758dfe6b243d0c075e5a31eb2e52",
        ],
    },
];

/// Look up a protocol by its wire key (`"venus"`, `"thena"`, ...).
pub fn protocol(key: &str) -> Option<&'static ProtocolInfo> {
    PROTOCOLS.iter().find(|p| p.key.as_str() == key)
}

/// Resolve a contract address (any case) to the protocol it belongs to.
pub fn protocol_by_contract(address: &str) -> Option<ProtocolKey> {
    let lower = address.to_ascii_lowercase();
    PROTOCOLS
        .iter()
        .find(|p| p.contracts.iter().any(|c| *c == lower))
        .map(|p| p.key)
}
