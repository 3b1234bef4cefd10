//! Process-wide constant configuration: the protocol catalog, known BEP-20
//! tokens, stablecoins and fallback prices.

pub mod protocols;
pub mod tokens;

pub use protocols::{protocol, protocol_by_contract, ProtocolInfo, ProtocolKey, ProtocolKind, ProtocolRisk, PROTOCOLS};
pub use tokens::{fallback_price, is_stablecoin, known_token, KnownToken, KNOWN_TOKENS, NATIVE_DECIMALS, STABLECOINS};
