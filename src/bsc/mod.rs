pub mod explorer;
pub mod prices;
pub mod types;

pub use explorer::{ExplorerClient, ExplorerError};
pub use prices::{PriceClient, PriceClientError, PriceTable};
pub use types::{NormalTx, TokenTransfer};

use rust_decimal::Decimal;

/// Significant digits that always fit in a `Decimal` mantissa.
const MAX_DIGITS: usize = 28;

/// Convert a raw integer token amount into units, e.g. wei → BNB.
///
/// Fractional digits beyond `Decimal` precision are truncated. Amounts whose
/// integer part alone exceeds that precision saturate at `Decimal::MAX`.
/// Returns `None` for anything but an unsigned decimal integer.
pub fn parse_units(raw: &str, decimals: u32) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = raw.trim_start_matches('0');
    let decimals = decimals as usize;
    let (int, frac) = digits.split_at(digits.len().saturating_sub(decimals));
    if int.len() > MAX_DIGITS {
        return Some(Decimal::MAX);
    }

    let mut frac = format!("{frac:0>decimals$}");
    frac.truncate(MAX_DIGITS - int.len());
    let int = if int.is_empty() { "0" } else { int };
    let value = if frac.is_empty() {
        int.parse::<Decimal>()
    } else {
        format!("{int}.{frac}").parse::<Decimal>()
    };
    value.ok().map(|d| d.normalize())
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}
