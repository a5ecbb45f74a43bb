//! Currency conversion and formatting for Bitcoin and satoshi values
//!
//! Amounts are compared as integer satoshis. Source records deliver BTC as a
//! decimal (JSON number), so conversion rounds to the nearest satoshi instead of
//! trusting float equality.

/// Satoshis per Bitcoin
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Convert a BTC decimal to satoshis, rounding half away from zero
///
/// Negative or non-finite inputs saturate to 0; callers validate records first.
///
/// # Examples
/// ```
/// use coinshuffle_scan::utils::currency::btc_to_sats;
///
/// assert_eq!(btc_to_sats(1.0), 100_000_000);
/// assert_eq!(btc_to_sats(0.1), 10_000_000);
/// assert_eq!(btc_to_sats(0.59990000), 59_990_000);
/// ```
pub fn btc_to_sats(btc: f64) -> u64 {
    (btc * SATS_PER_BTC as f64).round() as u64
}

/// Format satoshis as the shortest exact BTC decimal (at least one fractional digit)
///
/// # Examples
/// ```
/// use coinshuffle_scan::utils::currency::format_btc;
///
/// assert_eq!(format_btc(100_000_000), "1.0");
/// assert_eq!(format_btc(45_000_000), "0.45");
/// assert_eq!(format_btc(1), "0.00000001");
/// ```
pub fn format_btc(sats: u64) -> String {
    let whole = sats / SATS_PER_BTC;
    let frac = format!("{:08}", sats % SATS_PER_BTC);
    let trimmed = frac.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, trimmed)
    }
}
