//! Interest rate conversion
//!
//! The money market reports the best available rate per block, scaled by
//! 1e18. Annualizing multiplies by the number of blocks mined in a year
//! (15s blocks) and keeps two decimal places of percent.

use alloy_primitives::U256;

/// Blocks mined per year at 15 seconds per block
pub const BLOCKS_PER_YEAR: u64 = 2_102_666;

/// 1e18 rate scale divided by 100 (percent) and again by 100 (two decimals kept)
pub const RATE_SCALE: u64 = 100_000_000_000_000;

/// Convert a raw per-block rate into an annualized percentage.
///
/// Computes `floor(raw * BLOCKS_PER_YEAR / RATE_SCALE) / 100`; the integer
/// part saturates instead of overflowing.
pub fn annualize_rate(raw_per_block: U256) -> f64 {
    let scaled = raw_per_block.saturating_mul(U256::from(BLOCKS_PER_YEAR)) / U256::from(RATE_SCALE);
    let hundredths = u64::try_from(scaled).unwrap_or(u64::MAX);
    hundredths as f64 / 100.0
}
