//! Application-wide constants.

use std::time::Duration;

use fundscope_market_data::Period;

/// Reference horizon for aggregate comparison statistics.
pub const REFERENCE_PERIOD: Period = Period::ThreeYears;

/// Decimal places kept on performance deltas.
pub const DELTA_DECIMALS: u32 = 4;

/// How long a resolved benchmark stays valid in the cache.
pub const BENCHMARK_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on identifiers accepted by one preload call.
pub const PRELOAD_CAP: usize = 15;

/// Round `value` to [`DELTA_DECIMALS`] decimal places.
pub fn round_delta(value: f64) -> f64 {
    let factor = 10f64.powi(DELTA_DECIMALS as i32);
    (value * factor).round() / factor
}
