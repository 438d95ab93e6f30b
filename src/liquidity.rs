// 2.0: concentrated liquidity math. value and token mix of one unit of liquidity
// placed between sqrt_price_min and sqrt_price_max, priced in token1.
// three regimes everywhere: below range (all token0), above range (all token1), in range.

use crate::types::{HalfRange, PriceRatio};

// capital efficiency is quoted against a band this wide, standing in for full range
pub const FULL_RANGE_WIDTH: f64 = 1000.0;
pub const MAX_CAPITAL_EFFICIENCY: f64 = 100.0;

/// Token amounts held by `unit_liquidity` at an in-range sqrt price.
fn in_range_amounts(
    sqrt_price: f64,
    sqrt_price_min: f64,
    sqrt_price_max: f64,
    unit_liquidity: f64,
) -> (f64, f64) {
    let x = unit_liquidity * (sqrt_price_max - sqrt_price) / (sqrt_price * sqrt_price_max);
    let y = unit_liquidity * (sqrt_price - sqrt_price_min);
    (x, y)
}

// 2.1: position value in token1 terms. x * P + y
pub fn pool_value(
    sqrt_price: f64,
    sqrt_price_min: f64,
    sqrt_price_max: f64,
    unit_liquidity: f64,
) -> f64 {
    let price = sqrt_price * sqrt_price;

    if sqrt_price <= sqrt_price_min {
        let x = unit_liquidity * (sqrt_price_max - sqrt_price_min) / (sqrt_price_min * sqrt_price_max);
        x * price
    } else if sqrt_price >= sqrt_price_max {
        unit_liquidity * (sqrt_price_max - sqrt_price_min)
    } else {
        let (x, y) = in_range_amounts(sqrt_price, sqrt_price_min, sqrt_price_max, unit_liquidity);
        x * price + y
    }
}

// 2.2: percent of position value held as token0. 100 below range, 0 above.
pub fn token0_exposure_pct(
    sqrt_price: f64,
    sqrt_price_min: f64,
    sqrt_price_max: f64,
    unit_liquidity: f64,
) -> f64 {
    if sqrt_price <= sqrt_price_min {
        100.0
    } else if sqrt_price >= sqrt_price_max {
        0.0
    } else {
        let (x, y) = in_range_amounts(sqrt_price, sqrt_price_min, sqrt_price_max, unit_liquidity);
        let token0_value = x * sqrt_price * sqrt_price;
        100.0 * token0_value / (token0_value + y)
    }
}

// 2.3: display heuristic, not a derivation. narrower band = bigger multiplier, capped at 100x.
// zero once the price has left the band.
pub fn capital_efficiency(half_range: HalfRange, ratio: PriceRatio) -> f64 {
    let bounds = half_range.bounds();
    if !bounds.contains(ratio) {
        return 0.0;
    }

    (FULL_RANGE_WIDTH / bounds.width()).sqrt().min(MAX_CAPITAL_EFFICIENCY)
}
