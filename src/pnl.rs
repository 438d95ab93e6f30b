// 3.0: pnl decomposition for one concentrated position after a price move.
// 3.0 has the output struct. 3.1 is decompose_pnl, 3.2 the fee proxy.
// every figure is percent of the starting position value.

use crate::liquidity::{pool_value, token0_exposure_pct};
use crate::types::{Benchmark, HalfRange, HedgeRatio, PriceRatio};
use serde::{Deserialize, Serialize};

// fee proxy: 0.74%/day at a ±1% band, scaled by 1/half_range within [0.1x, 10x]
pub const BASELINE_DAILY_FEE_PCT: f64 = 0.74;
pub const MIN_FEE_SCALE: f64 = 0.1;
pub const MAX_FEE_SCALE: f64 = 10.0;

/// Breakdown of a position's return, all in percent.
///
/// `lp_pnl` and `net_pnl` are sums of the other components and are only ever
/// set by [`decompose_pnl`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlComponents {
    /// Share of current position value held as token0 (0-100).
    pub token0_exposure: f64,
    /// Price move applied to the average of initial and current token0 exposure.
    pub token0_pnl: f64,
    /// Everything the pool lost or gained beyond the token0 leg (IL drag).
    pub rebalancing_cost: f64,
    pub fees_earned: f64,
    /// Short hedge sized to initial token0 exposure.
    pub hedge_pnl: f64,
    /// token0_pnl + rebalancing_cost + fees_earned
    pub lp_pnl: f64,
    /// lp_pnl + hedge_pnl
    pub net_pnl: f64,

    pub is_in_range: bool,
    /// "100% TOKEN0", "100% TOKEN1" or "{n}% TOKEN0" while in range.
    pub token_composition: String,

    /// Raw pool value change, before splitting into token0 leg and rebalancing.
    pub lp_value_change: f64,
    /// Pool value change minus a 50/50 hold.
    pub il_vs_hodl5050: f64,
    /// Pool value change minus holding whichever leg ended up better (max(1, ratio)).
    pub il_vs_optimal: f64,
    /// Boundary price the position left through. None while in range.
    pub exited_at: Option<f64>,
    /// Drift of the stranded token0 below the lower bound. 0 otherwise.
    pub static_exposure: f64,
}

impl PnlComponents {
    /// Same as `lp_pnl`; kept under the name the summary views use.
    pub fn net_before_hedge(&self) -> f64 {
        self.lp_pnl
    }

    /// Same as `hedge_pnl`.
    pub fn hedge_adjustment(&self) -> f64 {
        self.hedge_pnl
    }

    /// A position only rebalances while the price is inside its band.
    pub fn is_rebalancing(&self) -> bool {
        self.is_in_range
    }
}

// 3.1: full decomposition. pure, same inputs always give the same bits.
//
// benchmark is accepted but does not change any figure: the il_vs_* fields are
// always against 50/50 hold and the optimal leg regardless of which one is picked.
pub fn decompose_pnl(
    half_range: HalfRange,
    ratio: PriceRatio,
    hold_days: f64,
    hedge: HedgeRatio,
    _benchmark: Benchmark,
) -> PnlComponents {
    let bounds = half_range.bounds();
    let sqrt_min = bounds.sqrt_lower();
    let sqrt_max = bounds.sqrt_upper();
    let sqrt_p0 = 1.0;
    let sqrt_p1 = ratio.sqrt();

    let initial_exposure = token0_exposure_pct(sqrt_p0, sqrt_min, sqrt_max, 1.0);
    let current_exposure = token0_exposure_pct(sqrt_p1, sqrt_min, sqrt_max, 1.0);

    let price_change_pct = ratio.change_pct();

    // average exposure over the move, good enough for a linear attribution
    let avg_exposure = (initial_exposure + current_exposure) / 2.0;
    let token0_pnl = avg_exposure / 100.0 * price_change_pct;

    let value0 = pool_value(sqrt_p0, sqrt_min, sqrt_max, 1.0);
    let value1 = pool_value(sqrt_p1, sqrt_min, sqrt_max, 1.0);
    let lp_value_change = (value1 / value0 - 1.0) * 100.0;

    let rebalancing_cost = lp_value_change - token0_pnl;

    let is_in_range = bounds.contains(ratio);
    let below = ratio.value() < bounds.lower;
    let above = ratio.value() > bounds.upper;

    let token_composition = if below {
        "100% TOKEN0".to_string()
    } else if above {
        "100% TOKEN1".to_string()
    } else {
        format!("{:.0}% TOKEN0", current_exposure)
    };

    let fees_earned = if is_in_range {
        fee_accrual(half_range, hold_days)
    } else {
        0.0
    };

    let lp_pnl = token0_pnl + rebalancing_cost + fees_earned;

    // always short: the hedge pays when token0 falls and costs when it rises
    let hedge_pnl = -price_change_pct * (initial_exposure / 100.0) * hedge.value();

    let net_pnl = lp_pnl + hedge_pnl;

    let hodl5050_return = (0.5 + 0.5 * ratio.value() - 1.0) * 100.0;
    let il_vs_hodl5050 = lp_value_change - hodl5050_return;
    let il_vs_optimal = lp_value_change - (ratio.value().max(1.0) - 1.0) * 100.0;

    let (exited_at, static_exposure) = if below {
        (Some(bounds.lower), (ratio.value() / bounds.lower - 1.0) * 100.0)
    } else if above {
        (Some(bounds.upper), 0.0)
    } else {
        (None, 0.0)
    };

    PnlComponents {
        token0_exposure: current_exposure,
        token0_pnl,
        rebalancing_cost,
        fees_earned,
        hedge_pnl,
        lp_pnl,
        net_pnl,
        is_in_range,
        token_composition,
        lp_value_change,
        il_vs_hodl5050,
        il_vs_optimal,
        exited_at,
        static_exposure,
    }
}

// 3.2: deterministic fee proxy, not a volume model. only call while in range.
pub fn fee_accrual(half_range: HalfRange, hold_days: f64) -> f64 {
    let scale = (1.0 / half_range.pct()).clamp(MIN_FEE_SCALE, MAX_FEE_SCALE);
    BASELINE_DAILY_FEE_PCT * scale * hold_days.max(0.0)
}
