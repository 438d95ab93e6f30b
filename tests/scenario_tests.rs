//! Scenario tests.
//!
//! Fixed configurations with known outcomes: flat market, breakouts above and
//! below the band, full hedge, and portfolio weighting.

use approx::assert_relative_eq;
use clmm_core::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

fn globals(price_change_pct: f64, hedge_pct: f64, hold_days: f64) -> GlobalParams {
    GlobalParams {
        price_change_pct,
        hedge: HedgeRatio::from_pct(hedge_pct),
        hold_days,
        notional: Quote::new(dec!(100000)),
        benchmark: Benchmark::Hodl5050,
    }
}

#[test]
fn flat_market_earns_fees_only() {
    let pnl = decompose_pnl(
        HalfRange::new(7.5),
        PriceRatio::new(1.0),
        1.0,
        HedgeRatio::from_pct(65.0),
        Benchmark::Hodl5050,
    );

    assert!(pnl.is_in_range);
    assert!(pnl.fees_earned > 0.0);
    assert_eq!(pnl.token0_pnl, 0.0);
    assert_eq!(pnl.hedge_pnl, 0.0);
    assert_relative_eq!(pnl.net_pnl, pnl.fees_earned, max_relative = 1e-12);
    assert!(pnl.net_pnl > 0.0 && pnl.net_pnl < 1.0);
}

#[test]
fn breakout_above_band() {
    let half_range = HalfRange::new(7.5);
    let ratio = PriceRatio::new(1.3);
    let pnl = decompose_pnl(half_range, ratio, 1.0, HedgeRatio::NONE, Benchmark::Hodl5050);

    assert_relative_eq!(half_range.bounds().upper, 1.075, max_relative = 1e-12);
    assert!(!pnl.is_in_range);
    assert!(!pnl.is_rebalancing());
    assert_eq!(pnl.token_composition, "100% TOKEN1");
    assert_eq!(pnl.fees_earned, 0.0);
    assert_eq!(pnl.token0_exposure, 0.0);

    let b = half_range.bounds();
    assert_eq!(token0_exposure_pct(ratio.sqrt(), b.sqrt_lower(), b.sqrt_upper(), 1.0), 0.0);
}

#[test]
fn breakout_below_band() {
    let pnl = decompose_pnl(
        HalfRange::new(5.0),
        PriceRatio::new(0.7),
        10.0,
        HedgeRatio::NONE,
        Benchmark::Hodl5050,
    );

    assert!(!pnl.is_in_range);
    assert_eq!(pnl.token_composition, "100% TOKEN0");
    assert_eq!(pnl.fees_earned, 0.0);
    assert!(pnl.static_exposure < 0.0);
    assert!(pnl.net_pnl < 0.0);
}

#[test]
fn full_hedge_without_move_is_zero() {
    let pnl = decompose_pnl(
        HalfRange::new(50.0),
        PriceRatio::new(1.0),
        1.0,
        HedgeRatio::from_pct(100.0),
        Benchmark::Hodl5050,
    );

    assert!(pnl.is_in_range);
    assert_eq!(pnl.hedge_pnl, 0.0);
    assert!(pnl.token0_exposure > 0.0 && pnl.token0_exposure < 100.0);
}

#[test]
fn full_hedge_cancels_initial_token0_leg() {
    let half_range = HalfRange::new(10.0);
    let b = half_range.bounds();
    let initial = token0_exposure_pct(1.0, b.sqrt_lower(), b.sqrt_upper(), 1.0);

    let pnl = decompose_pnl(half_range, PriceRatio::new(1.04), 0.0, HedgeRatio::from_pct(100.0), Benchmark::Hodl5050);
    assert_relative_eq!(pnl.hedge_pnl, -4.0 * initial / 100.0, max_relative = 1e-9);
}

#[test]
fn two_identical_halves_match_one_position() {
    let positions = vec![Position::new("Left", 50.0, 6.0), Position::new("Right", 50.0, 6.0)];
    let globals = globals(3.5, 40.0, 5.0);

    let rows = compute_rows(&positions, &globals);
    let totals = aggregate_totals(&rows, &positions);

    assert_eq!(totals.capital_sum, 100.0);
    assert!(totals.is_fully_allocated());
    assert_eq!(totals.total_net_pct, rows[0].pnl.net_pnl);

    let single = decompose_pnl(HalfRange::new(6.0), globals.ratio(), 5.0, globals.hedge, globals.benchmark);
    assert_eq!(totals.total_net_pct, single.net_pnl);

    let expected_abs = 100000.0 * single.net_pnl / 100.0;
    assert_relative_eq!(totals.total_net_abs.value().to_f64().unwrap(), expected_abs, max_relative = 1e-9);
}

#[test]
fn efficiency_boundary_is_inclusive() {
    let half_range = HalfRange::new(7.5);
    let upper = half_range.bounds().upper;

    let at_edge = capital_efficiency(half_range, PriceRatio::new(upper));
    assert!(at_edge > 0.0 && at_edge.is_finite());

    let beyond = f64::from_bits(upper.to_bits() + 1);
    assert_eq!(capital_efficiency(half_range, PriceRatio::new(beyond)), 0.0);
}

#[test]
fn default_book_down_move_is_cushioned_by_hedge() {
    let down = Scenario { price_change_pct: -5.0, ..Scenario::default() };
    let mut unhedged = down.clone();
    unhedged.clear_hedge();

    let hedged_sim = down.simulate();
    let unhedged_sim = unhedged.simulate();

    assert!(hedged_sim.summary.hedge_pnl > 0.0);
    assert_eq!(unhedged_sim.summary.hedge_pnl, 0.0);
    assert!(hedged_sim.totals.total_net_pct > unhedged_sim.totals.total_net_pct);
}

#[test]
fn scenario_file_roundtrip_through_simulation() {
    let json = r#"{
        "positions": [
            { "name": "Tight", "capitalPct": 60, "halfRangePct": 2 },
            { "name": "", "capitalPct": "40", "halfRangePct": "9.5" }
        ],
        "priceChangePct": 1.5,
        "hedgePct": 25,
        "holdDays": 7,
        "notional": 250000,
        "benchmark": "hodlOptimal"
    }"#;

    let scenario = Scenario::from_json_str(json).unwrap();
    assert!(scenario.validate().is_ok());

    let sim = scenario.simulate();
    assert_eq!(sim.rows.len(), 2);
    assert_eq!(sim.rows[1].name, "Position 2");
    assert_eq!(sim.rows[1].half_range_pct, 9.5);
    assert_relative_eq!(sim.ratio, 1.015, max_relative = 1e-12);
    assert!(sim.rows.iter().all(|r| r.inside));

    let sum_abs: Quote = sim.rows.iter().map(|r| r.net_abs).sum();
    assert_eq!(sum_abs, sim.totals.total_net_abs);
}

#[test]
fn zero_positions_accepted_by_core() {
    let input = Scenario { positions: Vec::new(), ..Scenario::default() }.normalize();
    let sim = simulate(&input);
    assert!(sim.rows.is_empty());
    assert_eq!(sim.totals.capital_sum, 0.0);
    assert_eq!(sim.totals.total_net_abs, Quote::zero());
}
