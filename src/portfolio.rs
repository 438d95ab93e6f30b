// 4.0: portfolio aggregation. runs the decomposer over every configured position,
// weights by capital, and reduces to portfolio totals.
// 4.1 compute_rows, 4.2 aggregate_totals, 4.3 summarize (breakdown for display).
// rows are independent and recomputed from scratch on every input change.

use crate::liquidity::capital_efficiency;
use crate::pnl::{decompose_pnl, PnlComponents};
use crate::types::{Benchmark, HalfRange, HedgeRatio, PriceRatio, Quote, RangeBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

// A position after input normalization. capital is finite, half range already floored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub name: String,
    // share of notional in percent. not forced to sum to 100 across positions
    pub capital_pct: f64,
    pub half_range: HalfRange,
}

impl Position {
    pub fn new(name: impl Into<String>, capital_pct: f64, half_range_pct: f64) -> Self {
        Self {
            name: name.into(),
            capital_pct: if capital_pct.is_finite() { capital_pct } else { 0.0 },
            half_range: HalfRange::new(half_range_pct),
        }
    }

    pub fn weight(&self) -> f64 {
        self.capital_pct / 100.0
    }
}

// Market move and holding assumptions shared by every position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParams {
    // percent move from the reference price 1.0, >= -100
    pub price_change_pct: f64,
    pub hedge: HedgeRatio,
    pub hold_days: f64,
    pub notional: Quote,
    pub benchmark: Benchmark,
}

impl GlobalParams {
    pub fn ratio(&self) -> PriceRatio {
        PriceRatio::from_change_pct(self.price_change_pct)
    }
}

/** 4.0.1: one position joined with its decomposition and capital-weighted figures */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub index: usize,
    pub name: String,
    pub capital_pct: f64,
    pub half_range_pct: f64,
    pub pnl: PnlComponents,
    pub inside: bool,
    pub bounds: RangeBounds,
    pub capital_efficiency: f64,
    // capital_pct/100 * net_pnl, so rows can be summed straight into a portfolio figure
    pub weighted_net_pct: f64,
    pub net_abs: Quote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    // raw sum, 100 when fully allocated. anything else is for the caller to flag
    pub capital_sum: f64,
    pub total_net_pct: f64,
    pub total_net_abs: Quote,
}

impl PortfolioTotals {
    pub fn is_fully_allocated(&self) -> bool {
        (self.capital_sum - 100.0).abs() < 1e-9
    }
}

// 4.1: one row per position, same order. each row only depends on its own position.
pub fn compute_rows(positions: &[Position], globals: &GlobalParams) -> Vec<PositionRow> {
    let ratio = globals.ratio();

    positions
        .iter()
        .enumerate()
        .map(|(index, position)| compute_row(index, position, ratio, globals))
        .collect()
}

fn compute_row(
    index: usize,
    position: &Position,
    ratio: PriceRatio,
    globals: &GlobalParams,
) -> PositionRow {
    let bounds = position.half_range.bounds();
    let pnl = decompose_pnl(
        position.half_range,
        ratio,
        globals.hold_days,
        globals.hedge,
        globals.benchmark,
    );
    let efficiency = capital_efficiency(position.half_range, ratio);

    let weight = position.weight();
    let weighted_net_pct = weight * pnl.net_pnl;
    let net_abs = globals.notional.scale(weight * (pnl.net_pnl / 100.0));

    debug!(
        index,
        name = %position.name,
        capital_pct = position.capital_pct,
        half_range = position.half_range.pct(),
        in_range = pnl.is_in_range,
        net_pnl = pnl.net_pnl,
        "computed position row"
    );

    PositionRow {
        index,
        name: position.name.clone(),
        capital_pct: position.capital_pct,
        half_range_pct: position.half_range.pct(),
        inside: pnl.is_in_range,
        pnl,
        bounds,
        capital_efficiency: efficiency,
        weighted_net_pct,
        net_abs,
    }
}

// 4.2: plain sums. rows already carry their capital share so no renormalization,
// even when capital doesn't add to 100.
pub fn aggregate_totals(rows: &[PositionRow], positions: &[Position]) -> PortfolioTotals {
    let capital_sum = positions.iter().map(|p| p.capital_pct).sum::<f64>();
    let total_net_pct = rows.iter().map(|r| r.weighted_net_pct).sum::<f64>();
    let total_net_abs = rows.iter().map(|r| r.net_abs).sum::<Quote>();

    debug!(capital_sum, total_net_pct, total_net_abs = %total_net_abs, "aggregated portfolio");

    PortfolioTotals {
        capital_sum,
        total_net_pct,
        total_net_abs,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub lp_value_change: f64,
    pub token0_pnl: f64,
    pub fees_earned: f64,
    pub hedge_pnl: f64,
    // mean over funded positions only
    pub avg_efficiency: f64,
    pub positions_in_range: usize,
    pub funded_positions: usize,
}

// 4.3: capital-weighted component breakdown. positions with no capital don't count
// towards efficiency or the in-range tally.
pub fn summarize(rows: &[PositionRow]) -> PortfolioSummary {
    let weighted = |component: fn(&PnlComponents) -> f64| -> f64 {
        rows.iter()
            .map(|r| component(&r.pnl) * r.capital_pct / 100.0)
            .sum()
    };

    let funded: Vec<&PositionRow> = rows.iter().filter(|r| r.capital_pct > 0.0).collect();
    let avg_efficiency = if funded.is_empty() {
        0.0
    } else {
        funded.iter().map(|r| r.capital_efficiency).sum::<f64>() / funded.len() as f64
    };

    PortfolioSummary {
        lp_value_change: weighted(|p: &PnlComponents| p.lp_value_change),
        token0_pnl: weighted(|p: &PnlComponents| p.token0_pnl),
        fees_earned: weighted(|p: &PnlComponents| p.fees_earned),
        hedge_pnl: weighted(|p: &PnlComponents| p.hedge_pnl),
        avg_efficiency,
        positions_in_range: funded.iter().filter(|r| r.inside).count(),
        funded_positions: funded.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    fn globals(price_change_pct: f64) -> GlobalParams {
        GlobalParams {
            price_change_pct,
            hedge: HedgeRatio::from_pct(65.0),
            hold_days: 1.0,
            notional: Quote::new(dec!(100000)),
            benchmark: Benchmark::Hodl5050,
        }
    }

    fn book() -> Vec<Position> {
        vec![
            Position::new("Central", 50.0, 7.5),
            Position::new("Coverage", 30.0, 11.1),
            Position::new("Safe", 20.0, 15.0),
        ]
    }

    #[test]
    fn rows_keep_order_and_count() {
        let rows = compute_rows(&book(), &globals(0.0));
        assert_eq!(rows.len(), 3);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Central", "Coverage", "Safe"]);
        assert_eq!(rows[2].index, 2);
    }

    #[test]
    fn empty_book() {
        let rows = compute_rows(&[], &globals(5.0));
        assert!(rows.is_empty());
        let totals = aggregate_totals(&rows, &[]);
        assert_eq!(totals.capital_sum, 0.0);
        assert_eq!(totals.total_net_pct, 0.0);
        assert_eq!(totals.total_net_abs, Quote::zero());
        assert_eq!(summarize(&rows).avg_efficiency, 0.0);
    }

    #[test]
    fn row_weighting() {
        let rows = compute_rows(&book(), &globals(2.0));
        let central = &rows[0];
        assert_eq!(central.weighted_net_pct, 0.5 * central.pnl.net_pnl);

        let expected = 100000.0 * 0.5 * central.pnl.net_pnl / 100.0;
        let got = central.net_abs.value().to_f64().unwrap();
        assert_relative_eq!(got, expected, max_relative = 1e-9);
    }

    #[test]
    fn row_bounds_match_half_range() {
        let rows = compute_rows(&book(), &globals(0.0));
        assert_relative_eq!(rows[1].bounds.lower, 0.889, max_relative = 1e-12);
        assert_relative_eq!(rows[1].bounds.upper, 1.111, max_relative = 1e-12);
        assert!(rows.iter().all(|r| r.inside));
    }

    #[test]
    fn totals_not_renormalized() {
        let positions = vec![Position::new("A", 40.0, 5.0), Position::new("B", 40.0, 5.0)];
        let rows = compute_rows(&positions, &globals(0.0));
        let totals = aggregate_totals(&rows, &positions);

        assert_eq!(totals.capital_sum, 80.0);
        assert!(!totals.is_fully_allocated());
        // 80% deployed → 80% of a single position's return
        assert_relative_eq!(totals.total_net_pct, 0.8 * rows[0].pnl.net_pnl, max_relative = 1e-12);
    }

    #[test]
    fn over_allocation_surfaces() {
        let positions = vec![Position::new("A", 70.0, 5.0), Position::new("B", 60.0, 9.0)];
        let rows = compute_rows(&positions, &globals(0.0));
        assert_eq!(aggregate_totals(&rows, &positions).capital_sum, 130.0);
    }

    #[test]
    fn summary_ignores_unfunded() {
        let positions = vec![
            Position::new("Funded in", 60.0, 10.0),
            Position::new("Funded out", 40.0, 1.0),
            Position::new("Empty", 0.0, 10.0),
        ];
        let rows = compute_rows(&positions, &globals(3.0));
        let summary = summarize(&rows);

        assert_eq!(summary.funded_positions, 2);
        assert_eq!(summary.positions_in_range, 1);
        // out-of-range row contributes 0 efficiency to the mean
        assert_relative_eq!(summary.avg_efficiency, rows[0].capital_efficiency / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn summary_weighted_components() {
        let rows = compute_rows(&book(), &globals(-4.0));
        let summary = summarize(&rows);
        let expected_fees: f64 = rows.iter().map(|r| r.pnl.fees_earned * r.capital_pct / 100.0).sum();
        assert_relative_eq!(summary.fees_earned, expected_fees, max_relative = 1e-12);
        assert!(summary.hedge_pnl > 0.0);
    }
}
