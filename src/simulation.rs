// 6.0: one full pass over a normalized scenario. ratio → rows → totals → summary.
// cheap enough to rerun on every input change, nothing is cached.

use serde::{Deserialize, Serialize};

use crate::config::SimulationInput;
use crate::portfolio::{aggregate_totals, compute_rows, summarize, PortfolioSummary, PortfolioTotals, PositionRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub ratio: f64,
    pub rows: Vec<PositionRow>,
    pub totals: PortfolioTotals,
    pub summary: PortfolioSummary,
}

impl Simulation {
    pub fn in_range_rows(&self) -> impl Iterator<Item = &PositionRow> {
        self.rows.iter().filter(|r| r.inside)
    }
}

pub fn simulate(input: &SimulationInput) -> Simulation {
    let rows = compute_rows(&input.positions, &input.globals);
    let totals = aggregate_totals(&rows, &input.positions);
    let summary = summarize(&rows);

    Simulation {
        ratio: input.globals.ratio().value(),
        rows,
        totals,
        summary,
    }
}
