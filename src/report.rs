// 7.0: plain-text rendering of a simulation for the terminal.
// per-position blocks first, then the portfolio panel.

use rust_decimal::Decimal;
use std::fmt::Write;

use crate::portfolio::{PortfolioTotals, PositionRow};
use crate::simulation::Simulation;
use crate::types::{HalfRange, PriceRatio, Quote};

// +1.234% / -0.500%
pub fn signed_pct(value: f64, decimals: usize) -> String {
    // -0.0 would print as "+-0.00%"
    let value = if value == 0.0 { 0.0 } else { value };
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.decimals$}%")
}

// +$1,234.56 / -$98.00
pub fn signed_usd(amount: Quote) -> String {
    let sign = if amount.is_negative() { "-" } else { "+" };
    format!("{sign}${}", group_thousands(amount.abs().round_cents().value()))
}

fn group_thousands(value: Decimal) -> String {
    let fixed = format!("{:.2}", value);
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}.{frac}")
}

// None when the book sums to 100%
pub fn allocation_flag(totals: &PortfolioTotals) -> Option<&'static str> {
    if totals.is_fully_allocated() {
        None
    } else if totals.capital_sum > 100.0 {
        Some("OVER-ALLOCATED")
    } else {
        Some("UNDER-ALLOCATED")
    }
}

fn render_row(out: &mut String, row: &PositionRow) {
    let status = if row.inside { "IN RANGE" } else { "OUT RANGE" };
    let _ = writeln!(
        out,
        "{:<16} {:>6.1}%  {:<7} [{:.4} - {:.4}]  {:<9}  {:<12}  net {:>9}  {:>14}",
        row.name,
        row.capital_pct,
        HalfRange::new(row.half_range_pct).to_string(),
        row.bounds.lower,
        row.bounds.upper,
        status,
        row.pnl.token_composition,
        signed_pct(row.pnl.net_pnl, 2),
        signed_usd(row.net_abs),
    );
    let _ = writeln!(
        out,
        "    lp value {}  token0 {}  rebalancing {}  fees {}  hedge {}  efficiency {:.1}x",
        signed_pct(row.pnl.lp_value_change, 2),
        signed_pct(row.pnl.token0_pnl, 2),
        signed_pct(row.pnl.rebalancing_cost, 2),
        signed_pct(row.pnl.fees_earned, 2),
        signed_pct(row.pnl.hedge_pnl, 2),
        row.capital_efficiency,
    );
}

pub fn render_table(sim: &Simulation) -> String {
    let mut out = String::new();

    let ratio = PriceRatio::new(sim.ratio);
    let _ = writeln!(out, "PRICE RATIO {} ({})", ratio, signed_pct(ratio.change_pct(), 1));
    let _ = writeln!(out);
    let _ = writeln!(out, "POSITIONS");
    for row in &sim.rows {
        render_row(&mut out, row);
    }

    let totals = &sim.totals;
    let summary = &sim.summary;
    let allocation_flag = allocation_flag(totals)
        .map(|flag| format!("  ({flag})"))
        .unwrap_or_default();

    let _ = writeln!(out);
    let _ = writeln!(out, "PORTFOLIO PERFORMANCE");
    let _ = writeln!(out, "  net p/l            {}", signed_pct(totals.total_net_pct, 3));
    let _ = writeln!(out, "  net p/l ($)        {}", signed_usd(totals.total_net_abs));
    let _ = writeln!(out, "  lp value change    {}", signed_pct(summary.lp_value_change, 2));
    let _ = writeln!(out, "  token0 p/l         {}", signed_pct(summary.token0_pnl, 2));
    let _ = writeln!(out, "  fees               {}", signed_pct(summary.fees_earned, 2));
    let _ = writeln!(out, "  hedge impact       {}", signed_pct(summary.hedge_pnl, 3));
    let _ = writeln!(out, "  avg efficiency     {:.1}x", summary.avg_efficiency);
    let _ = writeln!(
        out,
        "  positions in range {} / {}",
        summary.positions_in_range, summary.funded_positions
    );
    let _ = writeln!(out, "  capital allocated  {}%{}", totals.capital_sum, allocation_flag);

    out
}
