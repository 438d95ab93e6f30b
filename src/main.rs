//! Concentrated liquidity position simulator.
//!
//! Loads a scenario (or the built-in three-position book), applies any
//! command-line overrides, and prints the per-position decomposition plus
//! portfolio totals.
//!
//! ```bash
//! clmm-sim --price-change 8 --hedge 50 --days 14
//! clmm-sim --scenario book.json --format json
//! clmm-sim --sweep
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use clmm_core::report::{allocation_flag, render_table, signed_pct, signed_usd};
use clmm_core::{Benchmark, PortfolioTotals, Scenario};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// price moves walked by --sweep
const SWEEP_MOVES: [f64; 9] = [-30.0, -15.0, -10.0, -5.0, 0.0, 5.0, 10.0, 15.0, 30.0];

/// Simulate concentrated liquidity positions under a price move
#[derive(Parser, Debug)]
#[command(name = "clmm-sim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON scenario file. Defaults to the built-in Central/Coverage/Safe book
    #[arg(short, long, env = "CLMM_SCENARIO")]
    scenario: Option<PathBuf>,

    /// Percent price move from the starting price
    #[arg(long, allow_hyphen_values = true)]
    price_change: Option<f64>,

    /// Percent of initial token0 exposure to short
    #[arg(long)]
    hedge: Option<f64>,

    /// Holding period in days
    #[arg(long)]
    days: Option<f64>,

    /// Total dollars deployed across all positions
    #[arg(long)]
    notional: Option<Decimal>,

    /// Benchmark selector (hodl5050, hodlOptimal, hodlInitial)
    #[arg(long)]
    benchmark: Option<Benchmark>,

    /// Resize the book, adding empty ±1% positions or dropping from the end
    #[arg(long)]
    positions: Option<usize>,

    /// Split capital evenly across all positions
    #[arg(long)]
    equal_weight: bool,

    /// Remove the hedge
    #[arg(long)]
    no_hedge: bool,

    /// Set the price move back to zero
    #[arg(long)]
    reset_price: bool,

    /// Run the book across a fixed ladder of price moves
    #[arg(long)]
    sweep: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::load_validated(path)
            .with_context(|| format!("loading scenario from {}", path.display()))?,
        None => Scenario::default(),
    };
    apply_overrides(&mut scenario, &cli);
    let scenario = scenario.validated().context("scenario rejected")?;

    if cli.sweep {
        run_sweep(&scenario, cli.format)
    } else {
        run_once(&scenario, cli.format)
    }
}

fn apply_overrides(scenario: &mut Scenario, cli: &Cli) {
    if let Some(count) = cli.positions {
        scenario.set_position_count(count);
    }
    if let Some(pct) = cli.price_change {
        scenario.price_change_pct = pct;
    }
    if let Some(pct) = cli.hedge {
        scenario.hedge_pct = pct;
    }
    if let Some(days) = cli.days {
        scenario.set_hold_days(days);
    }
    if let Some(notional) = cli.notional {
        scenario.set_notional(notional);
    }
    if let Some(benchmark) = cli.benchmark {
        scenario.benchmark = benchmark;
    }
    if cli.equal_weight {
        scenario.equal_weight();
    }
    if cli.no_hedge {
        scenario.clear_hedge();
    }
    if cli.reset_price {
        scenario.reset_price();
    }
}

fn warn_on_allocation(totals: &PortfolioTotals) {
    if let Some(flag) = allocation_flag(totals) {
        tracing::warn!(capital_sum = totals.capital_sum, flag, "capital allocation does not sum to 100%");
    }
}

fn run_once(scenario: &Scenario, format: OutputFormat) -> Result<()> {
    let sim = scenario.simulate();
    warn_on_allocation(&sim.totals);
    match format {
        OutputFormat::Table => print!("{}", render_table(&sim)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sim)?),
    }
    Ok(())
}

fn run_sweep(scenario: &Scenario, format: OutputFormat) -> Result<()> {
    let runs: Vec<_> = SWEEP_MOVES
        .iter()
        .map(|&pct| {
            let moved = Scenario { price_change_pct: pct, ..scenario.clone() };
            (pct, moved.simulate())
        })
        .collect();
    if let Some((_, sim)) = runs.first() {
        warn_on_allocation(&sim.totals);
    }

    match format {
        OutputFormat::Json => {
            let sims: Vec<_> = runs.iter().map(|(_, sim)| sim).collect();
            println!("{}", serde_json::to_string_pretty(&sims)?);
        }
        OutputFormat::Table => {
            println!("{:>8}  {:>10}  {:>16}  {:>8}", "move", "net", "net ($)", "in range");
            for (pct, sim) in &runs {
                println!(
                    "{:>8}  {:>10}  {:>16}  {:>4} / {}",
                    signed_pct(*pct, 1),
                    signed_pct(sim.totals.total_net_pct, 3),
                    signed_usd(sim.totals.total_net_abs),
                    sim.summary.positions_in_range,
                    sim.summary.funded_positions,
                );
            }
        }
    }
    Ok(())
}
