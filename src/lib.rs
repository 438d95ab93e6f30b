// clmm-core: concentrated liquidity position simulator.
// values a book of range positions after a hypothetical price move, hedge and holding period.
// all computation is deterministic and side effect free. price starts at 1.0.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: HalfRange, RangeBounds, PriceRatio, HedgeRatio, Quote, Benchmark
//   2.x  liquidity.rs: pool value, token0 exposure, capital efficiency
//   3.x  pnl.rs: pnl decomposition for one position, fee proxy
//   4.x  portfolio.rs: per-position rows, capital-weighted totals, summary
//   5.x  config.rs: scenario input, normalization, editing helpers, validation
//   6.x  simulation.rs: one full pass scenario → rows → totals
//   7.x  report.rs: terminal rendering

pub mod config;
pub mod liquidity;
pub mod pnl;
pub mod portfolio;
pub mod report;
pub mod simulation;
pub mod types;

// re exports for convenience
pub use config::*;
pub use liquidity::*;
pub use pnl::*;
pub use portfolio::*;
pub use simulation::*;
pub use types::*;
