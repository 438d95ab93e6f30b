// 5.0 config.rs: scenario input. the raw positions + global knobs as they come from a UI or a file.
// 5.1 normalize() is the only place raw input gets cleaned. everything downstream takes typed values.
// 5.2 editing helpers (resize, equal weight, reset). 5.3 validate() for the bounds the UI enforces.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::portfolio::{GlobalParams, Position};
use crate::simulation::{simulate, Simulation};
use crate::types::{Benchmark, HedgeRatio, Quote, MIN_HALF_RANGE_PCT};

pub const MAX_POSITIONS: usize = 12;
pub const MAX_HOLD_DAYS: f64 = 365.0;
pub const NEW_POSITION_HALF_RANGE_PCT: f64 = 1.0;

// A single position as entered. numeric fields tolerate junk: anything that isn't
// a number or numeric string deserializes as None and gets defaulted on normalize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PositionInput {
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub capital_pct: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub half_range_pct: Option<f64>,
}

impl PositionInput {
    pub fn new(name: impl Into<String>, capital_pct: f64, half_range_pct: f64) -> Self {
        Self {
            name: name.into(),
            capital_pct: Some(capital_pct),
            half_range_pct: Some(half_range_pct),
        }
    }

    // missing or non-finite capital counts as unfunded
    pub fn capital_or_zero(&self) -> f64 {
        self.capital_pct.filter(|c| c.is_finite()).unwrap_or(0.0)
    }
}

// Complete simulator input: positions plus the shared market assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scenario {
    pub positions: Vec<PositionInput>,
    // percent move from the starting price
    pub price_change_pct: f64,
    // percent of initial token0 exposure shorted
    pub hedge_pct: f64,
    pub hold_days: f64,
    // dollars across the whole book
    pub notional: Decimal,
    pub benchmark: Benchmark,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            positions: vec![
                PositionInput::new("Central", 50.0, 7.5),
                PositionInput::new("Coverage", 30.0, 11.1),
                PositionInput::new("Safe", 20.0, 15.0),
            ],
            price_change_pct: 0.0,
            hedge_pct: 65.0,
            hold_days: 1.0,
            notional: dec!(100000),
            benchmark: Benchmark::Hodl5050,
        }
    }
}

/// Cleaned, typed form of a [`Scenario`]. Produced only by [`Scenario::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub positions: Vec<Position>,
    pub globals: GlobalParams,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    // load and reject anything validate() refuses
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        Self::load(path)?.validated()
    }

    pub fn validated(self) -> Result<Self, ScenarioError> {
        self.validate()?;
        Ok(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // 5.1: never fails. junk collapses to the safest value the model accepts.
    pub fn normalize(&self) -> SimulationInput {
        let positions = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let name = if p.name.trim().is_empty() {
                    format!("Position {}", i + 1)
                } else {
                    p.name.clone()
                };
                let half_range = p.half_range_pct.unwrap_or(MIN_HALF_RANGE_PCT);
                Position::new(name, p.capital_or_zero(), half_range)
            })
            .collect();

        let price_change_pct = if self.price_change_pct.is_finite() {
            self.price_change_pct.max(-100.0)
        } else {
            0.0
        };

        let hold_days = if self.hold_days.is_finite() {
            self.hold_days.max(0.0)
        } else {
            0.0
        };

        SimulationInput {
            positions,
            globals: GlobalParams {
                price_change_pct,
                hedge: HedgeRatio::from_pct(self.hedge_pct),
                hold_days,
                notional: Quote::new(self.notional.max(Decimal::ZERO)),
                benchmark: self.benchmark,
            },
        }
    }

    pub fn simulate(&self) -> Simulation {
        simulate(&self.normalize())
    }

    pub fn capital_sum(&self) -> f64 {
        self.positions.iter().map(PositionInput::capital_or_zero).sum()
    }

    // 5.2: grow with empty ±1% positions or drop from the end
    pub fn set_position_count(&mut self, count: usize) {
        let start = self.positions.len();
        if count > start {
            self.positions.extend((start..count).map(|i| {
                PositionInput::new(format!("Position {}", i + 1), 0.0, NEW_POSITION_HALF_RANGE_PCT)
            }));
        } else {
            self.positions.truncate(count);
        }
    }

    pub fn equal_weight(&mut self) {
        if self.positions.is_empty() {
            return;
        }
        let share = 100.0 / self.positions.len() as f64;
        for p in &mut self.positions {
            p.capital_pct = Some(share);
        }
    }

    pub fn reset_price(&mut self) {
        self.price_change_pct = 0.0;
    }

    pub fn clear_hedge(&mut self) {
        self.hedge_pct = 0.0;
    }

    pub fn set_hold_days(&mut self, days: f64) {
        self.hold_days = days.max(0.0);
    }

    pub fn set_notional(&mut self, notional: Decimal) {
        self.notional = notional.max(Decimal::ZERO);
    }

    // 5.3: input limits a front end would enforce. the calculations never call this.
    // capital not adding to 100 is deliberately not an error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.positions.len();
        if count == 0 || count > MAX_POSITIONS {
            return Err(ConfigError::PositionCount { count });
        }

        for (index, p) in self.positions.iter().enumerate() {
            let capital = p.capital_or_zero();
            if !(0.0..=100.0).contains(&capital) {
                return Err(ConfigError::InvalidPosition {
                    index,
                    reason: format!("capital {capital}% outside 0-100"),
                });
            }
            match p.half_range_pct {
                Some(hr) if hr.is_finite() && hr > 0.0 => {}
                other => {
                    return Err(ConfigError::InvalidPosition {
                        index,
                        reason: format!("half range {other:?} must be a positive number"),
                    })
                }
            }
        }

        if !self.price_change_pct.is_finite() || self.price_change_pct < -100.0 {
            return Err(ConfigError::InvalidMarket {
                reason: format!("price change {}% below -100%", self.price_change_pct),
            });
        }

        if !(0.0..=100.0).contains(&self.hedge_pct) {
            return Err(ConfigError::InvalidMarket {
                reason: format!("hedge {}% outside 0-100", self.hedge_pct),
            });
        }

        if !(0.0..=MAX_HOLD_DAYS).contains(&self.hold_days) {
            return Err(ConfigError::InvalidHorizon {
                reason: format!("hold period {} days outside 0-{MAX_HOLD_DAYS}", self.hold_days),
            });
        }

        if self.notional < Decimal::ZERO {
            return Err(ConfigError::InvalidMarket {
                reason: format!("notional {} is negative", self.notional),
            });
        }

        Ok(())
    }
}

// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("need between 1 and {} positions, got {count}", MAX_POSITIONS)]
    PositionCount { count: usize },

    #[error("position {index}: {reason}")]
    InvalidPosition { index: usize, reason: String },

    #[error("invalid market parameters: {reason}")]
    InvalidMarket { reason: String },

    #[error("invalid holding period: {reason}")]
    InvalidHorizon { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Number(n) => Some(n),
        LooseNumber::Text(s) => s.trim().parse::<f64>().ok(),
        LooseNumber::Other(_) => None,
    };
    Ok(parsed.filter(|n| n.is_finite()))
}
