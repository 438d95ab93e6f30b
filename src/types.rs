// 1.0: all the primitives live here. range widths, price ratios, hedge fractions, dollars.
// each is a newtype so a raw percent can't be passed where a clamped value is expected.
// constructors never fail: bad input is floored or clamped to the nearest safe value.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

pub const MIN_HALF_RANGE_PCT: f64 = 0.1;
pub const MIN_LOWER_BOUND: f64 = 1e-6;

// 1.1: half width of the liquidity band in percent around the reference price 1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct HalfRange(f64);

impl HalfRange {
    pub fn new(pct: f64) -> Self {
        if !pct.is_finite() {
            return Self(MIN_HALF_RANGE_PCT);
        }
        Self(pct.max(MIN_HALF_RANGE_PCT))
    }

    pub fn pct(&self) -> f64 {
        self.0
    }

    // ±7.5% → [0.925, 1.075]
    pub fn bounds(&self) -> RangeBounds {
        RangeBounds {
            lower: (1.0 - self.0 / 100.0).max(MIN_LOWER_BOUND),
            upper: 1.0 + self.0 / 100.0,
        }
    }
}

impl fmt::Display for HalfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "±{:.1}%", self.0)
    }
}

// 1.2: price band in ratio space. lower is floored above zero so sqrt/div never hit 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub lower: f64,
    pub upper: f64,
}

impl RangeBounds {
    // inclusive on both ends
    pub fn contains(&self, ratio: PriceRatio) -> bool {
        ratio.value() >= self.lower && ratio.value() <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn sqrt_lower(&self) -> f64 {
        self.lower.sqrt()
    }

    pub fn sqrt_upper(&self) -> f64 {
        self.upper.sqrt()
    }
}

// 1.3: current price over starting price. P0 is always 1 so this is also the current price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PriceRatio(f64);

impl PriceRatio {
    pub const UNCHANGED: PriceRatio = PriceRatio(1.0);

    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::UNCHANGED;
        }
        Self(value.max(0.0))
    }

    // +30% → 1.3, -100% → 0
    pub fn from_change_pct(change_pct: f64) -> Self {
        Self::new((100.0 + change_pct) / 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn sqrt(&self) -> f64 {
        self.0.sqrt()
    }

    pub fn change_pct(&self) -> f64 {
        (self.0 - 1.0) * 100.0
    }
}

impl fmt::Display for PriceRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

// 1.4: share of the initial token0 exposure that is shorted. 0 = unhedged, 1 = fully hedged.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct HedgeRatio(f64);

impl HedgeRatio {
    pub const NONE: HedgeRatio = HedgeRatio(0.0);

    pub fn from_pct(pct: f64) -> Self {
        if pct.is_nan() {
            return Self::NONE;
        }
        Self((pct / 100.0).clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

// 1.5: reference the returns are compared against. accepted everywhere, branches nowhere yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Benchmark {
    #[default]
    Hodl5050,
    HodlOptimal,
    HodlInitial,
}

impl Benchmark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Benchmark::Hodl5050 => "hodl5050",
            Benchmark::HodlOptimal => "hodlOptimal",
            Benchmark::HodlInitial => "hodlInitial",
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown benchmark {0:?} (expected hodl5050, hodlOptimal or hodlInitial)")]
pub struct UnknownBenchmark(pub String);

impl FromStr for Benchmark {
    type Err = UnknownBenchmark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "hodl5050" => Ok(Benchmark::Hodl5050),
            "hodloptimal" => Ok(Benchmark::HodlOptimal),
            "hodlinitial" => Ok(Benchmark::HodlInitial),
            _ => Err(UnknownBenchmark(s.to_string())),
        }
    }
}

// 1.6: dollar amount. notional and absolute pnl use this, percentages stay f64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quote(Decimal);

impl Quote {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn add(&self, other: Quote) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    // scale by a float fraction. NaN gives zero, anything too large for Decimal saturates.
    pub fn scale(&self, fraction: f64) -> Self {
        if fraction.is_nan() || self.0.is_zero() {
            return Self::zero();
        }
        match Decimal::from_f64(fraction) {
            Some(f) => Self(self.0.saturating_mul(f)),
            None if fraction.abs() < 1.0 => Self::zero(),
            None => {
                if (fraction < 0.0) != self.is_negative() {
                    Self(Decimal::MIN)
                } else {
                    Self(Decimal::MAX)
                }
            }
        }
    }

    pub fn round_cents(&self) -> Self {
        Self(self.0.round_dp(2))
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for Quote {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| acc.add(q))
    }
}

impl<'a> Sum<&'a Quote> for Quote {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, q| acc.add(*q))
    }
}
