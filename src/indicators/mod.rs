// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators computed by the
// engine. Sequence-valued indicators (SMA, EMA, MACD, Bollinger Bands) stay
// aligned to the input length, with `f64::NAN` marking positions where the
// rolling window has insufficient history — consumers must treat NaN as
// undefined, never as zero. Scalar indicators (RSI, OBV, Sharpe) grade the
// whole window at once; where a denominator can collapse they return
// `Result` so degenerate windows surface as typed errors instead of NaN.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sharpe;
pub mod sma;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One computed indicator: a single scalar for the whole window, or a
/// sequence aligned to the series (NaN = undefined).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl IndicatorValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(_) => None,
            Self::Sequence(v) => Some(v),
        }
    }
}

/// Named indicator values computed over one series. A `BTreeMap` keeps the
/// serialized form deterministic.
pub type IndicatorReport = BTreeMap<String, IndicatorValue>;

/// Arithmetic mean. NaN for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 divisor). NaN for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
