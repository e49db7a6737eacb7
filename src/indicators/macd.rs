// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
// MACD line = EMA(span 12) - EMA(span 26); signal = EMA(span 9) of the MACD
// line; histogram = MACD - signal. All three use the plain exponential
// recurrence seeded with the first value (geometric decay, no
// bias-correction normalization), so every sequence is fully defined from
// index 0 and aligned to the input.

use serde::{Deserialize, Serialize};

use super::ema::ema_span;

/// Standard MACD spans. Fixed by convention, not configurable.
pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// MACD line, signal line, and histogram, each aligned to the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD over `values` with the standard 12/26/9 spans.
pub fn macd(values: &[f64]) -> Macd {
    let fast = ema_span(values, FAST_SPAN);
    let slow = ema_span(values, SLOW_SPAN);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_span(&line, SIGNAL_SPAN);
    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Macd {
        macd: line,
        signal,
        histogram,
    }
}
