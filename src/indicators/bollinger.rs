// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Middle band = SMA(window); upper/lower = middle ± num_std · rolling sample
// standard deviation (n - 1 divisor). The convention is fixed to
// `upper >= lower` for every defined point. All three sequences align to the
// input with NaN where the window has insufficient history; a window below
// two points leaves the bands undefined (sample deviation needs n >= 2).

use serde::{Deserialize, Serialize};

use super::{sample_std, sma::sma};

/// Bollinger envelope, each band aligned to the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    /// Latest defined (upper, lower) pair, if the series has one.
    pub fn last_defined(&self) -> Option<(f64, f64)> {
        self.upper
            .iter()
            .zip(&self.lower)
            .rev()
            .find(|(u, l)| u.is_finite() && l.is_finite())
            .map(|(u, l)| (*u, *l))
    }
}

/// Compute Bollinger Bands over `values` with the given rolling `window`
/// and band width `num_std` (standard deviations).
pub fn bollinger(values: &[f64], window: usize, num_std: f64) -> BollingerBands {
    let middle = sma(values, window);
    let mut upper = vec![f64::NAN; values.len()];
    let mut lower = vec![f64::NAN; values.len()];

    if window >= 2 && values.len() >= window {
        for i in (window - 1)..values.len() {
            let slice = &values[i + 1 - window..=i];
            let sd = sample_std(slice);
            upper[i] = middle[i] + num_std * sd;
            lower[i] = middle[i] - num_std * sd;
        }
    }

    BollingerBands {
        middle,
        upper,
        lower,
    }
}
