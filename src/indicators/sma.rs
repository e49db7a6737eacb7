// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Sliding-sum implementation: one pass, O(1) per point. The output is
// aligned to the input; the first `window - 1` positions hold NaN.

/// Simple moving average of `values` over `window`.
///
/// The result has the same length as the input. Positions `0..window-1`
/// are NaN (window not yet full); every later position holds the arithmetic
/// mean of the trailing `window` values. A zero window, or a window longer
/// than the input, yields an all-NaN sequence.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return vec![f64::NAN; values.len()];
    }

    let mut out = vec![f64::NAN; window - 1];
    out.reserve(values.len() - window + 1);

    let mut sum: f64 = values[..window].iter().sum();
    out.push(sum / window as f64);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out.push(sum / window as f64);
    }
    out
}
