// =============================================================================
// Relative Strength Index (RSI) — whole-window form
// =============================================================================
//
// Unlike the rolling per-point RSI, this form grades the entire requested
// window with a single scalar:
//
//   diff per candle = open - close            (candle series)
//   diff per price  = price[i] - price[i-1]   (spot history)
//   average_gain    = mean of positive diffs
//   average_loss    = mean of |negative diffs|
//   RS              = average_gain / average_loss
//   RSI             = 100 - 100 / (1 + RS)
//
// Zero diffs belong to neither side. A window with no losing periods has an
// undefined RS (zero denominator) and is reported as a degenerate-indicator
// error, never as a silent 100 or infinity.

use crate::error::{Error, Result};
use crate::types::Candle;

/// RSI over a candle window, using per-candle `open - close` differences.
pub fn rsi_from_candles(candles: &[Candle]) -> Result<f64> {
    rsi_from_diffs(candles.iter().map(|c| c.open - c.close))
}

/// RSI over a spot-price window, using first differences between
/// consecutive prices.
pub fn rsi_from_prices(prices: &[f64]) -> Result<f64> {
    rsi_from_diffs(prices.windows(2).map(|w| w[1] - w[0]))
}

fn rsi_from_diffs(diffs: impl Iterator<Item = f64>) -> Result<f64> {
    let mut gain_sum = 0.0_f64;
    let mut gain_count = 0usize;
    let mut loss_sum = 0.0_f64;
    let mut loss_count = 0usize;
    let mut total = 0usize;

    for d in diffs {
        total += 1;
        if d > 0.0 {
            gain_sum += d;
            gain_count += 1;
        } else if d < 0.0 {
            loss_sum += -d;
            loss_count += 1;
        }
    }

    if total == 0 {
        return Err(Error::degenerate(
            "rsi",
            "not enough data to form price changes",
        ));
    }
    if loss_count == 0 {
        return Err(Error::degenerate("rsi", "window has no losing periods"));
    }

    // A window with no gaining periods is well-defined: RS = 0, RSI = 0.
    let average_gain = if gain_count == 0 {
        0.0
    } else {
        gain_sum / gain_count as f64
    };
    let average_loss = loss_sum / loss_count as f64;

    let relative_strength = average_gain / average_loss;
    Ok(100.0 - 100.0 / (1.0 + relative_strength))
}
