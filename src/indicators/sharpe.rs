// =============================================================================
// Sharpe-style annualized return
// =============================================================================
//
// Risk-adjusted return over the window:
//
//   cum[i]  = price[0] + ... + price[i]
//   ret[i]  = (cum[i] - cum[i-1]) / cum[i-1]
//   sharpe  = (mean(ret) - risk_free) / std(ret) * sqrt(252)
//
// std is the sample standard deviation. 252 is the trading-day annualization
// convention, fixed rather than configurable. A window whose return spread
// collapses to zero (or cannot be estimated) has no defined Sharpe value and
// surfaces as a degenerate-indicator error.

use crate::error::{Error, Result};

use super::{mean, sample_std};

/// Trading-day annualization constant.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Sharpe-style annualized excess return of `prices` against `risk_free`.
pub fn sharpe(prices: &[f64], risk_free: f64) -> Result<f64> {
    // Two returns are the minimum for a sample deviation, so three prices.
    if prices.len() < 3 {
        return Err(Error::degenerate(
            "sharpe",
            format!("need at least 3 prices, got {}", prices.len()),
        ));
    }

    let mut returns = Vec::with_capacity(prices.len() - 1);
    let mut cum = prices[0];
    for &p in &prices[1..] {
        let prev = cum;
        cum += p;
        if prev == 0.0 {
            return Err(Error::degenerate(
                "sharpe",
                "cumulative price sum passes through zero",
            ));
        }
        returns.push((cum - prev) / prev);
    }

    let spread = sample_std(&returns);
    if !(spread > 0.0) {
        return Err(Error::degenerate(
            "sharpe",
            "zero standard deviation across returns",
        ));
    }

    Ok((mean(&returns) - risk_free) / spread * TRADING_DAYS_PER_YEAR.sqrt())
}
