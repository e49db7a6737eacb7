// =============================================================================
// On-Balance Volume (OBV) — scalar over the window
// =============================================================================
//
// Volume-weighted trend measure over the whole window: volume of candles
// whose `open - close` difference is positive, minus volume of candles whose
// difference is negative. Candles with a zero difference contribute to
// neither side.

use crate::types::Candle;

/// On-balance volume over the candle window. The empty window sums to zero.
pub fn obv(candles: &[Candle]) -> f64 {
    let mut total = 0.0_f64;
    for c in candles {
        let diff = c.open - c.close;
        if diff > 0.0 {
            total += c.volume;
        } else if diff < 0.0 {
            total -= c.volume;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(open: f64, close: f64, volume: f64) -> Candle {
        Candle {
            time: Utc.timestamp_millis_opt(0).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume,
        }
    }

    #[test]
    fn obv_scenario_with_zero_diff() {
        // diffs +, -, +, 0 with volumes 5, 3, 2, 9:
        // obv = 5 + 2 - 3 = 4; the zero-diff candle counts for neither side.
        let candles = vec![
            candle(11.0, 10.0, 5.0),
            candle(10.0, 12.0, 3.0),
            candle(13.0, 12.0, 2.0),
            candle(12.0, 12.0, 9.0),
        ];
        assert!((obv(&candles) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn obv_empty_window() {
        assert_eq!(obv(&[]), 0.0);
    }

    #[test]
    fn obv_all_down_candles_is_negative() {
        let candles = vec![candle(10.0, 11.0, 4.0), candle(11.0, 13.0, 6.0)];
        assert!((obv(&candles) + 10.0).abs() < 1e-12);
    }
}
