// =============================================================================
// Horizon → sampling window policy
// =============================================================================
//
// The sampling interval and rolling-window size scale inversely with the
// requested horizon: shorter horizons get finer candles and tighter windows.
// Indicator output is sensitive to these values, so the table is fixed:
//
//   horizon < 5 days   ->  2-hour candles, window 2
//   horizon < 10 days  ->  6-hour candles, window 2
//   horizon < 30 days  -> 12-hour candles, window 5
//   otherwise          ->   daily candles, window 10

use serde::{Deserialize, Serialize};

/// Candle sampling interval, carrying its CoinCap wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleInterval {
    TwoHour,
    SixHour,
    TwelveHour,
    Daily,
}

impl SampleInterval {
    /// Interval code used by the CoinCap history and candle endpoints.
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::TwoHour => "h2",
            Self::SixHour => "h6",
            Self::TwelveHour => "h12",
            Self::Daily => "d1",
        }
    }

    /// Interval length in milliseconds.
    pub fn millis(self) -> i64 {
        match self {
            Self::TwoHour => 2 * 60 * 60 * 1000,
            Self::SixHour => 6 * 60 * 60 * 1000,
            Self::TwelveHour => 12 * 60 * 60 * 1000,
            Self::Daily => 24 * 60 * 60 * 1000,
        }
    }
}

impl std::fmt::Display for SampleInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TwoHour => write!(f, "2-hour"),
            Self::SixHour => write!(f, "6-hour"),
            Self::TwelveHour => write!(f, "12-hour"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

/// Sampling parameters for one requested horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPolicy {
    pub interval: SampleInterval,
    /// Rolling-window size for SMA / Bollinger computations.
    pub window: usize,
}

/// Map a horizon in days to its fixed sampling policy.
pub fn policy_for_horizon(horizon_days: u32) -> WindowPolicy {
    if horizon_days < 5 {
        WindowPolicy {
            interval: SampleInterval::TwoHour,
            window: 2,
        }
    } else if horizon_days < 10 {
        WindowPolicy {
            interval: SampleInterval::SixHour,
            window: 2,
        }
    } else if horizon_days < 30 {
        WindowPolicy {
            interval: SampleInterval::TwelveHour,
            window: 5,
        }
    } else {
        WindowPolicy {
            interval: SampleInterval::Daily,
            window: 10,
        }
    }
}
