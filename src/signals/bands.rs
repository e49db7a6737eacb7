// =============================================================================
// Bollinger-band threshold signals
// =============================================================================
//
// Mean-reversion polarity: a price below the lower band reads as buy, a
// price above the upper band reads as sell. Each axis is a two-state
// classification — the buy axis is Buy or Hold, the sell axis Sell or Hold —
// and both may read Hold at once. An undefined band (NaN, window not yet
// full) holds its axis.

use serde::{Deserialize, Serialize};

/// Classification of one observation on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// Independent buy/sell verdicts for the latest observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSignals {
    /// Buy or Hold.
    pub buy: SignalKind,
    /// Sell or Hold.
    pub sell: SignalKind,
}

/// Classify `price` against the Bollinger envelope.
pub fn evaluate_bands(price: f64, lower: f64, upper: f64) -> BandSignals {
    let buy = if lower.is_finite() && price < lower {
        SignalKind::Buy
    } else {
        SignalKind::Hold
    };
    let sell = if upper.is_finite() && price > upper {
        SignalKind::Sell
    } else {
        SignalKind::Hold
    };
    BandSignals { buy, sell }
}
