// =============================================================================
// Core data model shared across the Candela engine
// =============================================================================
//
// Raw records carry the epoch-millisecond timestamps the REST sources emit;
// the series builder converts them into `DateTime<Utc>` and enforces the
// strictly-increasing timestamp invariant. Every slice of points handled by
// this crate is ordered oldest-first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single spot-price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// One OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Raw spot-price record as returned by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Raw OHLCV record as returned by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A normalized spot-price series, denominated in a single currency.
///
/// Built once per query by the series builder and immutable afterwards.
/// Guaranteed non-empty with strictly increasing timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
    /// Lower-case currency code the prices are denominated in, e.g. "usd".
    pub currency: String,
    /// Display symbol for `currency`, e.g. "$".
    pub symbol: String,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Price values in series order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Time axis in series order.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// A normalized candle series, denominated in a single currency.
///
/// Same invariants as [`PriceSeries`]: non-empty, strictly increasing
/// timestamps, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleSeries {
    pub candles: Vec<Candle>,
    pub currency: String,
    pub symbol: String,
}

impl CandleSeries {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Closing prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Time axis in series order.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.candles.iter().map(|c| c.time).collect()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}
