// =============================================================================
// REST API Collaborators
// =============================================================================
//
// Typed wrappers over the public market-data services this crate consumes:
//
//   - CoinCap v2   — assets, price history, markets, exchange-scoped candles
//   - CoinGecko v3 — OHLC candles quoted directly in a vs-currency
//   - floatrates   — daily USD FX table plus display symbols
//
// All endpoints are unauthenticated. Failures surface immediately as typed
// errors and are never retried here; callers that want a timeout beyond the
// per-client request timeout impose their own.

pub mod coincap;
pub mod coingecko;
pub mod rates;

use async_trait::async_trait;

use crate::error::Result;
use crate::horizon::SampleInterval;
use crate::types::{RawCandle, RawPricePoint};

pub use coincap::CoinCapClient;
pub use coingecko::CoinGeckoClient;
pub use rates::FxConverter;

/// A service that produces raw market time series.
///
/// Implemented by [`CoinCapClient`]; the trait exists so that series
/// assembly and the exchange-fallback search can run against scripted
/// sources in tests.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Spot-price history for `asset_id`, sampled at `interval`, between
    /// `start_ms` and `end_ms` (epoch milliseconds, inclusive window).
    async fn fetch_history(
        &self,
        asset_id: &str,
        interval: SampleInterval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawPricePoint>>;

    /// OHLCV candles for the `base_id`/`quote_id` pair on one exchange.
    async fn fetch_candles(
        &self,
        exchange_id: &str,
        base_id: &str,
        quote_id: &str,
        interval: SampleInterval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawCandle>>;
}

/// A service that quotes a multiplicative USD→currency rate plus a display
/// symbol. Lookups are local and synchronous once the converter is loaded.
pub trait CurrencyConverter: Send + Sync {
    /// Multiplicative rate from the USD base into `currency`.
    fn rate(&self, currency: &str) -> Result<f64>;

    /// Display symbol for `currency`, e.g. "€" for "eur".
    fn symbol(&self, currency: &str) -> Result<String>;
}
