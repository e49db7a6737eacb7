// =============================================================================
// Candela — Crypto Market Indicator Engine
// =============================================================================
//
// Fetches spot prices and OHLCV candles from public REST APIs (CoinCap,
// CoinGecko, floatrates), normalizes them into single-currency time series,
// computes technical indicators (RSI, OBV, SMA, EMA, MACD, Bollinger Bands,
// Sharpe-style returns), and classifies the latest observation against its
// volatility envelope. Chart rendering stays external; this crate produces
// the aligned, labelled payload a renderer consumes.

pub mod analysis;
pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod horizon;
pub mod indicators;
pub mod series;
pub mod signals;
pub mod types;

// Re-export the surface most callers need (e.g. `use candela::MarketAnalyzer`).
pub use analysis::{candles_with_fallback, MarketAnalyzer, MarketReport};
pub use api::{
    CoinCapClient, CoinGeckoClient, CurrencyConverter, FxConverter, MarketDataSource,
};
pub use chart::{ChartSpec, ChartTrack};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use horizon::{policy_for_horizon, SampleInterval, WindowPolicy};
pub use indicators::{IndicatorReport, IndicatorValue};
pub use series::{SeriesBuilder, BASE_CURRENCY};
pub use signals::{evaluate_bands, BandSignals, SignalKind};
pub use types::{Candle, CandleSeries, PricePoint, PriceSeries, RawCandle, RawPricePoint};
