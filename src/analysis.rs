// =============================================================================
// Market Analysis Orchestration
// =============================================================================
//
// Ties the REST collaborators, the series builder, and the indicator
// functions together: resolve an asset, fetch its series for an explicit
// `as_of` window, fall back across ranked exchanges when a candle set comes
// back empty, and grade the result.
//
// The window end is always the caller-supplied `as_of` timestamp — never an
// implicit "now" — so a given query is reproducible.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::api::coincap::MarketInfo;
use crate::api::{CoinCapClient, CoinGeckoClient, CurrencyConverter, FxConverter, MarketDataSource};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::horizon::{policy_for_horizon, SampleInterval, WindowPolicy};
use crate::indicators::{
    bollinger::bollinger, ema::ema_span, macd::macd, obv::obv, rsi::rsi_from_candles,
    rsi::rsi_from_prices, sharpe::sharpe, sma::sma, IndicatorReport, IndicatorValue,
};
use crate::series::SeriesBuilder;
use crate::signals::{evaluate_bands, BandSignals};
use crate::types::{CandleSeries, PriceSeries, RawCandle};

/// Everything computed for one asset and window in a single pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketReport {
    pub asset_id: String,
    /// Lower-case currency code the series is denominated in.
    pub currency: String,
    /// Display symbol for the currency.
    pub symbol: String,
    pub interval: SampleInterval,
    /// Rolling-window size the sequence indicators were computed with.
    pub window: usize,
    /// Named indicator values; degenerate indicators are omitted.
    pub indicators: IndicatorReport,
    /// Band verdicts for the latest observation.
    pub signals: BandSignals,
}

/// Analysis front-end owning the REST collaborators.
pub struct MarketAnalyzer {
    coincap: CoinCapClient,
    coingecko: CoinGeckoClient,
    converter: FxConverter,
    config: EngineConfig,
}

impl MarketAnalyzer {
    /// Build an analyzer from `config`, loading the FX tables up front.
    pub async fn from_config(config: EngineConfig) -> Result<Self> {
        let converter = FxConverter::load_from(
            &config.rates_url,
            &config.symbols_url,
            config.request_timeout(),
        )
        .await?;
        Ok(Self::with_parts(
            CoinCapClient::custom(&config.coincap_base_url, config.request_timeout()),
            CoinGeckoClient::custom(&config.coingecko_base_url, config.request_timeout()),
            converter,
            config,
        ))
    }

    /// Build an analyzer from already-constructed collaborators.
    pub fn with_parts(
        coincap: CoinCapClient,
        coingecko: CoinGeckoClient,
        converter: FxConverter,
        config: EngineConfig,
    ) -> Self {
        Self {
            coincap,
            coingecko,
            converter,
            config,
        }
    }

    /// Resolve a CoinCap asset id (e.g. "bitcoin") to its metadata.
    pub async fn resolve_asset(&self, asset_id: &str) -> Result<crate::api::coincap::AssetInfo> {
        self.coincap.get_asset(asset_id).await
    }

    /// Spot-price history for `asset_id` over the `horizon_days` window
    /// ending at `as_of`, converted into the configured currency.
    #[instrument(skip(self), name = "analyzer::price_history")]
    pub async fn price_history(
        &self,
        asset_id: &str,
        horizon_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let policy = policy_for_horizon(horizon_days);
        let (start_ms, end_ms) = window_bounds(horizon_days, as_of);

        let raw = self
            .coincap
            .fetch_history(asset_id, policy.interval, start_ms, end_ms)
            .await?;
        if raw.is_empty() {
            return Err(Error::EmptySeries(format!(
                "no price history for {asset_id}"
            )));
        }

        SeriesBuilder::new(&self.converter).price_series(&raw, &self.config.currency)
    }

    /// OHLCV candles for the `asset_id`/`quote_id` pair over the
    /// `horizon_days` window ending at `as_of`, searching the asset's
    /// markets in rank order until one exchange has data.
    #[instrument(skip(self), name = "analyzer::candle_series")]
    pub async fn candle_series(
        &self,
        asset_id: &str,
        quote_id: &str,
        horizon_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<CandleSeries> {
        let policy = policy_for_horizon(horizon_days);
        let (start_ms, end_ms) = window_bounds(horizon_days, as_of);

        let mut markets = self.coincap.get_asset_markets(asset_id).await?;
        markets.retain(|m| m.quote_id == quote_id);
        rank_candidates(&mut markets);

        let raw = candles_with_fallback(
            &self.coincap,
            &markets,
            policy.interval,
            start_ms,
            end_ms,
        )
        .await?;

        SeriesBuilder::new(&self.converter).candle_series(&raw, &self.config.currency)
    }

    /// OHLC candles from CoinGecko, already quoted in the configured
    /// currency — no FX pass is applied.
    #[instrument(skip(self), name = "analyzer::ohlc_series")]
    pub async fn ohlc_series(&self, asset_id: &str, days: u32) -> Result<CandleSeries> {
        let raw = self
            .coingecko
            .get_ohlc(asset_id, &self.config.currency, days)
            .await?;
        if raw.is_empty() {
            return Err(Error::EmptySeries(format!("no OHLC data for {asset_id}")));
        }

        // The candles already carry the target currency; only the display
        // symbol comes from the converter.
        let symbol = self.converter.symbol(&self.config.currency)?;
        let mut series =
            SeriesBuilder::new(&NoConversion(&symbol)).candle_series(&raw, "usd")?;
        series.currency = self.config.currency.to_lowercase();
        Ok(series)
    }

    /// Fetch candles and grade them: every indicator plus the band verdict
    /// for the latest close.
    #[instrument(skip(self), name = "analyzer::analyze_candles")]
    pub async fn analyze_candles(
        &self,
        asset_id: &str,
        quote_id: &str,
        horizon_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<MarketReport> {
        let series = self
            .candle_series(asset_id, quote_id, horizon_days, as_of)
            .await?;
        let policy = policy_for_horizon(horizon_days);
        let (indicators, signals) = report_for_candles(
            &series,
            policy,
            self.config.risk_free_rate,
            self.config.bollinger_num_std,
        );

        info!(
            asset_id,
            candles = series.len(),
            interval = %policy.interval,
            buy = %signals.buy,
            sell = %signals.sell,
            "candle analysis complete"
        );

        Ok(MarketReport {
            asset_id: asset_id.to_string(),
            currency: series.currency.clone(),
            symbol: series.symbol.clone(),
            interval: policy.interval,
            window: policy.window,
            indicators,
            signals,
        })
    }

    /// Fetch spot history and grade it (no volume-based indicators).
    #[instrument(skip(self), name = "analyzer::analyze_prices")]
    pub async fn analyze_prices(
        &self,
        asset_id: &str,
        horizon_days: u32,
        as_of: DateTime<Utc>,
    ) -> Result<MarketReport> {
        let series = self.price_history(asset_id, horizon_days, as_of).await?;
        let policy = policy_for_horizon(horizon_days);
        let (indicators, signals) = report_for_prices(
            &series,
            policy,
            self.config.risk_free_rate,
            self.config.bollinger_num_std,
        );

        Ok(MarketReport {
            asset_id: asset_id.to_string(),
            currency: series.currency.clone(),
            symbol: series.symbol.clone(),
            interval: policy.interval,
            window: policy.window,
            indicators,
            signals,
        })
    }
}

/// Inclusive `[start_ms, end_ms]` bounds for a horizon ending at `as_of`.
fn window_bounds(horizon_days: u32, as_of: DateTime<Utc>) -> (i64, i64) {
    let end = as_of.timestamp_millis();
    let start = (as_of - Duration::days(i64::from(horizon_days))).timestamp_millis();
    (start, end)
}

/// Order fallback candidates by descending 24h volume (ascending rank).
fn rank_candidates(markets: &mut [MarketInfo]) {
    markets.sort_by(|a, b| {
        b.volume_usd()
            .partial_cmp(&a.volume_usd())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Try each candidate exchange in order until one returns a non-empty
/// candle set. Bounded by the candidate list; an exhausted list fails with
/// `EmptySeries`. Transport failures abort the search immediately — only an
/// empty result moves on to the next candidate.
pub async fn candles_with_fallback(
    source: &dyn MarketDataSource,
    candidates: &[MarketInfo],
    interval: SampleInterval,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<RawCandle>> {
    for market in candidates {
        let candles = source
            .fetch_candles(
                &market.exchange_id,
                &market.base_id,
                &market.quote_id,
                interval,
                start_ms,
                end_ms,
            )
            .await?;
        if !candles.is_empty() {
            debug!(
                exchange = %market.exchange_id,
                candles = candles.len(),
                "candle fallback settled"
            );
            return Ok(candles);
        }
        debug!(exchange = %market.exchange_id, "empty candle set, trying next exchange");
    }

    Err(Error::EmptySeries(format!(
        "all {} candidate exchanges returned empty candle sets",
        candidates.len()
    )))
}

/// Compute every candle-applicable indicator plus the band verdict.
pub fn report_for_candles(
    series: &CandleSeries,
    policy: WindowPolicy,
    risk_free: f64,
    num_std: f64,
) -> (IndicatorReport, BandSignals) {
    let closes = series.closes();
    let mut report = sequence_indicators(&closes, policy.window, num_std);

    match rsi_from_candles(&series.candles) {
        Ok(v) => {
            report.insert("rsi".to_string(), IndicatorValue::Scalar(v));
        }
        Err(e) => warn!(%e, "rsi omitted from report"),
    }
    report.insert(
        "obv".to_string(),
        IndicatorValue::Scalar(obv(&series.candles)),
    );
    match sharpe(&closes, risk_free) {
        Ok(v) => {
            report.insert("sharpe".to_string(), IndicatorValue::Scalar(v));
        }
        Err(e) => warn!(%e, "sharpe omitted from report"),
    }

    let signals = latest_band_signals(&report, &closes);
    (report, signals)
}

/// Compute every price-applicable indicator plus the band verdict. OBV
/// needs per-candle volume and is not part of a spot-price report.
pub fn report_for_prices(
    series: &PriceSeries,
    policy: WindowPolicy,
    risk_free: f64,
    num_std: f64,
) -> (IndicatorReport, BandSignals) {
    let prices = series.prices();
    let mut report = sequence_indicators(&prices, policy.window, num_std);

    match rsi_from_prices(&prices) {
        Ok(v) => {
            report.insert("rsi".to_string(), IndicatorValue::Scalar(v));
        }
        Err(e) => warn!(%e, "rsi omitted from report"),
    }
    match sharpe(&prices, risk_free) {
        Ok(v) => {
            report.insert("sharpe".to_string(), IndicatorValue::Scalar(v));
        }
        Err(e) => warn!(%e, "sharpe omitted from report"),
    }

    let signals = latest_band_signals(&report, &prices);
    (report, signals)
}

/// The sequence-valued block shared by both report flavors.
fn sequence_indicators(values: &[f64], window: usize, num_std: f64) -> IndicatorReport {
    let mut report = IndicatorReport::new();

    report.insert(
        "sma".to_string(),
        IndicatorValue::Sequence(sma(values, window)),
    );
    report.insert(
        "ema".to_string(),
        IndicatorValue::Sequence(ema_span(values, window)),
    );

    let m = macd(values);
    report.insert("macd".to_string(), IndicatorValue::Sequence(m.macd));
    report.insert(
        "macd_signal".to_string(),
        IndicatorValue::Sequence(m.signal),
    );
    report.insert(
        "macd_histogram".to_string(),
        IndicatorValue::Sequence(m.histogram),
    );

    let bands = bollinger(values, window, num_std);
    report.insert(
        "upper_band".to_string(),
        IndicatorValue::Sequence(bands.upper),
    );
    report.insert(
        "lower_band".to_string(),
        IndicatorValue::Sequence(bands.lower),
    );

    report
}

/// Band verdict for the last value against the last band entries.
fn latest_band_signals(report: &IndicatorReport, values: &[f64]) -> BandSignals {
    let last = values.last().copied().unwrap_or(f64::NAN);
    let band_at = |name: &str| -> f64 {
        report
            .get(name)
            .and_then(|v| v.as_sequence())
            .and_then(|seq| seq.last().copied())
            .unwrap_or(f64::NAN)
    };
    evaluate_bands(last, band_at("lower_band"), band_at("upper_band"))
}

/// Converter stand-in for series that are already quoted in the target
/// currency: rate 1.0, fixed display symbol.
struct NoConversion<'a>(&'a str);

impl CurrencyConverter for NoConversion<'_> {
    fn rate(&self, _currency: &str) -> Result<f64> {
        Ok(1.0)
    }

    fn symbol(&self, _currency: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}
