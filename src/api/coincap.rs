// =============================================================================
// CoinCap v2 REST Client
// =============================================================================
//
// Unauthenticated wrapper over https://api.coincap.io/v2/. CoinCap encodes
// every numeric field as a JSON string; the wire models keep the strings and
// parsing happens at the accessor layer, so a malformed number surfaces as a
// Decode error instead of a silent zero.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::horizon::SampleInterval;
use crate::types::{RawCandle, RawPricePoint};

use super::MarketDataSource;

/// Default CoinCap API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.coincap.io/v2";

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// CoinCap v2 REST client. Cheap to clone; the underlying connection pool
/// is shared.
#[derive(Debug, Clone)]
pub struct CoinCapClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinCapClient {
    pub fn new() -> Self {
        Self::custom(DEFAULT_BASE_URL, REQUEST_TIMEOUT)
    }

    /// Client against a non-default base URL (test servers, mirrors) with
    /// an explicit request timeout.
    pub fn custom(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// GET `{base_url}/{endpoint}`, check the status, unwrap the `data`
    /// envelope, and deserialize.
    async fn query<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "coincap request");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| Error::Decode(format!("{endpoint}: {e}")))?;
        Ok(envelope.data)
    }

    // -------------------------------------------------------------------------
    // Assets
    // -------------------------------------------------------------------------

    /// GET /assets — every asset CoinCap tracks, rank order.
    #[instrument(skip(self), name = "coincap::get_assets")]
    pub async fn get_assets(&self) -> Result<Vec<AssetInfo>> {
        self.query("assets").await
    }

    /// GET /assets/{id} — a single asset by its CoinCap id.
    #[instrument(skip(self), name = "coincap::get_asset")]
    pub async fn get_asset(&self, asset_id: &str) -> Result<AssetInfo> {
        self.query::<AssetInfo>(&format!("assets/{asset_id}")).await
    }

    /// GET /assets/{id}/history — USD spot prices sampled at `interval`
    /// over the `[start_ms, end_ms]` window.
    #[instrument(skip(self), name = "coincap::get_asset_history")]
    pub async fn get_asset_history(
        &self,
        asset_id: &str,
        interval: SampleInterval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawPricePoint>> {
        let rows: Vec<HistoryRow> = self
            .query(&format!(
                "assets/{asset_id}/history?interval={}&start={start_ms}&end={end_ms}",
                interval.wire_code()
            ))
            .await?;
        rows.iter().map(HistoryRow::to_raw).collect()
    }

    /// GET /assets/{id}/markets — where the asset trades; the candidate
    /// list for the exchange-fallback search.
    #[instrument(skip(self), name = "coincap::get_asset_markets")]
    pub async fn get_asset_markets(&self, asset_id: &str) -> Result<Vec<MarketInfo>> {
        self.query(&format!("assets/{asset_id}/markets")).await
    }

    // -------------------------------------------------------------------------
    // Rates
    // -------------------------------------------------------------------------

    /// GET /rates — fiat and crypto conversion rates against USD.
    #[instrument(skip(self), name = "coincap::get_rates")]
    pub async fn get_rates(&self) -> Result<Vec<RateInfo>> {
        self.query("rates").await
    }

    /// GET /rates/{id} — one conversion rate by asset id.
    #[instrument(skip(self), name = "coincap::get_asset_rate")]
    pub async fn get_asset_rate(&self, asset_id: &str) -> Result<RateInfo> {
        self.query::<RateInfo>(&format!("rates/{asset_id}")).await
    }

    // -------------------------------------------------------------------------
    // Exchanges & markets
    // -------------------------------------------------------------------------

    /// GET /exchanges — every exchange CoinCap tracks.
    #[instrument(skip(self), name = "coincap::get_exchanges")]
    pub async fn get_exchanges(&self) -> Result<Vec<ExchangeInfo>> {
        self.query("exchanges").await
    }

    /// GET /exchanges/{id} — one exchange.
    #[instrument(skip(self), name = "coincap::get_exchange")]
    pub async fn get_exchange(&self, exchange_id: &str) -> Result<ExchangeInfo> {
        self.query::<ExchangeInfo>(&format!("exchanges/{exchange_id}"))
            .await
    }

    /// GET /markets — all trading pairs across exchanges.
    #[instrument(skip(self), name = "coincap::get_markets")]
    pub async fn get_markets(&self) -> Result<Vec<MarketInfo>> {
        self.query("markets").await
    }

    // -------------------------------------------------------------------------
    // Candles
    // -------------------------------------------------------------------------

    /// GET /candles — OHLCV candles for a pair on one exchange over the
    /// `[start_ms, end_ms]` window.
    #[instrument(skip(self), name = "coincap::get_candles")]
    pub async fn get_candles(
        &self,
        exchange_id: &str,
        base_id: &str,
        quote_id: &str,
        interval: SampleInterval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawCandle>> {
        let rows: Vec<CandleRow> = self
            .query(&format!(
                "candles?exchange={exchange_id}&interval={}&baseId={base_id}&quoteId={quote_id}&start={start_ms}&end={end_ms}",
                interval.wire_code()
            ))
            .await?;
        rows.iter().map(CandleRow::to_raw).collect()
    }
}

impl Default for CoinCapClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MarketDataSource for CoinCapClient {
    async fn fetch_history(
        &self,
        asset_id: &str,
        interval: SampleInterval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawPricePoint>> {
        self.get_asset_history(asset_id, interval, start_ms, end_ms)
            .await
    }

    async fn fetch_candles(
        &self,
        exchange_id: &str,
        base_id: &str,
        quote_id: &str,
        interval: SampleInterval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawCandle>> {
        self.get_candles(exchange_id, base_id, quote_id, interval, start_ms, end_ms)
            .await
    }
}

// =============================================================================
// Wire models
// =============================================================================

/// Envelope every CoinCap response uses: `{"data": ..., "timestamp": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// One asset row from /assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub id: String,
    pub rank: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub volume_usd24_hr: Option<String>,
}

impl AssetInfo {
    /// Numeric rank; malformed ranks sort last.
    pub fn rank_value(&self) -> u32 {
        self.rank.parse().unwrap_or(u32::MAX)
    }

    /// Latest USD price, if present and well-formed.
    pub fn price(&self) -> Result<f64> {
        match &self.price_usd {
            Some(raw) => parse_f64("priceUsd", raw),
            None => Err(Error::Decode("asset has no priceUsd".to_string())),
        }
    }
}

/// One market row from /assets/{id}/markets or /markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub exchange_id: String,
    pub base_id: String,
    pub quote_id: String,
    #[serde(default)]
    pub base_symbol: Option<String>,
    #[serde(default)]
    pub quote_symbol: Option<String>,
    #[serde(default)]
    pub volume_usd24_hr: Option<String>,
}

impl MarketInfo {
    /// 24h USD volume for ranking; missing or malformed volumes count as 0.
    pub fn volume_usd(&self) -> f64 {
        self.volume_usd24_hr
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0)
    }
}

/// One rate row from /rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateInfo {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(rename = "type")]
    pub rate_type: String,
    pub rate_usd: String,
}

impl RateInfo {
    pub fn rate(&self) -> Result<f64> {
        parse_f64("rateUsd", &self.rate_usd)
    }
}

/// One exchange row from /exchanges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub exchange_id: String,
    pub name: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub percent_total_volume: Option<String>,
    #[serde(default)]
    pub volume_usd: Option<String>,
}

/// One history row: `{"priceUsd": "...", "time": 1533...}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRow {
    price_usd: String,
    time: i64,
}

impl HistoryRow {
    fn to_raw(&self) -> Result<RawPricePoint> {
        Ok(RawPricePoint {
            timestamp_ms: self.time,
            price: parse_f64("priceUsd", &self.price_usd)?,
        })
    }
}

/// One candle row: all OHLCV fields string-encoded, `period` in epoch ms.
#[derive(Debug, Deserialize)]
struct CandleRow {
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
    period: i64,
}

impl CandleRow {
    fn to_raw(&self) -> Result<RawCandle> {
        Ok(RawCandle {
            timestamp_ms: self.period,
            open: parse_f64("open", &self.open)?,
            high: parse_f64("high", &self.high)?,
            low: parse_f64("low", &self.low)?,
            close: parse_f64("close", &self.close)?,
            volume: parse_f64("volume", &self.volume)?,
        })
    }
}

fn parse_f64(field: &str, raw: &str) -> Result<f64> {
    raw.parse()
        .map_err(|_| Error::Decode(format!("{field}: not a number: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_row_parses() {
        let json = r#"{
            "id": "bitcoin",
            "rank": "1",
            "symbol": "BTC",
            "name": "Bitcoin",
            "supply": "17193925.0000000000000000",
            "priceUsd": "6929.8217756835584756",
            "volumeUsd24Hr": "2927959461.7611535045187706"
        }"#;
        let asset: AssetInfo = serde_json::from_str(json).unwrap();
        assert_eq!(asset.id, "bitcoin");
        assert_eq!(asset.rank_value(), 1);
        assert!((asset.price().unwrap() - 6929.8217756835584756).abs() < 1e-6);
    }

    #[test]
    fn market_row_parses_and_ranks() {
        let json = r#"{
            "exchangeId": "poloniex",
            "baseId": "ethereum",
            "quoteId": "bitcoin",
            "baseSymbol": "ETH",
            "quoteSymbol": "BTC",
            "volumeUsd24Hr": "205000.5",
            "percentExchangeVolume": "0.9"
        }"#;
        let market: MarketInfo = serde_json::from_str(json).unwrap();
        assert_eq!(market.exchange_id, "poloniex");
        assert!((market.volume_usd() - 205000.5).abs() < 1e-9);

        let sparse: MarketInfo = serde_json::from_str(
            r#"{"exchangeId": "x", "baseId": "b", "quoteId": "q"}"#,
        )
        .unwrap();
        assert_eq!(sparse.volume_usd(), 0.0);
    }

    #[test]
    fn history_row_converts_to_raw() {
        let json = r#"{"priceUsd": "6379.39", "time": 1530403200000, "date": "2018-07-01T00:00:00.000Z"}"#;
        let row: HistoryRow = serde_json::from_str(json).unwrap();
        let raw = row.to_raw().unwrap();
        assert_eq!(raw.timestamp_ms, 1_530_403_200_000);
        assert!((raw.price - 6379.39).abs() < 1e-9);
    }

    #[test]
    fn candle_row_converts_to_raw() {
        let json = r#"{
            "open": "0.07",
            "high": "0.073",
            "low": "0.069",
            "close": "0.072",
            "volume": "1200.5",
            "period": 1533br0
        }"#;
        // Malformed period must fail at the serde layer, not silently.
        assert!(serde_json::from_str::<CandleRow>(json).is_err());

        let good = r#"{
            "open": "0.07",
            "high": "0.073",
            "low": "0.069",
            "close": "0.072",
            "volume": "1200.5",
            "period": 1533312000000
        }"#;
        let row: CandleRow = serde_json::from_str(good).unwrap();
        let raw = row.to_raw().unwrap();
        assert_eq!(raw.timestamp_ms, 1_533_312_000_000);
        assert!((raw.open - 0.07).abs() < 1e-12);
        assert!((raw.volume - 1200.5).abs() < 1e-12);
    }

    #[test]
    fn rate_row_parses() {
        let json = r#"{
            "id": "british-pound-sterling",
            "symbol": "GBP",
            "currencySymbol": "£",
            "type": "fiat",
            "rateUsd": "1.30"
        }"#;
        let rate: RateInfo = serde_json::from_str(json).unwrap();
        assert_eq!(rate.rate_type, "fiat");
        assert!((rate.rate().unwrap() - 1.30).abs() < 1e-12);
    }

    #[test]
    fn exchange_row_parses() {
        let json = r#"{
            "exchangeId": "binance",
            "name": "Binance",
            "rank": "1",
            "percentTotalVolume": "29.0",
            "volumeUsd": "1204641801.67"
        }"#;
        let exchange: ExchangeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(exchange.exchange_id, "binance");
        assert_eq!(exchange.rank.as_deref(), Some("1"));
    }

    #[test]
    fn envelope_unwraps_data() {
        let json = r#"{"data": [{"id": "a", "rank": "2", "symbol": "A", "name": "A"}], "timestamp": 1}"#;
        let envelope: Envelope<Vec<AssetInfo>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].rank_value(), 2);
    }

    #[test]
    fn malformed_numeric_string_is_decode_error() {
        let err = parse_f64("priceUsd", "not-a-price").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().contains("priceUsd"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = CoinCapClient::custom("https://example.test/v2/", REQUEST_TIMEOUT);
        assert_eq!(client.base_url, "https://example.test/v2");
    }
}
