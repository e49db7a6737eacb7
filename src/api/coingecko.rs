// =============================================================================
// CoinGecko v3 REST Client
// =============================================================================
//
// Wrapper over the /coins/{id}/ohlc endpoint: candles quoted directly in a
// vs-currency, so no FX pass applies to them downstream. The endpoint
// carries no volume, so these candles report zero volume — OBV needs
// exchange-scoped candles from CoinCap instead.

use std::time::Duration;

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::RawCandle;

/// Default CoinGecko API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// CoinGecko v3 REST client.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::custom(DEFAULT_BASE_URL, REQUEST_TIMEOUT)
    }

    /// Client against a non-default base URL with an explicit timeout.
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

    /// GET /coins/{id}/ohlc — candles for `asset_id` quoted in
    /// `vs_currency` over the trailing `days` window.
    ///
    /// Rows arrive as `[time_ms, open, high, low, close]` tuples.
    #[instrument(skip(self), name = "coingecko::get_ohlc")]
    pub async fn get_ohlc(
        &self,
        asset_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<RawCandle>> {
        let endpoint = format!("coins/{asset_id}/ohlc?vs_currency={vs_currency}&days={days}");
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "coingecko request");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let rows: Vec<OhlcRow> = serde_json::from_str(&text)
            .map_err(|e| Error::Decode(format!("{endpoint}: {e}")))?;
        Ok(rows.iter().map(row_to_raw).collect())
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

/// `[time_ms, open, high, low, close]` wire tuple.
type OhlcRow = (i64, f64, f64, f64, f64);

fn row_to_raw(row: &OhlcRow) -> RawCandle {
    let (time_ms, open, high, low, close) = *row;
    RawCandle {
        timestamp_ms: time_ms,
        open,
        high,
        low,
        close,
        // The OHLC endpoint carries no volume.
        volume: 0.0,
    }
}
