// =============================================================================
// FX Converter — floatrates daily table + display symbols
// =============================================================================
//
// The whole USD-based rate table and the static symbol table are fetched
// once at construction; rate and symbol lookups afterwards are local and
// synchronous. USD itself never appears in the floatrates table (it is the
// base), so the series builder short-circuits the base currency before
// asking for a rate.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

use super::CurrencyConverter;

/// Daily USD-based FX table.
pub const DEFAULT_RATES_URL: &str = "http://www.floatrates.com/daily/usd.json";

/// Static currency metadata table (display symbols).
pub const DEFAULT_SYMBOLS_URL: &str = "https://gist.githubusercontent.com/Fluidbyte/2973986/raw/8bb35718d0c90fdacb388961c98b8d56abc392c9/Common-Currency.json";

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One floatrates row, keyed by lower-case currency code. The table
/// carries more fields (code, name, inverseRate, date); only the rate
/// matters here.
#[derive(Debug, Clone, Deserialize)]
struct RateRow {
    rate: f64,
}

/// One symbol-table row, keyed by upper-case currency code.
#[derive(Debug, Clone, Deserialize)]
struct SymbolRow {
    symbol: String,
}

/// Currency converter backed by the floatrates daily table.
#[derive(Debug, Clone)]
pub struct FxConverter {
    rates: HashMap<String, RateRow>,
    symbols: HashMap<String, SymbolRow>,
}

impl FxConverter {
    /// Fetch both tables from the default endpoints.
    pub async fn load() -> Result<Self> {
        Self::load_from(DEFAULT_RATES_URL, DEFAULT_SYMBOLS_URL, REQUEST_TIMEOUT).await
    }

    /// Fetch both tables from explicit endpoints.
    #[instrument(name = "fx::load")]
    pub async fn load_from(
        rates_url: &str,
        symbols_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        let rates = fetch_table::<RateRow>(&client, rates_url).await?;
        let symbols = fetch_table::<SymbolRow>(&client, symbols_url).await?;
        debug!(
            rates = rates.len(),
            symbols = symbols.len(),
            "fx tables loaded"
        );

        Ok(Self::from_raw_tables(rates, symbols))
    }

    /// Build a converter from already-materialized tables. Key casing is
    /// normalized here (rates lower-case, symbols upper-case).
    fn from_raw_tables(
        rates: HashMap<String, RateRow>,
        symbols: HashMap<String, SymbolRow>,
    ) -> Self {
        Self {
            rates: rates
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            symbols: symbols
                .into_iter()
                .map(|(k, v)| (k.to_uppercase(), v))
                .collect(),
        }
    }

    /// Build a converter from fixed `(code, rate)` and `(code, symbol)`
    /// pairs. Intended for deterministic setups and tests.
    pub fn from_tables<R, S>(rates: R, symbols: S) -> Self
    where
        R: IntoIterator<Item = (String, f64)>,
        S: IntoIterator<Item = (String, String)>,
    {
        Self::from_raw_tables(
            rates
                .into_iter()
                .map(|(code, rate)| (code, RateRow { rate }))
                .collect(),
            symbols
                .into_iter()
                .map(|(code, symbol)| (code, SymbolRow { symbol }))
                .collect(),
        )
    }
}

impl CurrencyConverter for FxConverter {
    fn rate(&self, currency: &str) -> Result<f64> {
        self.rates
            .get(&currency.to_lowercase())
            .map(|r| r.rate)
            .ok_or_else(|| Error::UnknownCurrency(currency.to_string()))
    }

    fn symbol(&self, currency: &str) -> Result<String> {
        self.symbols
            .get(&currency.to_uppercase())
            .map(|s| s.symbol.clone())
            .ok_or_else(|| Error::UnknownCurrency(currency.to_string()))
    }
}

async fn fetch_table<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<HashMap<String, T>> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            endpoint: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| Error::Decode(format!("{url}: {e}")))
}
