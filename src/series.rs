// =============================================================================
// Series Builder — raw records to normalized, single-currency series
// =============================================================================
//
// Turns the raw timestamped records a data source hands back into the
// series the indicator functions consume:
//
//   - epoch-millisecond timestamps become `DateTime<Utc>`
//   - source order is trusted, never re-sorted; a later record with the
//     same timestamp overwrites the earlier one, and a record whose
//     timestamp goes backwards is dropped
//   - when the target currency differs from the USD base, every
//     price-bearing field (price, open, high, low, close — never volume)
//     is scaled by the converter's rate
//
// An input that yields zero usable records fails with `EmptySeries`.

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::api::CurrencyConverter;
use crate::error::{Error, Result};
use crate::types::{Candle, CandleSeries, PricePoint, PriceSeries, RawCandle, RawPricePoint};

/// Currency every upstream USD-denominated source quotes in.
pub const BASE_CURRENCY: &str = "usd";

/// Builds normalized series from raw source records.
pub struct SeriesBuilder<'a> {
    converter: &'a dyn CurrencyConverter,
}

impl<'a> SeriesBuilder<'a> {
    pub fn new(converter: &'a dyn CurrencyConverter) -> Self {
        Self { converter }
    }

    /// Normalize a raw spot-price sequence into `currency`.
    pub fn price_series(&self, raw: &[RawPricePoint], currency: &str) -> Result<PriceSeries> {
        let (rate, symbol, code) = self.conversion(currency)?;

        let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());
        for r in raw {
            let time = datetime_from_ms(r.timestamp_ms)?;
            if !accept_timestamp(&mut points, time, |p: &PricePoint| p.time) {
                continue;
            }
            points.push(PricePoint {
                time,
                price: r.price * rate,
            });
        }

        if points.is_empty() {
            return Err(Error::EmptySeries("no usable price records".to_string()));
        }
        Ok(PriceSeries {
            points,
            currency: code,
            symbol,
        })
    }

    /// Normalize a raw candle sequence into `currency`.
    pub fn candle_series(&self, raw: &[RawCandle], currency: &str) -> Result<CandleSeries> {
        let (rate, symbol, code) = self.conversion(currency)?;

        let mut candles: Vec<Candle> = Vec::with_capacity(raw.len());
        for r in raw {
            let time = datetime_from_ms(r.timestamp_ms)?;
            if !accept_timestamp(&mut candles, time, |c: &Candle| c.time) {
                continue;
            }
            candles.push(Candle {
                time,
                open: r.open * rate,
                high: r.high * rate,
                low: r.low * rate,
                close: r.close * rate,
                // Volume is denominated in the base asset, not the quote
                // currency, and is never converted.
                volume: r.volume,
            });
        }

        if candles.is_empty() {
            return Err(Error::EmptySeries("no usable candle records".to_string()));
        }
        Ok(CandleSeries {
            candles,
            currency: code,
            symbol,
        })
    }

    /// Resolve the conversion rate and display symbol for `currency`.
    /// The base currency bypasses the rate table entirely.
    fn conversion(&self, currency: &str) -> Result<(f64, String, String)> {
        let code = currency.to_lowercase();
        let rate = if code == BASE_CURRENCY {
            1.0
        } else {
            self.converter.rate(&code)?
        };
        let symbol = self.converter.symbol(&code)?;
        Ok((rate, symbol, code))
    }
}

/// Apply the timestamp policy against the points accepted so far:
/// equal timestamp evicts the earlier record (last wins), a backwards
/// timestamp is rejected. Returns whether the new record may be appended.
fn accept_timestamp<T>(
    accepted: &mut Vec<T>,
    time: DateTime<Utc>,
    time_of: impl Fn(&T) -> DateTime<Utc>,
) -> bool {
    match accepted.last().map(|last| time_of(last).cmp(&time)) {
        Some(std::cmp::Ordering::Equal) => {
            // Last wins: evict the earlier record with the same timestamp.
            accepted.pop();
            true
        }
        Some(std::cmp::Ordering::Greater) => {
            debug!(%time, "dropping out-of-order record");
            false
        }
        _ => true,
    }
}

fn datetime_from_ms(ms: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| Error::Decode(format!("timestamp out of range: {ms}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FxConverter;

    fn converter() -> FxConverter {
        FxConverter::from_tables(
            [("eur".to_string(), 2.0), ("inr".to_string(), 88.0)],
            [
                ("USD".to_string(), "$".to_string()),
                ("EUR".to_string(), "€".to_string()),
                ("INR".to_string(), "₹".to_string()),
            ],
        )
    }

    fn raw_prices(entries: &[(i64, f64)]) -> Vec<RawPricePoint> {
        entries
            .iter()
            .map(|&(timestamp_ms, price)| RawPricePoint {
                timestamp_ms,
                price,
            })
            .collect()
    }

    #[test]
    fn base_currency_passes_through() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let series = builder
            .price_series(&raw_prices(&[(1000, 5.0), (2000, 6.0)]), "usd")
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.prices(), vec![5.0, 6.0]);
        assert_eq!(series.currency, "usd");
        assert_eq!(series.symbol, "$");
    }

    #[test]
    fn conversion_scales_prices() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let series = builder
            .price_series(&raw_prices(&[(1000, 5.0), (2000, 6.0)]), "EUR")
            .unwrap();
        assert_eq!(series.prices(), vec![10.0, 12.0]);
        assert_eq!(series.currency, "eur");
        assert_eq!(series.symbol, "€");
    }

    #[test]
    fn conversion_round_trip_recovers_prices() {
        let rate = 88.17;
        let fx_there = FxConverter::from_tables(
            [("inr".to_string(), rate)],
            [("INR".to_string(), "₹".to_string())],
        );
        let fx_back = FxConverter::from_tables(
            [("inr".to_string(), 1.0 / rate)],
            [("INR".to_string(), "₹".to_string())],
        );

        let original = raw_prices(&[(1000, 123.456), (2000, 789.012)]);
        let there = SeriesBuilder::new(&fx_there)
            .price_series(&original, "inr")
            .unwrap();
        let back_raw: Vec<RawPricePoint> = there
            .points
            .iter()
            .map(|p| RawPricePoint {
                timestamp_ms: p.time.timestamp_millis(),
                price: p.price,
            })
            .collect();
        let back = SeriesBuilder::new(&fx_back)
            .price_series(&back_raw, "inr")
            .unwrap();

        for (a, b) in back.prices().iter().zip([123.456, 789.012]) {
            assert!((a - b).abs() / b < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn candle_conversion_spares_volume() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let raw = [RawCandle {
            timestamp_ms: 1000,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 100.0,
        }];
        let series = builder.candle_series(&raw, "eur").unwrap();
        let c = &series.candles[0];
        assert_eq!(c.open, 2.0);
        assert_eq!(c.high, 4.0);
        assert_eq!(c.low, 1.0);
        assert_eq!(c.close, 3.0);
        assert_eq!(c.volume, 100.0);
    }

    #[test]
    fn unknown_currency_fails() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let err = builder
            .price_series(&raw_prices(&[(1000, 5.0)]), "xyz")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCurrency(_)));
    }

    #[test]
    fn empty_input_fails() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let err = builder.price_series(&[], "usd").unwrap_err();
        assert!(matches!(err, Error::EmptySeries(_)));
        let err = builder.candle_series(&[], "usd").unwrap_err();
        assert!(matches!(err, Error::EmptySeries(_)));
    }

    #[test]
    fn duplicate_timestamp_last_wins() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let series = builder
            .price_series(
                &raw_prices(&[(1000, 5.0), (2000, 6.0), (2000, 7.0)]),
                "usd",
            )
            .unwrap();
        assert_eq!(series.prices(), vec![5.0, 7.0]);
    }

    #[test]
    fn backwards_timestamp_is_dropped() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let series = builder
            .price_series(
                &raw_prices(&[(1000, 5.0), (3000, 6.0), (2000, 9.0), (4000, 7.0)]),
                "usd",
            )
            .unwrap();
        assert_eq!(series.prices(), vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn timestamps_strictly_increasing_after_normalization() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let series = builder
            .price_series(
                &raw_prices(&[
                    (1000, 1.0),
                    (1000, 2.0),
                    (500, 3.0),
                    (2000, 4.0),
                    (2000, 5.0),
                ]),
                "usd",
            )
            .unwrap();
        let times = series.times();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(series.prices(), vec![2.0, 5.0]);
    }

    #[test]
    fn epoch_ms_becomes_utc_datetime() {
        let fx = converter();
        let builder = SeriesBuilder::new(&fx);
        let series = builder
            .price_series(&raw_prices(&[(1_530_403_200_000, 1.0)]), "usd")
            .unwrap();
        assert_eq!(
            series.points[0].time,
            Utc.with_ymd_and_hms(2018, 7, 1, 0, 0, 0).unwrap()
        );
    }
}
