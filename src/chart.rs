// =============================================================================
// Chart handoff payload
// =============================================================================
//
// Rendering is a collaborator concern; this module only flattens a series
// plus its sequence-valued indicators into the aligned, labelled tracks a
// renderer consumes. Scalar indicators have no time axis and stay out of
// the payload. NaN values mark undefined positions and must be skipped, not
// drawn at zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorReport;
use crate::types::{CandleSeries, PriceSeries};

/// One labelled track over the shared time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTrack {
    pub label: String,
    pub values: Vec<f64>,
}

/// Renderer handoff: a shared time axis, aligned tracks, and captions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// e.g. "EUR vs BTC".
    pub title: String,
    /// Display symbol for the y axis.
    pub y_label: String,
    pub times: Vec<DateTime<Utc>>,
    pub tracks: Vec<ChartTrack>,
}

impl ChartSpec {
    /// Flatten a candle series and its report: one track per OHLCV field
    /// plus one per sequence-valued indicator.
    pub fn from_candles(series: &CandleSeries, report: &IndicatorReport, counter: &str) -> Self {
        let mut tracks = vec![
            track("open", series.candles.iter().map(|c| c.open)),
            track("high", series.candles.iter().map(|c| c.high)),
            track("low", series.candles.iter().map(|c| c.low)),
            track("close", series.candles.iter().map(|c| c.close)),
            track("volume", series.candles.iter().map(|c| c.volume)),
        ];
        push_sequences(&mut tracks, report, series.len());

        Self {
            title: title_for(&series.currency, counter),
            y_label: series.symbol.clone(),
            times: series.times(),
            tracks,
        }
    }

    /// Flatten a spot-price series and its report.
    pub fn from_prices(series: &PriceSeries, report: &IndicatorReport, counter: &str) -> Self {
        let mut tracks = vec![track("price", series.points.iter().map(|p| p.price))];
        push_sequences(&mut tracks, report, series.len());

        Self {
            title: title_for(&series.currency, counter),
            y_label: series.symbol.clone(),
            times: series.times(),
            tracks,
        }
    }
}

fn track(label: &str, values: impl Iterator<Item = f64>) -> ChartTrack {
    ChartTrack {
        label: label.to_string(),
        values: values.collect(),
    }
}

/// Append every sequence-valued indicator whose length matches the time
/// axis. Misaligned sequences would shear the chart and are skipped.
fn push_sequences(tracks: &mut Vec<ChartTrack>, report: &IndicatorReport, len: usize) {
    for (name, value) in report {
        if let Some(seq) = value.as_sequence() {
            if seq.len() == len {
                tracks.push(ChartTrack {
                    label: name.clone(),
                    values: seq.to_vec(),
                });
            }
        }
    }
}

fn title_for(currency: &str, counter: &str) -> String {
    format!("{} vs {}", currency.to_uppercase(), counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorValue;
    use crate::types::{Candle, PricePoint};
    use chrono::TimeZone;

    fn candle_series() -> CandleSeries {
        CandleSeries {
            candles: (1..=4)
                .map(|i| Candle {
                    time: Utc.timestamp_millis_opt(1000 * i).unwrap(),
                    open: i as f64,
                    high: i as f64 + 0.5,
                    low: i as f64 - 0.5,
                    close: i as f64 + 0.25,
                    volume: 10.0 * i as f64,
                })
                .collect(),
            currency: "eur".to_string(),
            symbol: "€".to_string(),
        }
    }

    #[test]
    fn candle_spec_carries_ohlcv_and_indicator_tracks() {
        let series = candle_series();
        let mut report = IndicatorReport::new();
        report.insert(
            "sma".to_string(),
            IndicatorValue::Sequence(vec![f64::NAN, 1.5, 2.5, 3.5]),
        );
        report.insert("rsi".to_string(), IndicatorValue::Scalar(60.0));

        let spec = ChartSpec::from_candles(&series, &report, "BTC");
        assert_eq!(spec.title, "EUR vs BTC");
        assert_eq!(spec.y_label, "€");
        assert_eq!(spec.times.len(), 4);

        let labels: Vec<&str> = spec.tracks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["open", "high", "low", "close", "volume", "sma"]);
        // Scalars never become tracks.
        assert!(!labels.contains(&"rsi"));
        // Every track aligns to the time axis.
        assert!(spec.tracks.iter().all(|t| t.values.len() == 4));
    }

    #[test]
    fn misaligned_sequences_are_skipped() {
        let series = candle_series();
        let mut report = IndicatorReport::new();
        report.insert(
            "sma".to_string(),
            IndicatorValue::Sequence(vec![1.0, 2.0]),
        );
        let spec = ChartSpec::from_candles(&series, &report, "BTC");
        assert!(spec.tracks.iter().all(|t| t.label != "sma"));
    }

    #[test]
    fn price_spec_has_single_price_track() {
        let series = PriceSeries {
            points: vec![
                PricePoint {
                    time: Utc.timestamp_millis_opt(1000).unwrap(),
                    price: 5.0,
                },
                PricePoint {
                    time: Utc.timestamp_millis_opt(2000).unwrap(),
                    price: 6.0,
                },
            ],
            currency: "usd".to_string(),
            symbol: "$".to_string(),
        };
        let spec = ChartSpec::from_prices(&series, &IndicatorReport::new(), "ETH");
        assert_eq!(spec.title, "USD vs ETH");
        assert_eq!(spec.tracks.len(), 1);
        assert_eq!(spec.tracks[0].label, "price");
        assert_eq!(spec.tracks[0].values, vec![5.0, 6.0]);
    }
}
