// =============================================================================
// Error taxonomy for the Candela market engine
// =============================================================================
//
// Every failure is local to a single asset/query and is surfaced immediately;
// nothing in this crate retries. Transport and decode failures come from the
// REST collaborators; the rest are produced by the series builder and the
// indicator functions.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The data source failed before producing a response.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The data source answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response arrived but could not be interpreted.
    #[error("malformed payload: {0}")]
    Decode(String),

    /// No usable data points for the requested window.
    #[error("empty series: {0}")]
    EmptySeries(String),

    /// Currency code unknown to the converter.
    #[error("unknown currency code {0:?}")]
    UnknownCurrency(String),

    /// An indicator denominator collapsed; the value is undefined for this
    /// window rather than zero or infinity.
    #[error("{indicator} is undefined for this window: {reason}")]
    DegenerateIndicator {
        indicator: &'static str,
        reason: String,
    },

    /// Configuration could not be loaded or stored.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for a [`Error::DegenerateIndicator`].
    pub fn degenerate(indicator: &'static str, reason: impl Into<String>) -> Self {
        Self::DegenerateIndicator {
            indicator,
            reason: reason.into(),
        }
    }

    /// True when the error marks an undefined (not failed) indicator value.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateIndicator { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_display_names_the_indicator() {
        let err = Error::degenerate("rsi", "window has no losing periods");
        assert_eq!(
            err.to_string(),
            "rsi is undefined for this window: window has no losing periods"
        );
        assert!(err.is_degenerate());
    }

    #[test]
    fn api_error_carries_status_and_body() {
        let err = Error::Api {
            endpoint: "assets/bitcoin".to_string(),
            status: 503,
            body: "maintenance".to_string(),
        };
        assert!(!err.is_degenerate());
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("assets/bitcoin"));
    }
}
