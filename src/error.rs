use thiserror::Error;

const BODY_SNIPPET_LEN: usize = 200;

/// Everything that can go wrong inside a radar workflow before it is
/// classified into an [`ErrorState`](crate::ErrorState).
#[derive(Debug, Error)]
pub enum RadarError {
    /// Connection refused, DNS failure, reset, or the body could not be read.
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// JSON decode error with precise path from serde_path_to_error.
    #[error("json decode error at `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_path_to_error::Error<serde_json::Error>,
        body_snippet: String,
    },

    #[error("No frames available in response")]
    NoFrames,

    #[error("No historical data found for the specified time range.")]
    NoHistoricalData,

    #[error("Invalid timespan configuration")]
    InvalidTimespan,

    #[error("timespan '{selector}' reaches outside the representable date range")]
    TimespanOutOfRange { selector: String },

    #[error("invalid {field} '{value}': {source}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl RadarError {
    pub(crate) fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RadarError::Timeout {
                url: url.to_string(),
                source: err,
            }
        } else {
            RadarError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }

    pub(crate) fn decode(
        source: serde_path_to_error::Error<serde_json::Error>,
        body: &str,
    ) -> Self {
        RadarError::Decode {
            path: source.path().to_string(),
            source,
            body_snippet: body.chars().take(BODY_SNIPPET_LEN).collect(),
        }
    }

    /// True when the service could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, RadarError::Transport { .. })
    }
}
