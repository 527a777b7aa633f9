use crate::error::RadarError;
use crate::error_state::ErrorState;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Selector value that switches the historical window to explicit bounds.
pub const CUSTOM_TIMESPAN: &str = "custom";
const DEFAULT_TIMESPAN_HOURS: i64 = 1;

/// Error-reporting callback, invoked once per failed call.
#[derive(Clone)]
pub struct OnError(Arc<dyn Fn(ErrorState) + Send + Sync>);

impl OnError {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ErrorState) + Send + Sync + 'static,
    {
        OnError(Arc::new(f))
    }

    pub fn call(&self, error: ErrorState) {
        (self.0)(error)
    }
}

impl fmt::Debug for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnError(..)")
    }
}

/// Settings for one acquisition call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    pub service_url: String,
    pub suburb: String,
    pub state: String,
    /// `"custom"` or an hour count such as `"3h"`.
    pub timespan: Option<String>,
    pub custom_start_time: Option<String>,
    pub custom_end_time: Option<String>,
    #[serde(skip_serializing)]
    pub on_error: OnError,
}

impl FetchOptions {
    pub fn new<F>(service_url: &str, suburb: &str, state: &str, on_error: F) -> Self
    where
        F: Fn(ErrorState) + Send + Sync + 'static,
    {
        FetchOptions {
            service_url: service_url.to_string(),
            suburb: suburb.to_string(),
            state: state.to_string(),
            timespan: None,
            custom_start_time: None,
            custom_end_time: None,
            on_error: OnError::new(on_error),
        }
    }

    pub fn timespan(&self, timespan: &str) -> Self {
        Self {
            timespan: Some(timespan.to_string()),
            ..self.clone()
        }
    }

    pub fn custom_range(&self, start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            timespan: Some(CUSTOM_TIMESPAN.to_string()),
            custom_start_time: start.map(str::to_string),
            custom_end_time: end.map(str::to_string),
            ..self.clone()
        }
    }

    pub(crate) fn radar_url(&self) -> String {
        format!(
            "{}/api/radar/{}/{}",
            self.service_url, self.suburb, self.state
        )
    }
}

/// Absolute bounds for a historical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn resolve(options: &FetchOptions, now: DateTime<Utc>) -> Result<Self, RadarError> {
        let mut start = None;
        let mut end = now;

        match options.timespan.as_deref() {
            Some(CUSTOM_TIMESPAN) => {
                if let Some(value) = non_empty(&options.custom_start_time) {
                    start = Some(parse_timestamp("customStartTime", value)?);
                }
                if let Some(value) = non_empty(&options.custom_end_time) {
                    end = parse_timestamp("customEndTime", value)?;
                }
            }
            Some(selector) => {
                let hours = parse_timespan_hours(selector);
                let back = TimeDelta::try_hours(hours)
                    .and_then(|span| end.checked_sub_signed(span))
                    .ok_or_else(|| RadarError::TimespanOutOfRange {
                        selector: selector.to_string(),
                    })?;
                start = Some(back);
            }
            None => {}
        }

        let start = start.ok_or(RadarError::InvalidTimespan)?;
        Ok(TimeWindow { start, end })
    }

    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn end_iso(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Hour count of a selector like `"3h"`; anything unreadable or zero is one hour.
pub fn parse_timespan_hours(selector: &str) -> i64 {
    let trimmed = selector.trim().replacen('h', "", 1);
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();

    digits
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .unwrap_or(DEFAULT_TIMESPAN_HOURS)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// RFC 3339 first; offset-less `YYYY-MM-DDTHH:MM[:SS[.fff]]` and bare dates
/// are read as UTC.
fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, RadarError> {
    let value = value.trim();
    let rfc3339 = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    naive
        .map(|dt| dt.and_utc())
        .ok_or_else(|| RadarError::InvalidTimestamp {
            field,
            value: value.to_string(),
            source: rfc3339,
        })
}
