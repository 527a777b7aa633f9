use crate::client::Client;
use crate::error::RadarError;
use crate::error_handler::{
    classify_fetch_error, parse_api_error, parse_error_response, structured_retry_after,
    ApiErrorOptions,
};
use crate::error_state::{ErrorKind, ErrorState, RetryAction, Workflow};
use crate::httpc::{decode_value, Httpc};
use crate::models::{RadarMetadata, RadarResponse, TimeSeriesResponse};
use crate::normalize;
use crate::options::{FetchOptions, TimeWindow};
use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, warn};
use reqwest::Response;
use serde_json::Value;

const DEFAULT_RETRY_AFTER: u64 = 30;
const LEGACY_ERROR_MESSAGE: &str = "Service returned an error";

/// A workflow either produced a response or already knows how to describe
/// its failure; anything else comes back as a [`RadarError`].
enum Outcome {
    Ready(RadarResponse),
    Failed(ErrorState),
}

impl Client {
    /// Latest frames from `/api/radar/{suburb}/{state}`.
    ///
    /// Returns `None` iff `options.on_error` was called, exactly once.
    pub async fn fetch_latest_frames(&self, options: &FetchOptions) -> Option<RadarResponse> {
        let outcome = self.try_fetch_latest(options).await;
        self.settle(outcome, options, Workflow::LatestFrames)
    }

    /// Frames for the window selected by `options.timespan`, merged from the
    /// timeseries cache folders and decorated with best-effort metadata.
    ///
    /// Returns `None` iff `options.on_error` was called, exactly once.
    pub async fn fetch_historical_frames(
        &self,
        options: &FetchOptions,
    ) -> Option<RadarResponse> {
        let outcome = self.try_fetch_historical(options).await;
        self.settle(outcome, options, Workflow::HistoricalFrames)
    }

    async fn try_fetch_latest(&self, options: &FetchOptions) -> Result<Outcome, RadarError> {
        let url = options.radar_url();
        let response = Httpc::get(self, &url, None).await?;

        if !response.status().is_success() {
            return Ok(Outcome::Failed(
                self.api_error(response, options, Workflow::LatestFrames)
                    .await,
            ));
        }

        let data: Value = Httpc::read_json(response).await?;

        if let Some(error) = data.get("error").filter(|e| is_truthy(e)) {
            return Ok(Outcome::Failed(ErrorState {
                message: error
                    .as_str()
                    .unwrap_or(LEGACY_ERROR_MESSAGE)
                    .to_string(),
                kind: ErrorKind::Cache,
                retryable: true,
                retry_action: Some(RetryAction::new(self, Workflow::LatestFrames, options)),
                retry_after: Some(structured_retry_after(&data).unwrap_or(DEFAULT_RETRY_AFTER)),
            }));
        }

        let has_frames = data
            .get("frames")
            .and_then(Value::as_array)
            .is_some_and(|frames| !frames.is_empty());
        if !has_frames {
            return Err(RadarError::NoFrames);
        }

        let mut body: RadarResponse = decode_value(data)?;
        body.frames = normalize::resolve_frames(body.frames, &options.service_url);
        Ok(Outcome::Ready(body))
    }

    async fn try_fetch_historical(&self, options: &FetchOptions) -> Result<Outcome, RadarError> {
        let window = TimeWindow::resolve(options, Utc::now())?;

        let url = format!("{}/timeseries", options.radar_url());
        let query = vec![("startTime", window.start_iso()), ("endTime", window.end_iso())];
        let response = Httpc::get(self, &url, Some(query)).await?;

        if !response.status().is_success() {
            return Ok(Outcome::Failed(
                self.api_error(response, options, Workflow::HistoricalFrames)
                    .await,
            ));
        }

        let data: TimeSeriesResponse = Httpc::read_json(response).await?;
        let folders = data
            .cache_folders
            .filter(|folders| !folders.is_empty())
            .ok_or(RadarError::NoHistoricalData)?;

        let newest_observation = folders.last().and_then(|folder| folder.observation_time);
        let frames = normalize::flatten_cache_folders(folders, &options.service_url);

        let metadata = match self.fetch_metadata(options).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Could not fetch metadata: {:#}", e);
                RadarMetadata::default()
            }
        };

        Ok(Outcome::Ready(normalize::synthesize_response(
            frames,
            newest_observation,
            metadata,
            window.end,
        )))
    }

    async fn fetch_metadata(&self, options: &FetchOptions) -> Result<RadarMetadata> {
        let url = format!("{}/metadata", options.radar_url());
        let response = Httpc::get(self, &url, None).await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "metadata endpoint returned {}",
                response.status()
            ));
        }

        let metadata = Httpc::read_json::<RadarMetadata>(response).await?;
        Ok(metadata)
    }

    async fn api_error(
        &self,
        response: Response,
        options: &FetchOptions,
        workflow: Workflow,
    ) -> ErrorState {
        let (error_data, parsed_json) = parse_error_response(response).await;
        parse_api_error(
            &error_data,
            parsed_json.as_ref(),
            ApiErrorOptions {
                retry_action: RetryAction::new(self, workflow, options),
                default_retry_after: DEFAULT_RETRY_AFTER,
            },
        )
    }

    fn settle(
        &self,
        outcome: Result<Outcome, RadarError>,
        options: &FetchOptions,
        workflow: Workflow,
    ) -> Option<RadarResponse> {
        let state = match outcome {
            Ok(Outcome::Ready(response)) => return Some(response),
            Ok(Outcome::Failed(state)) => state,
            Err(e) => {
                debug!("{:?} failed: {}", workflow, e);
                classify_fetch_error(&e, RetryAction::new(self, workflow, options))
            }
        };

        warn!(
            "radar {}/{} unavailable ({}): {}",
            options.suburb, options.state, state.kind, state.message
        );
        options.on_error.call(state);
        None
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_error_truthiness() {
        assert!(is_truthy(&json!("Cache refreshing")));
        assert!(is_truthy(&json!({ "code": "x" })));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
    }
}
