use crate::client::Client;
use crate::models::RadarResponse;
use crate::options::FetchOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The service could not be reached.
    Network,
    /// The service answered but its radar cache is busy or stale.
    Cache,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Cache => "cache",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Workflow {
    LatestFrames,
    HistoricalFrames,
}

/// A failed call, captured so it can be replayed with identical inputs.
#[derive(Debug, Clone, Serialize)]
pub struct RetryAction {
    pub workflow: Workflow,
    pub options: FetchOptions,
    #[serde(skip)]
    client: Client,
}

impl RetryAction {
    pub fn new(client: &Client, workflow: Workflow, options: &FetchOptions) -> Self {
        RetryAction {
            workflow,
            options: options.clone(),
            client: client.clone(),
        }
    }

    /// Re-run the captured workflow. Failures go to the original `on_error`.
    pub async fn run(&self) -> Option<RadarResponse> {
        match self.workflow {
            Workflow::LatestFrames => self.client.fetch_latest_frames(&self.options).await,
            Workflow::HistoricalFrames => {
                self.client.fetch_historical_frames(&self.options).await
            }
        }
    }
}

/// What the UI layer gets told when a call fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub retryable: bool,
    pub retry_action: Option<RetryAction>,
    /// Seconds.
    pub retry_after: Option<u64>,
}
