use crate::client::{Client, DEFAULT_TIMEOUT};
use crate::error_state::ErrorState;
use crate::options::FetchOptions;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8082";
pub const SERVICE_URL_ENV: &str = "RADAR_SERVICE_URL";
pub const TIMEOUT_ENV: &str = "RADAR_TIMEOUT_SECS";

/// Where the radar service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub service_url: String,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_url = lookup(SERVICE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let parsed = Url::parse(service_url.trim())
            .with_context(|| format!("{} is not a valid URL: {}", SERVICE_URL_ENV, service_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "{} must use http or https, got {}",
                SERVICE_URL_ENV,
                parsed.scheme()
            ));
        }

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{} must be whole seconds, got {}", TIMEOUT_ENV, raw))?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(ServiceConfig {
            service_url: service_url.trim().to_string(),
            timeout,
        })
    }

    pub fn client(&self) -> Client {
        Client::with_timeout(self.timeout)
    }

    pub fn fetch_options<F>(&self, suburb: &str, state: &str, on_error: F) -> FetchOptions
    where
        F: Fn(ErrorState) + Send + Sync + 'static,
    {
        FetchOptions::new(&self.service_url, suburb, state, on_error)
    }
}
