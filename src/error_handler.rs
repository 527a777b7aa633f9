use crate::error::RadarError;
use crate::error_state::{ErrorKind, ErrorState, RetryAction};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde_json::Value;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error: Unable to connect to service";
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Raw facts pulled off a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorData {
    pub status: u16,
    pub status_text: String,
    /// Empty when the body could not be read.
    pub body: String,
    /// `Retry-After` header, seconds form only.
    pub retry_after_header: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ApiErrorOptions {
    pub retry_action: RetryAction,
    pub default_retry_after: u64,
}

pub async fn parse_error_response(response: Response) -> (ErrorData, Option<Value>) {
    let status = response.status();
    let retry_after_header = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let parsed_json = serde_json::from_str::<Value>(&body).ok();

    let error_data = ErrorData {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
        retry_after_header,
    };
    (error_data, parsed_json)
}

/// Classify an HTTP error response into an [`ErrorState`].
pub fn parse_api_error(
    error_data: &ErrorData,
    parsed_json: Option<&Value>,
    options: ApiErrorOptions,
) -> ErrorState {
    let code = parsed_json.and_then(structured_code);
    let (kind, retryable) = classify_status(error_data.status, code);

    let retry_after = parsed_json
        .and_then(structured_retry_after)
        .or(error_data.retry_after_header)
        .or_else(|| {
            (retryable && kind == ErrorKind::Cache).then_some(options.default_retry_after)
        });

    let message = parsed_json
        .and_then(structured_message)
        .unwrap_or_else(|| {
            format!(
                "Service returned HTTP {} {}",
                error_data.status, error_data.status_text
            )
            .trim_end()
            .to_string()
        });

    ErrorState {
        message,
        kind,
        retryable,
        retry_action: Some(options.retry_action),
        retry_after,
    }
}

pub fn classify_status(status: u16, code: Option<&str>) -> (ErrorKind, bool) {
    let cache_code = code.is_some_and(|c| c.to_ascii_uppercase().contains("CACHE"));
    match StatusCode::from_u16(status) {
        Ok(StatusCode::TOO_MANY_REQUESTS) | Ok(StatusCode::SERVICE_UNAVAILABLE) => {
            (ErrorKind::Cache, true)
        }
        _ if cache_code => (ErrorKind::Cache, true),
        Ok(StatusCode::REQUEST_TIMEOUT)
        | Ok(StatusCode::BAD_GATEWAY)
        | Ok(StatusCode::GATEWAY_TIMEOUT) => (ErrorKind::Network, true),
        Ok(s) if s.is_server_error() => (ErrorKind::Unknown, true),
        _ => (ErrorKind::Unknown, false),
    }
}

/// Classify a failure that never produced an HTTP error response.
pub fn classify_fetch_error(err: &RadarError, retry_action: RetryAction) -> ErrorState {
    if err.is_network() {
        ErrorState {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            kind: ErrorKind::Network,
            retryable: true,
            retry_action: Some(retry_action),
            retry_after: None,
        }
    } else {
        let message = err.to_string();
        ErrorState {
            message: if message.is_empty() {
                UNKNOWN_ERROR_MESSAGE.to_string()
            } else {
                message
            },
            kind: ErrorKind::Unknown,
            retryable: true,
            retry_action: Some(retry_action),
            retry_after: None,
        }
    }
}

/// Message of a structured error body: `error` string, `error.message`, or `message`.
pub(crate) fn structured_message(json: &Value) -> Option<String> {
    let error = json.get("error");
    error
        .and_then(Value::as_str)
        .or_else(|| error.and_then(|e| e.get("message")).and_then(Value::as_str))
        .or_else(|| json.get("message").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn structured_code(json: &Value) -> Option<&str> {
    json.get("code")
        .and_then(Value::as_str)
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("code"))
                .and_then(Value::as_str)
        })
}

pub(crate) fn structured_retry_after(json: &Value) -> Option<u64> {
    json.get("retryAfter")
        .or_else(|| json.get("error").and_then(|e| e.get("retryAfter")))
        .and_then(seconds)
        .filter(|s| *s > 0)
}

fn seconds(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f > 0.0).map(|f| f.ceil() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::error_state::Workflow;
    use crate::options::FetchOptions;
    use serde_json::json;

    fn retry() -> RetryAction {
        let options = FetchOptions::new("http://svc", "Brisbane", "QLD", |_| {});
        RetryAction::new(&Client::default(), Workflow::LatestFrames, &options)
    }

    fn data(status: u16) -> ErrorData {
        ErrorData {
            status,
            status_text: StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            ..Default::default()
        }
    }

    fn opts() -> ApiErrorOptions {
        ApiErrorOptions {
            retry_action: retry(),
            default_retry_after: 30,
        }
    }

    #[test]
    fn structured_503_is_a_cache_error() {
        let body = json!({
            "error": { "code": "CACHE_UPDATING", "message": "Radar cache is updating", "retryAfter": 45 }
        });
        let state = parse_api_error(&data(503), Some(&body), opts());

        assert_eq!(state.kind, ErrorKind::Cache);
        assert!(state.retryable);
        assert_eq!(state.message, "Radar cache is updating");
        assert_eq!(state.retry_after, Some(45));
        assert_eq!(
            state.retry_action.map(|a| a.workflow),
            Some(Workflow::LatestFrames)
        );
    }

    #[test]
    fn cache_error_without_hint_uses_default() {
        let state = parse_api_error(&data(429), None, opts());
        assert_eq!(state.retry_after, Some(30));
        assert_eq!(state.message, "Service returned HTTP 429 Too Many Requests");
    }

    #[test]
    fn header_hint_beats_default() {
        let mut d = data(503);
        d.retry_after_header = Some(12);
        let state = parse_api_error(&d, None, opts());
        assert_eq!(state.retry_after, Some(12));
    }

    #[test]
    fn not_found_is_not_retryable() {
        let body = json!({ "message": "Unknown suburb" });
        let state = parse_api_error(&data(404), Some(&body), opts());

        assert_eq!(state.kind, ErrorKind::Unknown);
        assert!(!state.retryable);
        assert_eq!(state.retry_after, None);
        assert_eq!(state.message, "Unknown suburb");
        assert!(state.retry_action.is_some());
    }

    #[test]
    fn gateway_failures_are_network() {
        assert_eq!(classify_status(502, None), (ErrorKind::Network, true));
        assert_eq!(classify_status(504, None), (ErrorKind::Network, true));
        assert_eq!(classify_status(500, None), (ErrorKind::Unknown, true));
        assert_eq!(classify_status(500, Some("cache_stale")), (ErrorKind::Cache, true));
    }

    #[test]
    fn fractional_retry_after_rounds_up() {
        assert_eq!(structured_retry_after(&json!({ "retryAfter": 2.2 })), Some(3));
        assert_eq!(structured_retry_after(&json!({ "retryAfter": 0 })), None);
    }

    #[test]
    fn validation_failures_classify_as_unknown() {
        let state = classify_fetch_error(&RadarError::NoFrames, retry());
        assert_eq!(state.kind, ErrorKind::Unknown);
        assert!(state.retryable);
        assert_eq!(state.message, "No frames available in response");
        assert_eq!(state.retry_after, None);
    }
}
