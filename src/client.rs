use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Entry point for both radar workflows.
///
/// Holds no per-call state; every workflow takes its own
/// [`FetchOptions`](crate::FetchOptions), so a single client can serve
/// overlapping calls.
#[derive(Debug, Clone)]
pub struct Client {
    pub timeout: Duration,
}

impl Client {
    pub fn new() -> Self {
        Client {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Client { timeout }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
