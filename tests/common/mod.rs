#![allow(dead_code)]

use radar_client::{ErrorState, FetchOptions};
use std::sync::{Arc, Mutex};

pub const SUBURB: &str = "Brisbane";
pub const STATE: &str = "QLD";

pub fn radar_path() -> String {
    format!("/api/radar/{}/{}", SUBURB, STATE)
}

/// Collects every `ErrorState` handed to `on_error`.
#[derive(Clone, Default)]
pub struct ErrorRecorder {
    states: Arc<Mutex<Vec<ErrorState>>>,
}

impl ErrorRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self, service_url: &str) -> FetchOptions {
        let states = Arc::clone(&self.states);
        FetchOptions::new(service_url, SUBURB, STATE, move |err| {
            states.lock().unwrap().push(err);
        })
    }

    pub fn count(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn last(&self) -> ErrorState {
        self.states
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("on_error was never called")
    }
}
