//! Radar frame acquisition: fetch latest or historical radar frames from a
//! radar service, normalize them into one [`RadarResponse`] shape, and report
//! failures as [`ErrorState`] values through a caller-supplied callback.

pub mod client;
pub mod config;
pub mod error;
pub mod error_handler;
pub mod error_state;
pub mod httpc;
pub mod models;
pub mod normalize;
pub mod options;
mod radar;
pub mod url_resolver;

pub use client::Client;
pub use config::ServiceConfig;
pub use error::RadarError;
pub use error_state::{ErrorKind, ErrorState, RetryAction, Workflow};
pub use models::{CacheFolder, RadarFrame, RadarMetadata, RadarResponse};
pub use options::{FetchOptions, OnError, TimeWindow};
pub use url_resolver::resolve_image_url;
