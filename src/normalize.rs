//! Wire values in, canonical values out. Nothing here touches the network.

use crate::models::{CacheFolder, RadarFrame, RadarMetadata, RadarResponse};
use chrono::{DateTime, Utc};

/// Resolve every frame's image location against the service base.
pub fn resolve_frames(frames: Vec<RadarFrame>, service_url: &str) -> Vec<RadarFrame> {
    frames
        .into_iter()
        .map(|frame| frame.resolve_image(service_url))
        .collect()
}

/// Merge cache folders into one list, folder order first, then frame order.
///
/// Each frame is stamped with its folder's provenance, has its image resolved
/// and its absolute observation time derived, and finally receives a dense
/// zero-based `sequential_index`.
pub fn flatten_cache_folders(folders: Vec<CacheFolder>, service_url: &str) -> Vec<RadarFrame> {
    let mut all_frames = Vec::new();

    for folder in folders {
        let (provenance, frames) = folder.split();
        all_frames.extend(frames.into_iter().map(|frame| {
            frame
                .stamped(&provenance)
                .resolve_image(service_url)
                .derive_absolute_time()
        }));
    }

    all_frames
        .into_iter()
        .enumerate()
        .map(|(idx, frame)| RadarFrame {
            sequential_index: Some(idx),
            ..frame
        })
        .collect()
}

/// Build the canonical response for a historical window ending at `end_time`.
pub fn synthesize_response(
    frames: Vec<RadarFrame>,
    newest_observation: Option<DateTime<Utc>>,
    metadata: RadarMetadata,
    end_time: DateTime<Utc>,
) -> RadarResponse {
    RadarResponse {
        frames,
        last_updated: Some(end_time),
        observation_time: Some(
            metadata
                .observation_time
                .or(newest_observation)
                .unwrap_or(end_time),
        ),
        forecast_time: Some(end_time),
        weather_station: metadata.weather_station,
        distance: metadata.distance,
        cache_is_valid: Some(metadata.cache_is_valid.unwrap_or(true)),
        cache_expires_at: Some(metadata.cache_expires_at.unwrap_or(end_time)),
        is_updating: Some(metadata.is_updating.unwrap_or(false)),
        next_update_time: Some(metadata.next_update_time.unwrap_or(end_time)),
    }
}
