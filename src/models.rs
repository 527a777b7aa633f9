use crate::url_resolver::resolve_image_url;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One radar image plus its timing and provenance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarFrame {
    pub image_url: Option<String>,
    pub observation_time: Option<DateTime<Utc>>,
    pub absolute_observation_time: Option<DateTime<Utc>>,
    /// Fractional values are kept; derivation rounds to the millisecond.
    pub minutes_ago: Option<f64>,
    /// Owning cache folder, historical frames only.
    pub cache_timestamp: Option<String>,
    pub cache_folder_name: Option<String>,
    /// Position in the merged historical list.
    pub sequential_index: Option<usize>,
}

impl RadarFrame {
    pub fn resolve_image(self, service_url: &str) -> Self {
        Self {
            image_url: self
                .image_url
                .map(|url| resolve_image_url(&url, service_url)),
            ..self
        }
    }

    /// Fill `absolute_observation_time` from `observation_time - minutes_ago`
    /// when the service left it out. Offsets outside chrono's range leave it
    /// unset.
    pub fn derive_absolute_time(self) -> Self {
        match (
            self.absolute_observation_time,
            self.observation_time,
            self.minutes_ago,
        ) {
            (None, Some(observed), Some(minutes)) => Self {
                absolute_observation_time: minutes_before(observed, minutes),
                ..self
            },
            _ => self,
        }
    }

    pub(crate) fn stamped(self, folder: &FolderProvenance) -> Self {
        Self {
            cache_timestamp: folder.cache_timestamp.clone(),
            observation_time: folder.observation_time,
            cache_folder_name: folder.cache_folder_name.clone(),
            ..self
        }
    }
}

fn minutes_before(observed: DateTime<Utc>, minutes: f64) -> Option<DateTime<Utc>> {
    let millis = (minutes * 60_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|span| observed.checked_sub_signed(span))
}

/// Server-side time bucket of frames.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheFolder {
    pub cache_timestamp: Option<String>,
    pub observation_time: Option<DateTime<Utc>>,
    pub cache_folder_name: Option<String>,
    #[serde(default)]
    pub frames: Vec<RadarFrame>,
}

impl CacheFolder {
    pub(crate) fn split(self) -> (FolderProvenance, Vec<RadarFrame>) {
        (
            FolderProvenance {
                cache_timestamp: self.cache_timestamp,
                observation_time: self.observation_time,
                cache_folder_name: self.cache_folder_name,
            },
            self.frames,
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FolderProvenance {
    pub cache_timestamp: Option<String>,
    pub observation_time: Option<DateTime<Utc>>,
    pub cache_folder_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesResponse {
    pub cache_folders: Option<Vec<CacheFolder>>,
}

/// The canonical result handed to callers, whichever endpoint it came from.
///
/// Only `frames` is required of the latest endpoint; the historical workflow
/// always fills every timestamp.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarResponse {
    pub frames: Vec<RadarFrame>,
    pub last_updated: Option<DateTime<Utc>>,
    pub observation_time: Option<DateTime<Utc>>,
    pub forecast_time: Option<DateTime<Utc>>,
    pub weather_station: Option<String>,
    pub distance: Option<f64>,
    pub cache_is_valid: Option<bool>,
    pub cache_expires_at: Option<DateTime<Utc>>,
    pub is_updating: Option<bool>,
    pub next_update_time: Option<DateTime<Utc>>,
}

/// Display metadata from `/metadata`; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarMetadata {
    pub observation_time: Option<DateTime<Utc>>,
    pub weather_station: Option<String>,
    pub distance: Option<f64>,
    pub cache_is_valid: Option<bool>,
    pub cache_expires_at: Option<DateTime<Utc>>,
    pub is_updating: Option<bool>,
    pub next_update_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn derives_absolute_time_from_minutes_ago() {
        let frame = RadarFrame {
            observation_time: Some(at("2024-01-01T10:00:00Z")),
            minutes_ago: Some(15.0),
            ..Default::default()
        }
        .derive_absolute_time();

        assert_eq!(
            frame.absolute_observation_time,
            Some(at("2024-01-01T09:45:00Z"))
        );
    }

    #[test]
    fn fractional_minutes_ago_is_honoured() {
        let frame = RadarFrame {
            observation_time: Some(at("2024-01-01T10:00:00Z")),
            minutes_ago: Some(2.5),
            ..Default::default()
        }
        .derive_absolute_time();

        assert_eq!(
            frame.absolute_observation_time,
            Some(at("2024-01-01T09:57:30Z"))
        );
    }

    #[test]
    fn out_of_range_minutes_ago_leaves_absolute_time_unset() {
        for minutes in [9_223_372_036_854_775_807.0, -1e15, 1e12, f64::NAN] {
            let frame = RadarFrame {
                observation_time: Some(at("2024-01-01T10:00:00Z")),
                minutes_ago: Some(minutes),
                ..Default::default()
            }
            .derive_absolute_time();

            assert_eq!(frame.absolute_observation_time, None, "{}", minutes);
        }
    }

    #[test]
    fn keeps_service_supplied_absolute_time() {
        let frame = RadarFrame {
            observation_time: Some(at("2024-01-01T10:00:00Z")),
            absolute_observation_time: Some(at("2024-01-01T09:00:00Z")),
            minutes_ago: Some(15.0),
            ..Default::default()
        }
        .derive_absolute_time();

        assert_eq!(
            frame.absolute_observation_time,
            Some(at("2024-01-01T09:00:00Z"))
        );
    }

    #[test]
    fn no_derivation_without_minutes_ago() {
        let frame = RadarFrame {
            observation_time: Some(at("2024-01-01T10:00:00Z")),
            ..Default::default()
        }
        .derive_absolute_time();

        assert_eq!(frame.absolute_observation_time, None);
    }

    #[test]
    fn decodes_camel_case_wire_frame() {
        let frame: RadarFrame = serde_json::from_value(json!({
            "imageUrl": "/api/radar/Brisbane/QLD/frame/0",
            "observationTime": "2024-01-01T10:00:00Z",
            "minutesAgo": 5
        }))
        .unwrap();

        assert_eq!(frame.image_url.as_deref(), Some("/api/radar/Brisbane/QLD/frame/0"));
        assert_eq!(frame.minutes_ago, Some(5.0));
        assert_eq!(frame.sequential_index, None);
    }

    #[test]
    fn metadata_tolerates_partial_bodies() {
        let metadata: RadarMetadata =
            serde_json::from_value(json!({ "weatherStation": "Brisbane AP", "frames": [] }))
                .unwrap();

        assert_eq!(metadata.weather_station.as_deref(), Some("Brisbane AP"));
        assert_eq!(metadata.cache_is_valid, None);
    }
}
