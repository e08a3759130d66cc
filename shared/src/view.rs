//! What shells render. Everything here is derived from [`Model`] on each
//! `view` call; nothing in this module holds state.

use serde::{Deserialize, Serialize};

use crate::feed::FetchError;
use crate::model::{LatLon, Model, QuakeRecord, UnixTimeMs};
use crate::selection::MapFocus;

pub const WORLD_CENTER: LatLon = LatLon { lat: 20.0, lon: 0.0 };
pub const WORLD_ZOOM: f64 = 2.0;
pub const MIN_MARKER_RADIUS: f64 = 4.0;
pub const MARKER_RADIUS_PER_MAGNITUDE: f64 = 3.0;
pub const EMPTY_MESSAGE: &str = "No earthquakes found for your search.";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub status: StatusView,
    pub search: SearchView,
    pub min_magnitude: f64,
    pub auto_refresh: bool,
    pub quakes: Vec<QuakeView>,
    pub empty_message: Option<String>,
    pub map: MapView,
    pub selected_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub is_loading: bool,
    pub label: String,
    pub last_updated_ms: Option<i64>,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub error_code: String,
}

impl From<&FetchError> for UserFacingError {
    fn from(e: &FetchError) -> Self {
        Self {
            message: e.to_string(),
            is_transient: e.is_transient(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchView {
    pub pending: String,
    pub committed: Option<String>,
    pub banner: Option<String>,
    pub can_clear: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuakeView {
    pub id: String,
    pub place: String,
    pub magnitude_label: String,
    pub coordinates_label: String,
    pub depth_label: String,
    pub time_label: String,
    pub occurred_at_ms: Option<i64>,
    pub details_url: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MapView {
    pub initial: MapFocus,
    /// Present only when the selection has coordinates; the shell keeps
    /// its current viewport otherwise.
    pub focus: Option<MapFocus>,
    pub markers: Vec<MarkerView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerView {
    pub id: String,
    pub position: LatLon,
    pub radius: f64,
    pub band: MagnitudeBand,
    pub color: String,
    pub magnitude_label: String,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeBand {
    Major,
    Strong,
    Moderate,
    Light,
    Minor,
    Micro,
}

impl MagnitudeBand {
    /// Unknown magnitude falls in the lowest band.
    #[must_use]
    pub fn for_magnitude(magnitude: Option<f64>) -> Self {
        match magnitude.unwrap_or(0.0) {
            m if m >= 6.0 => Self::Major,
            m if m >= 5.0 => Self::Strong,
            m if m >= 4.0 => Self::Moderate,
            m if m >= 3.0 => Self::Light,
            m if m >= 2.0 => Self::Minor,
            _ => Self::Micro,
        }
    }

    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Major => "#443e3eff",
            Self::Strong => "#a52d2dff",
            Self::Moderate => "#e75a5aff",
            Self::Light => "#f98c3eff",
            Self::Minor => "#facc15",
            Self::Micro => "#a3e635",
        }
    }
}

#[must_use]
pub fn magnitude_label(magnitude: Option<f64>) -> String {
    match magnitude {
        Some(m) => format!("M {m}"),
        None => "M —".into(),
    }
}

/// `lat, lon`: latitude first, the reverse of the GeoJSON `[lon, lat]`
/// position it was read from.
#[must_use]
pub fn coordinates_label(coordinates: Option<LatLon>) -> String {
    match coordinates {
        Some(c) => format!("{:.2}, {:.2}", c.lat, c.lon),
        None => "N/A".into(),
    }
}

#[must_use]
pub fn depth_label(depth_km: Option<f64>) -> String {
    match depth_km {
        Some(d) => format!("Depth: {d} km"),
        None => "Depth: N/A".into(),
    }
}

#[must_use]
pub fn marker_radius(magnitude: Option<f64>) -> f64 {
    (magnitude.unwrap_or(0.0) * MARKER_RADIUS_PER_MAGNITUDE).max(MIN_MARKER_RADIUS)
}

/// Relative age of `timestamp_ms` as seen from `now_ms`. A quake stamped
/// after the fetch clock reads as "Just now" rather than a future time.
#[must_use]
pub fn format_time_ago(timestamp_ms: i64, now_ms: i64) -> String {
    let secs = now_ms.saturating_sub(timestamp_ms).max(0) / 1000;
    match secs {
        0..=4 => "Just now".into(),
        5..=59 => format!("{secs}s ago"),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

fn time_label(occurred_at: Option<UnixTimeMs>, now: Option<UnixTimeMs>) -> String {
    match (occurred_at, now) {
        (None, _) => "Time unavailable".into(),
        (Some(at), Some(now)) => format_time_ago(at.as_millis(), now.as_millis()),
        // Not stamped yet; the shell still has `occurred_at_ms` to format.
        (Some(_), None) => String::new(),
    }
}

fn quake_view(record: &QuakeRecord, model: &Model) -> QuakeView {
    QuakeView {
        id: record.id.to_string(),
        place: record.place.clone(),
        magnitude_label: magnitude_label(record.magnitude),
        coordinates_label: coordinates_label(record.coordinates),
        depth_label: depth_label(record.depth_km),
        time_label: time_label(record.occurred_at, model.feed.last_fetched()),
        occurred_at_ms: record.occurred_at.map(UnixTimeMs::as_millis),
        details_url: record.details_url.clone(),
        selected: model.selection.is_selected(&record.id),
    }
}

fn marker_view(record: &QuakeRecord) -> Option<MarkerView> {
    let position = record.coordinates?;
    let band = MagnitudeBand::for_magnitude(record.magnitude);
    Some(MarkerView {
        id: record.id.to_string(),
        position,
        radius: marker_radius(record.magnitude),
        band,
        color: band.color().to_string(),
        magnitude_label: magnitude_label(record.magnitude),
    })
}

impl ViewModel {
    pub fn from_model(model: &Model) -> Self {
        let is_loading = model.is_loading();
        let visible_count = model.visible_len();

        let committed = model.filter.committed_search();
        let committed = (!committed.is_empty()).then(|| committed.to_string());

        Self {
            status: StatusView {
                is_loading,
                label: if is_loading {
                    "Loading...".into()
                } else {
                    format!("{visible_count} events")
                },
                last_updated_ms: model.feed.last_fetched().map(UnixTimeMs::as_millis),
                error: model.feed.last_error().map(UserFacingError::from),
            },
            search: SearchView {
                pending: model.filter.pending_search().to_string(),
                banner: committed
                    .as_ref()
                    .map(|term| format!("Showing earthquakes related to: {term}")),
                can_clear: committed.is_some(),
                committed,
            },
            min_magnitude: model.filter.min_magnitude(),
            auto_refresh: model.scheduler.auto_refresh().is_some(),
            quakes: model.visible().map(|r| quake_view(r, model)).collect(),
            empty_message: (visible_count == 0 && !is_loading).then(|| EMPTY_MESSAGE.to_string()),
            map: MapView {
                initial: MapFocus {
                    center: WORLD_CENTER,
                    zoom: WORLD_ZOOM,
                },
                focus: model.selection.focus(model.feed.records()),
                markers: model.visible().filter_map(marker_view).collect(),
            },
            selected_id: model.selected().map(|r| r.id.to_string()),
        }
    }
}
