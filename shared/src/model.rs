use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FeedSettings;
use crate::feed::FetchError;
use crate::filter::{self, FilterState};
use crate::schedule::RefreshScheduler;
use crate::selection::Selection;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(QuakeId);

/// Validated lat/lon
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() { return None; }
        if !(-90.0..=90.0).contains(&lat) { return None; }
        if !(-180.0..=180.0).contains(&lon) { return None; }
        Some(Self { lat, lon })
    }
}

/// Explicit timestamp unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub i64);

impl UnixTimeMs {
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

/// One seismic event after normalization. Never mutated after the feed
/// client builds it; a refresh replaces records, it does not edit them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuakeRecord {
    pub id: QuakeId,
    /// `None` is "unknown", which is not the same as a measured 0.
    pub magnitude: Option<f64>,
    pub place: String,
    pub occurred_at: Option<UnixTimeMs>,
    pub details_url: String,
    pub depth_km: Option<f64>,
    pub coordinates: Option<LatLon>,
}

impl QuakeRecord {
    /// Magnitude as seen by threshold comparisons.
    #[must_use]
    pub fn threshold_magnitude(&self) -> f64 {
        self.magnitude.unwrap_or(0.0)
    }
}

/// The records of the last successful fetch plus the outcome bookkeeping
/// around it. Records are only ever swapped as a whole.
#[derive(Clone, Debug, Default)]
pub struct WorkingSet {
    records: Vec<QuakeRecord>,
    last_fetched: Option<UnixTimeMs>,
    last_error: Option<FetchError>,
}

impl WorkingSet {
    pub fn records(&self) -> &[QuakeRecord] {
        &self.records
    }

    pub fn last_fetched(&self) -> Option<UnixTimeMs> {
        self.last_fetched
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn find(&self, id: &QuakeId) -> Option<&QuakeRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn replace(&mut self, records: Vec<QuakeRecord>) {
        self.records = records;
        self.last_error = None;
    }

    /// Stale data beats no data: the record list is left as it was.
    pub fn record_failure(&mut self, error: FetchError) {
        self.last_error = Some(error);
    }

    pub fn stamp(&mut self, at: UnixTimeMs) {
        self.last_fetched = Some(at);
    }
}

/// The single context object threaded through every update.
#[derive(Debug, Default)]
pub struct Model {
    pub config: FeedSettings,
    pub feed: WorkingSet,
    pub scheduler: RefreshScheduler,
    pub filter: FilterState,
    pub selection: Selection,

    // Indices into `feed.records()`, rebuilt whenever the records, the
    // magnitude threshold or the committed search change.
    visible: Vec<usize>,
    started: bool,
}

impl Model {
    pub fn new(config: FeedSettings) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns `true` only the first time; later calls are no-ops.
    pub fn mark_started(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub fn visible(&self) -> impl Iterator<Item = &QuakeRecord> + '_ {
        let records = self.feed.records();
        self.visible.iter().filter_map(move |&i| records.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected(&self) -> Option<&QuakeRecord> {
        self.selection.current(self.feed.records())
    }

    pub fn is_loading(&self) -> bool {
        self.scheduler.is_in_flight()
    }

    /// Swaps in a freshly fetched batch. A selection that no longer
    /// resolves is dropped here rather than lingering until the id reappears.
    pub fn apply_records(&mut self, records: Vec<QuakeRecord>) {
        self.feed.replace(records);
        self.selection.retain_in(self.feed.records());
        self.recompute_visible();
    }

    pub fn apply_failure(&mut self, error: FetchError) {
        self.feed.record_failure(error);
    }

    /// Non-finite thresholds are refused; they would hide every record.
    pub fn set_min_magnitude(&mut self, value: f64) -> bool {
        if !self.filter.set_min_magnitude(value) {
            return false;
        }
        self.recompute_visible();
        true
    }

    /// Typing only touches the pending text, never the visible set.
    pub fn set_pending_search(&mut self, text: String) {
        self.filter.set_pending_search(text);
    }

    pub fn commit_search(&mut self) -> bool {
        if !self.filter.commit_search() {
            return false;
        }
        self.recompute_visible();
        true
    }

    pub fn clear_search(&mut self) -> bool {
        if !self.filter.clear_search() {
            return false;
        }
        self.recompute_visible();
        true
    }

    fn recompute_visible(&mut self) {
        self.visible = filter::visible_indices(
            self.feed.records(),
            self.filter.min_magnitude(),
            self.filter.committed_search(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(id: &str, mag: Option<f64>, place: &str) -> QuakeRecord {
        QuakeRecord {
            id: QuakeId::new(id),
            magnitude: mag,
            place: place.into(),
            occurred_at: None,
            details_url: String::new(),
            depth_km: None,
            coordinates: None,
        }
    }

    fn ids(model: &Model) -> Vec<&str> {
        model.visible().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn lat_lon_rejects_out_of_range_and_nan() {
        assert!(LatLon::new(91.0, 0.0).is_none());
        assert!(LatLon::new(0.0, -180.5).is_none());
        assert!(LatLon::new(f64::NAN, 0.0).is_none());
        assert!(LatLon::new(0.0, f64::INFINITY).is_none());
        assert_eq!(LatLon::new(35.6, 139.7), Some(LatLon { lat: 35.6, lon: 139.7 }));
    }

    #[test]
    fn unknown_magnitude_compares_as_zero() {
        assert_eq!(quake("a", None, "").threshold_magnitude(), 0.0);
        assert_eq!(quake("a", Some(-0.4), "").threshold_magnitude(), -0.4);
    }

    #[test]
    fn mark_started_only_once() {
        let mut model = Model::default();
        assert!(model.mark_started());
        assert!(!model.mark_started());
    }

    #[test]
    fn failure_keeps_previous_records() {
        let mut model = Model::default();
        model.apply_records(vec![quake("a", Some(1.0), "x")]);
        model.apply_failure(FetchError::HttpStatus(500));

        assert_eq!(model.feed.records().len(), 1);
        assert_eq!(model.feed.last_error(), Some(&FetchError::HttpStatus(500)));
        assert_eq!(ids(&model), vec!["a"]);
    }

    #[test]
    fn success_clears_previous_error() {
        let mut model = Model::default();
        model.apply_failure(FetchError::HttpStatus(503));
        model.apply_records(vec![]);
        assert!(model.feed.last_error().is_none());
    }

    #[test]
    fn pending_search_does_not_touch_visible_set() {
        let mut model = Model::default();
        model.apply_records(vec![
            quake("a", Some(5.2), "Tokyo, Japan"),
            quake("b", Some(4.0), "Seoul, Korea"),
        ]);

        model.set_pending_search("japan".into());
        assert_eq!(ids(&model), vec!["a", "b"]);

        assert!(model.commit_search());
        assert_eq!(ids(&model), vec!["a"]);

        model.set_pending_search("korea".into());
        assert_eq!(ids(&model), vec!["a"]);
    }

    #[test]
    fn threshold_change_recomputes() {
        let mut model = Model::default();
        model.apply_records(vec![quake("a", Some(5.2), ""), quake("b", None, "")]);
        assert_eq!(ids(&model), vec!["a", "b"]);

        assert!(model.set_min_magnitude(5.0));
        assert_eq!(ids(&model), vec!["a"]);

        assert!(!model.set_min_magnitude(f64::NAN));
        assert_eq!(model.filter.min_magnitude(), 5.0);
    }

    #[test]
    fn refresh_drops_vanished_selection() {
        let mut model = Model::default();
        model.apply_records(vec![quake("a", Some(1.0), ""), quake("b", Some(2.0), "")]);
        model.selection.select(QuakeId::new("b"));
        assert_eq!(model.selected().map(|r| r.id.as_str()), Some("b"));

        model.apply_records(vec![quake("a", Some(1.0), "")]);
        assert!(model.selected().is_none());
        assert!(model.selection.selected_id().is_none());
    }
}
