use serde::{Deserialize, Serialize};

use crate::model::{LatLon, QuakeId, QuakeRecord};

pub const FOCUS_ZOOM: f64 = 6.0;

/// Where the map should center for the selected record.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapFocus {
    pub center: LatLon,
    pub zoom: f64,
}

/// Holds at most one selected id. The record itself is looked up on every
/// read so a refresh can never leave a stale copy behind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    selected: Option<QuakeId>,
}

impl Selection {
    /// Idempotent: selecting the current id again leaves it selected.
    /// Returns whether the selection changed.
    pub fn select(&mut self, id: QuakeId) -> bool {
        if self.selected.as_ref() == Some(&id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn selected_id(&self) -> Option<&QuakeId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &QuakeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn current<'a>(&self, records: &'a [QuakeRecord]) -> Option<&'a QuakeRecord> {
        let id = self.selected.as_ref()?;
        records.iter().find(|r| &r.id == id)
    }

    /// Drops the selection when `records` no longer contains it. Returns
    /// whether it was dropped.
    pub fn retain_in(&mut self, records: &[QuakeRecord]) -> bool {
        if self.selected.is_some() && self.current(records).is_none() {
            self.selected = None;
            return true;
        }
        false
    }

    /// `None` both when nothing is selected and when the selected record
    /// has no coordinates.
    pub fn focus(&self, records: &[QuakeRecord]) -> Option<MapFocus> {
        let center = self.current(records)?.coordinates?;
        Some(MapFocus { center, zoom: FOCUS_ZOOM })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake(id: &str, coordinates: Option<LatLon>) -> QuakeRecord {
        QuakeRecord {
            id: QuakeId::new(id),
            magnitude: Some(4.0),
            place: String::new(),
            occurred_at: None,
            details_url: String::new(),
            depth_km: None,
            coordinates,
        }
    }

    #[test]
    fn select_twice_is_idempotent() {
        let records = vec![quake("a", None)];
        let mut selection = Selection::default();

        assert!(selection.select(QuakeId::new("a")));
        assert!(!selection.select(QuakeId::new("a")));
        assert_eq!(selection.current(&records).map(|r| r.id.as_str()), Some("a"));
    }

    #[test]
    fn unresolvable_id_reads_as_none() {
        let mut selection = Selection::default();
        selection.select(QuakeId::new("gone"));
        assert!(selection.current(&[quake("a", None)]).is_none());
    }

    #[test]
    fn retain_in_drops_missing_id() {
        let mut selection = Selection::default();
        selection.select(QuakeId::new("a"));

        assert!(!selection.retain_in(&[quake("a", None)]));
        assert!(selection.retain_in(&[quake("b", None)]));
        assert!(selection.selected_id().is_none());
    }

    #[test]
    fn focus_requires_coordinates() {
        let records = vec![quake("a", LatLon::new(35.6, 139.7)), quake("b", None)];
        let mut selection = Selection::default();
        assert!(selection.focus(&records).is_none());

        selection.select(QuakeId::new("a"));
        let focus = selection.focus(&records).expect("focus");
        assert_eq!(focus.center, LatLon { lat: 35.6, lon: 139.7 });
        assert_eq!(focus.zoom, FOCUS_ZOOM);

        selection.select(QuakeId::new("b"));
        assert!(selection.focus(&records).is_none());
    }

    #[test]
    fn clear_reports_change() {
        let mut selection = Selection::default();
        assert!(!selection.clear());
        selection.select(QuakeId::new("a"));
        assert!(selection.clear());
    }
}
