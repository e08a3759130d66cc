//! Magnitude and place-search filtering.
//!
//! [`visible`] is a pure function of the records and the two committed
//! inputs. [`FilterState`] holds those inputs plus the pending search text,
//! which is what the user is typing and has no effect until committed.

use serde::{Deserialize, Serialize};

use crate::model::QuakeRecord;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    min_magnitude: f64,
    pending_search: String,
    committed_search: String,
}

impl FilterState {
    pub fn min_magnitude(&self) -> f64 {
        self.min_magnitude
    }

    pub fn pending_search(&self) -> &str {
        &self.pending_search
    }

    pub fn committed_search(&self) -> &str {
        &self.committed_search
    }

    /// Negative and fractional thresholds are fine. Returns whether the
    /// threshold changed.
    pub fn set_min_magnitude(&mut self, value: f64) -> bool {
        if !value.is_finite() || value == self.min_magnitude {
            return false;
        }
        self.min_magnitude = value;
        true
    }

    pub fn set_pending_search(&mut self, text: String) {
        self.pending_search = text;
    }

    /// Promotes the trimmed pending text. Returns whether the committed
    /// term changed.
    pub fn commit_search(&mut self) -> bool {
        let term = self.pending_search.trim();
        if term == self.committed_search {
            return false;
        }
        self.committed_search = term.to_owned();
        true
    }

    /// Clears both stages. Returns whether the committed term changed.
    pub fn clear_search(&mut self) -> bool {
        self.pending_search.clear();
        if self.committed_search.is_empty() {
            return false;
        }
        self.committed_search.clear();
        true
    }

    pub fn has_committed_search(&self) -> bool {
        !self.committed_search.is_empty()
    }
}

/// Case-folded search needle; `None` when the term is blank.
struct Needle(Option<String>);

impl Needle {
    fn new(term: &str) -> Self {
        let term = term.trim();
        Self((!term.is_empty()).then(|| term.to_lowercase()))
    }

    fn matches(&self, place: &str) -> bool {
        match &self.0 {
            Some(needle) => place.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

fn passes(record: &QuakeRecord, min_magnitude: f64, needle: &Needle) -> bool {
    record.threshold_magnitude() >= min_magnitude && needle.matches(&record.place)
}

/// Records passing both the magnitude threshold and the search term, in
/// their original order.
#[must_use]
pub fn visible<'a>(
    records: &'a [QuakeRecord],
    min_magnitude: f64,
    committed_search: &str,
) -> Vec<&'a QuakeRecord> {
    let needle = Needle::new(committed_search);
    records
        .iter()
        .filter(|r| passes(r, min_magnitude, &needle))
        .collect()
}

/// Same selection as [`visible`], as positions into `records`.
#[must_use]
pub fn visible_indices(records: &[QuakeRecord], min_magnitude: f64, committed_search: &str) -> Vec<usize> {
    let needle = Needle::new(committed_search);
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| passes(r, min_magnitude, &needle))
        .map(|(i, _)| i)
        .collect()
}
