use serde::{Deserialize, Serialize};

use crate::capabilities::TimerId;
use crate::config::FeedConfig;
use crate::feed::FetchResult;
use crate::model::{QuakeId, UnixTimeMs};

// --- Event enum: shell intents first, capability callbacks last ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    /// Sent once by the shell when it comes up. Performs the startup fetch.
    Start {
        config: Option<FeedConfig>,
    },

    // Refresh
    RefreshRequested,
    /// `interval_ms: None` uses the configured interval.
    AutoRefreshChanged {
        enabled: bool,
        interval_ms: Option<u64>,
    },

    // Filters
    MinMagnitudeChanged {
        value: f64,
    },
    SearchTextChanged {
        text: String,
    },
    SearchSubmitted,
    SearchCleared,

    // Selection
    QuakeSelected {
        id: QuakeId,
    },
    SelectionCleared,

    // Capability callbacks; never sent by a shell.
    #[serde(skip)]
    FeedFetched(Box<FetchResult>),
    #[serde(skip)]
    RefreshTick {
        timer: TimerId,
    },
    #[serde(skip)]
    FetchStamped(UnixTimeMs),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::RefreshRequested => "refresh_requested",
            Self::AutoRefreshChanged { .. } => "auto_refresh_changed",
            Self::MinMagnitudeChanged { .. } => "min_magnitude_changed",
            Self::SearchTextChanged { .. } => "search_text_changed",
            Self::SearchSubmitted => "search_submitted",
            Self::SearchCleared => "search_cleared",
            Self::QuakeSelected { .. } => "quake_selected",
            Self::SelectionCleared => "selection_cleared",
            Self::FeedFetched(_) => "feed_fetched",
            Self::RefreshTick { .. } => "refresh_tick",
            Self::FetchStamped(_) => "fetch_stamped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_events_round_trip_through_json() {
        let event = Event::QuakeSelected {
            id: QuakeId::new("us7000abcd"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
    }

    #[test]
    fn shells_cannot_forge_callbacks() {
        assert!(serde_json::from_str::<Event>(r#"{"FetchStamped":0}"#).is_err());
    }

    #[test]
    fn event_size_is_reasonable() {
        // Ensure boxing keeps the enum small.
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 128,
            "Event enum is {} bytes, box more variants",
            size
        );
    }
}
