//! Feed acquisition and normalization.
//!
//! [`FeedClient`] issues the one GET against the configured endpoint through
//! the HTTP capability and turns the answer into [`QuakeRecord`]s. It never
//! touches the model; the caller decides what to do with the outcome.
//!
//! Decoding is deliberately lenient per feature and strict per payload:
//! a body that is not JSON, or whose shape is wrong at the top, fails the
//! whole fetch as [`FetchError::Malformed`], while a single bad feature is
//! dropped and the rest of the batch survives.

use std::collections::HashSet;

use crux_http::Http;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::FeedUrl;
use crate::model::{LatLon, QuakeId, QuakeRecord, UnixTimeMs};

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    #[error("network unavailable: {reason}")]
    NetworkUnavailable { reason: String },

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("malformed feed: {reason}")]
    Malformed { reason: String },
}

impl FetchError {
    /// Whether a later refresh has a reasonable chance of succeeding.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkUnavailable { .. } => true,
            Self::HttpStatus(status) => *status == 408 || *status == 429 || *status >= 500,
            Self::Malformed { .. } => false,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NetworkUnavailable { .. } => "NETWORK_UNAVAILABLE",
            Self::HttpStatus(_) => "HTTP_STATUS",
            Self::Malformed { .. } => "MALFORMED_FEED",
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

pub type FetchResult = Result<Vec<QuakeRecord>, FetchError>;

/// Normalized records plus how many raw features were thrown away.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedBatch {
    pub records: Vec<QuakeRecord>,
    pub dropped: usize,
}

pub struct FeedClient<'a> {
    endpoint: &'a FeedUrl,
}

impl<'a> FeedClient<'a> {
    pub fn new(endpoint: &'a FeedUrl) -> Self {
        Self { endpoint }
    }

    /// Requests the feed and reports the outcome as `make_event(result)`.
    pub fn fetch_all<Ev, F>(&self, http: &Http<Ev>, make_event: F)
    where
        Ev: 'static,
        F: FnOnce(FetchResult) -> Ev + Send + 'static,
    {
        debug!(endpoint = %self.endpoint, "requesting feed");
        http.get(self.endpoint.as_str())
            .send(move |result| make_event(interpret(result)));
    }
}

/// `crux_http` reports 4xx/5xx as `Error::Http` before a response exists,
/// so status failures are recovered from the error side.
fn interpret(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> FetchResult {
    let mut response = match result {
        Ok(response) => response,
        Err(crux_http::Error::Http(e)) => return Err(FetchError::HttpStatus(e.code.into())),
        Err(e) => {
            return Err(FetchError::NetworkUnavailable {
                reason: e.to_string(),
            })
        }
    };
    let status: u16 = response.status().into();
    let body = response.take_body().unwrap_or_default();
    decode(status, &body)
}

/// Status check followed by [`parse_feed`].
pub fn decode(status: u16, body: &[u8]) -> FetchResult {
    if !(200..300).contains(&status) {
        return Err(FetchError::HttpStatus(status));
    }
    let batch = parse_feed(body)?;
    if batch.dropped > 0 {
        debug!(dropped = batch.dropped, kept = batch.records.len(), "dropped malformed features");
    }
    Ok(batch.records)
}

pub fn parse_feed(body: &[u8]) -> Result<FeedBatch, FetchError> {
    let document: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::malformed(e.to_string()))?;

    let Value::Object(mut root) = document else {
        return Err(FetchError::malformed("top-level value is not an object"));
    };

    let features = match root.remove("features") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(features)) => features,
        Some(_) => return Err(FetchError::malformed("`features` is not an array")),
    };

    Ok(normalize(&features))
}

/// First occurrence of an id wins; later duplicates count as dropped.
pub fn normalize(features: &[Value]) -> FeedBatch {
    let mut seen = HashSet::with_capacity(features.len());
    let mut records = Vec::with_capacity(features.len());

    for feature in features {
        if let Some(record) = normalize_feature(feature) {
            if seen.insert(record.id.clone()) {
                records.push(record);
            }
        }
    }

    let dropped = features.len() - records.len();
    FeedBatch { records, dropped }
}

/// `None` only when the feature has no usable identity. Every other
/// missing or ill-typed field becomes absent on the record.
pub fn normalize_feature(feature: &Value) -> Option<QuakeRecord> {
    let feature = feature.as_object()?;
    let id = feature_id(feature.get("id")?)?;

    let properties = feature.get("properties").and_then(Value::as_object);

    let position = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(Value::as_array);

    Some(QuakeRecord {
        id,
        magnitude: property(properties, "mag").and_then(finite),
        place: text(property(properties, "place")),
        occurred_at: property(properties, "time")
            .and_then(finite)
            .map(|ms| UnixTimeMs(ms.trunc() as i64)),
        details_url: text(property(properties, "url")),
        depth_km: position.and_then(|p| p.get(2)).and_then(finite),
        coordinates: position.and_then(|p| lat_lon(p)),
    })
}

fn feature_id(value: &Value) -> Option<QuakeId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(QuakeId::new(s.as_str())),
        Value::Number(n) => Some(QuakeId::new(n.to_string())),
        _ => None,
    }
}

fn property<'a>(properties: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    properties.and_then(|p| p.get(key))
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn text(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_owned()
}

// GeoJSON positions are [lon, lat, depth].
fn lat_lon(position: &[Value]) -> Option<LatLon> {
    let lon = finite(position.first()?)?;
    let lat = finite(position.get(1)?)?;
    LatLon::new(lat, lon)
}
