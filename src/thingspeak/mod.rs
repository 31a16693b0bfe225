//! ThingSpeak channel gateway: wire types, the three HTTP calls, and the
//! feed-to-readings conversion. Everything downstream works on [`Reading`]
//! arrays sorted oldest-to-newest; the external service's own ordering is
//! never relied upon.
mod parsing;
mod query;

pub use parsing::{convert_feed, convert_field};
pub use query::Gateway;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One sample of the five environmental measurements.
///
/// Serializes with the channel's canonical camelCase keys so the JSON view
/// reproduces the wire shape byte-for-value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reading {
    pub co2: f64,
    pub noise: f64,
    pub luminosity: f64,
    pub pressure: f64,
    #[serde(rename = "windSpeed")]
    pub wind_speed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One sample of a single channel field.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct FieldSample {
    pub value: f64,
    pub timestamp: Option<String>,
}

/// The feed answer also carries a channel header; nothing downstream needs
/// it, so only the entries are deserialized.
#[derive(Deserialize, Debug)]
pub struct FeedResponse {
    pub feeds: Vec<FeedEntry>,
}

/// Raw feed entry: ThingSpeak stringifies every field value.
#[derive(Deserialize, Debug)]
pub struct FeedEntry {
    pub created_at: String,
    #[serde(default)]
    pub entry_id: i64,
    pub field1: Option<String>,
    pub field2: Option<String>,
    pub field3: Option<String>,
    pub field4: Option<String>,
    pub field5: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct FieldResponse {
    pub feeds: Vec<FieldEntry>,
}

#[derive(Deserialize, Debug)]
pub struct FieldEntry {
    pub created_at: String,
    #[serde(default)]
    pub entry_id: i64,
    pub field1: Option<String>,
}

/// Transport outcome of a write. A non-2xx answer is a valid outcome, not an
/// error; callers inspect `ok`/`status` the same way the service's own
/// clients do.
#[derive(Serialize, Clone, Debug)]
pub struct WriteOutcome {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network-level failure: unreachable host, timeout, TLS trouble.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered, but not with the JSON shape we expect.
    #[error("malformed feed response: {0}")]
    Malformed(#[from] serde_json::Error),
}
