//! Response model for the `/event` endpoint.
//!
//! # Design
//! The server omits fields and sends `null` freely, so every event field
//! decodes leniently: a missing or `null` value becomes the field's default.
//! Nothing is cross-checked on decode (an event may end before it starts, and
//! counters are taken as sent).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// The series (community) an event belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// How participants join an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Attendance is managed on connpass.
    Participation,
    /// Listing only; registration happens elsewhere.
    Advertisement,
    #[serde(other)]
    Other,
}

/// A single event returned by the search API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event_id", default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Short pitch shown under the title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub catch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "event_url", default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "hash_tag", default, deserialize_with = "null_as_default")]
    pub hashtag: String,
    #[serde(default)]
    pub started_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<FixedOffset>>,
    /// Participant cap; `None` when the event is unlimited.
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub event_type: Option<EventType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: Series,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub place: String,
    /// Decimal degrees as sent by the server.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lat: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_nickname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accepted: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub waiting: i64,
    #[serde(default)]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "results_returned", default, deserialize_with = "null_as_default")]
    pub returned: u64,
    #[serde(rename = "results_available", default, deserialize_with = "null_as_default")]
    pub available: u64,
    /// Offset of the first event in this page.
    #[serde(rename = "results_start", default, deserialize_with = "null_as_default")]
    pub start: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<Event>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
