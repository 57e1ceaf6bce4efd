use serde::{Deserialize, Serialize};

use crate::domain::{Category, EventId, EventType, Visibility};

/// Body of `POST /events` and `PATCH /events/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub visibility: Visibility,
    pub category: Category,
    pub event_type: EventType,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub allow_waitlist: bool,
    pub require_approval: bool,
    pub show_guest_list: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_url: Option<String>,
    /// Comma-delimited tag list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// An event as returned by `GET /events` and `GET /events/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub allow_waitlist: bool,
    #[serde(default)]
    pub require_approval: bool,
    #[serde(default)]
    pub show_guest_list: bool,
    #[serde(default)]
    pub rsvp_deadline: Option<String>,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub online_url: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: EventId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteGuestRequest {
    pub email: String,
}

/// Filters for `GET /events`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
