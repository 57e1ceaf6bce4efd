use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Backend identifier of an event. The API hands these out either as
/// strings or as bare numbers; both are kept as text on the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Social,
    Business,
    Education,
    Sports,
    Music,
    Arts,
    Technology,
    Community,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Social,
        Category::Business,
        Category::Education,
        Category::Sports,
        Category::Music,
        Category::Arts,
        Category::Technology,
        Category::Community,
        Category::Other,
    ];

    pub fn as_wire(self) -> &'static str {
        match self {
            Category::Social => "SOCIAL",
            Category::Business => "BUSINESS",
            Category::Education => "EDUCATION",
            Category::Sports => "SPORTS",
            Category::Music => "MUSIC",
            Category::Arts => "ARTS",
            Category::Technology => "TECHNOLOGY",
            Category::Community => "COMMUNITY",
            Category::Other => "OTHER",
        }
    }
}

/// How attendees take part in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[default]
    InPerson,
    Online,
    Hybrid,
}

impl EventType {
    pub fn needs_location(self) -> bool {
        !matches!(self, EventType::Online)
    }

    pub fn needs_online_url(self) -> bool {
        !matches!(self, EventType::InPerson)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
