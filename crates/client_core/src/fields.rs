//! Standalone form-field helpers: date/time parsing, tag and guest lists,
//! URL checks. Each keeps only its own state.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use url::Url;

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LEN: usize = 30;
pub const TAG_DELIMITER: char = ',';

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "avif"];

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parses a 24h `HH:MM` time of day; the API also echoes `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("not a valid URL")]
    Malformed,
    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,
    #[error("URL has no host")]
    MissingHost,
}

/// Accepts absolute `http`/`https` URLs that name a host.
pub fn validate_web_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|_| UrlError::Malformed)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme);
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }
    Ok(url)
}

pub fn looks_like_image(url: &Url) -> bool {
    url.path()
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag is empty")]
    Empty,
    #[error("tag is longer than {} characters", MAX_TAG_LEN)]
    TooLong,
    #[error("at most {} tags are allowed", MAX_TAGS)]
    LimitReached,
    #[error("tag already added")]
    Duplicate,
}

/// Ordered, de-duplicated, lower-cased tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a delimited string, silently dropping entries the
    /// set would reject.
    pub fn parse(delimited: &str) -> Self {
        let mut set = Self::new();
        for raw in delimited.split(TAG_DELIMITER) {
            let _ = set.add(raw);
        }
        set
    }

    pub fn add(&mut self, raw: &str) -> Result<(), TagError> {
        let tag = raw.trim().trim_start_matches('#').trim().to_lowercase();
        if tag.is_empty() {
            return Err(TagError::Empty);
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(TagError::TooLong);
        }
        if self.tags.contains(&tag) {
            return Err(TagError::Duplicate);
        }
        if self.tags.len() >= MAX_TAGS {
            return Err(TagError::LimitReached);
        }
        self.tags.push(tag);
        Ok(())
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let needle = tag.trim().to_lowercase();
        let before = self.tags.len();
        self.tags.retain(|existing| *existing != needle);
        before != self.tags.len()
    }

    pub fn join(&self) -> String {
        self.tags.join(&TAG_DELIMITER.to_string())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("\"{0}\" is not a valid email address")]
    Invalid(String),
    #[error("{0} is already on the guest list")]
    Duplicate(String),
}

pub fn is_valid_email(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && tld.len() >= 2 && !name.ends_with('.'),
        None => false,
    }
}

/// Guests to invite once the event exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestList {
    emails: Vec<String>,
}

impl GuestList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, raw: &str) -> Result<(), EmailError> {
        let email = raw.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(EmailError::Invalid(raw.trim().to_string()));
        }
        if self.emails.contains(&email) {
            return Err(EmailError::Duplicate(email));
        }
        self.emails.push(email);
        Ok(())
    }

    /// Adds every address, returning the ones that were rejected.
    pub fn extend<'a>(&mut self, raws: impl IntoIterator<Item = &'a str>) -> Vec<EmailError> {
        raws.into_iter()
            .filter_map(|raw| self.add(raw).err())
            .collect()
    }

    pub fn remove(&mut self, email: &str) -> bool {
        let needle = email.trim().to_lowercase();
        let before = self.emails.len();
        self.emails.retain(|existing| *existing != needle);
        before != self.emails.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.emails
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/fields_tests.rs"]
mod tests;
