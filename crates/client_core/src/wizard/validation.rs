//! Per-step rules. Every function here is a pure function of the draft.

use crate::fields::{looks_like_image, parse_date, parse_time, validate_web_url};

use super::draft::{EventDraft, Field, FieldErrors};

pub const MIN_TITLE_LEN: usize = 3;

pub fn validate_step(step: u8, draft: &EventDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match step {
        1 => basics(draft, &mut errors),
        3 => schedule_and_place(draft, &mut errors),
        4 => settings(draft, &mut errors),
        5 => media(draft, &mut errors),
        _ => {}
    }
    errors
}

fn basics(draft: &EventDraft, errors: &mut FieldErrors) {
    let title = draft.title.trim();
    if title.is_empty() {
        errors.insert(Field::Title, "Title is required".to_string());
    } else if title.chars().count() < MIN_TITLE_LEN {
        errors.insert(
            Field::Title,
            format!("Title must be at least {MIN_TITLE_LEN} characters"),
        );
    }
}

fn schedule_and_place(draft: &EventDraft, errors: &mut FieldErrors) {
    let start_date = if draft.date.trim().is_empty() {
        errors.insert(Field::Date, "Date is required".to_string());
        None
    } else {
        let parsed = parse_date(&draft.date);
        if parsed.is_none() {
            errors.insert(
                Field::Date,
                "Date must be a valid calendar date (YYYY-MM-DD)".to_string(),
            );
        }
        parsed
    };

    let start_time = if draft.time.trim().is_empty() {
        errors.insert(Field::Time, "Time is required".to_string());
        None
    } else {
        let parsed = parse_time(&draft.time);
        if parsed.is_none() {
            errors.insert(Field::Time, "Time must be in HH:MM format".to_string());
        }
        parsed
    };

    if draft.event_type.needs_location() && draft.location.trim().is_empty() {
        errors.insert(
            Field::Location,
            "Location is required for in-person events".to_string(),
        );
    }

    if draft.event_type.needs_online_url() {
        if draft.online_url.trim().is_empty() {
            errors.insert(
                Field::OnlineUrl,
                "Meeting link is required for online events".to_string(),
            );
        } else if let Err(err) = validate_web_url(&draft.online_url) {
            errors.insert(Field::OnlineUrl, format!("Meeting link is invalid: {err}"));
        }
    }

    let end_date = if draft.end_date.trim().is_empty() {
        start_date
    } else {
        match parse_date(&draft.end_date) {
            Some(end) => {
                if start_date.is_some_and(|start| end < start) {
                    errors.insert(
                        Field::EndDate,
                        "End date cannot be before the start date".to_string(),
                    );
                }
                Some(end)
            }
            None => {
                errors.insert(
                    Field::EndDate,
                    "End date must be a valid calendar date (YYYY-MM-DD)".to_string(),
                );
                None
            }
        }
    };

    if !draft.end_time.trim().is_empty() {
        match parse_time(&draft.end_time) {
            Some(end) => {
                let same_day = start_date.is_some() && start_date == end_date;
                if same_day && start_time.is_some_and(|start| end <= start) {
                    errors.insert(
                        Field::EndTime,
                        "End time must be after the start time".to_string(),
                    );
                }
            }
            None => {
                errors.insert(Field::EndTime, "End time must be in HH:MM format".to_string());
            }
        }
    }
}

fn settings(draft: &EventDraft, errors: &mut FieldErrors) {
    if let Err(message) = parse_capacity(&draft.capacity) {
        errors.insert(Field::Capacity, message.to_string());
    }

    if !draft.price.is_finite() || draft.price < 0.0 {
        errors.insert(Field::Price, "Price cannot be negative".to_string());
    }

    if let Err(message) = parse_min_age(&draft.min_age) {
        errors.insert(Field::MinAge, message.to_string());
    }

    if !draft.rsvp_deadline.trim().is_empty() {
        match parse_date(&draft.rsvp_deadline) {
            Some(deadline) => {
                if parse_date(&draft.date).is_some_and(|event_date| deadline > event_date) {
                    errors.insert(
                        Field::RsvpDeadline,
                        "RSVP deadline must be on or before the event date".to_string(),
                    );
                }
            }
            None => {
                errors.insert(
                    Field::RsvpDeadline,
                    "RSVP deadline must be a valid calendar date (YYYY-MM-DD)".to_string(),
                );
            }
        }
    }
}

/// The image link is optional; when given it must point at an image file.
fn media(draft: &EventDraft, errors: &mut FieldErrors) {
    let raw = draft.image_url.trim();
    if raw.is_empty() {
        return;
    }
    match validate_web_url(raw) {
        Ok(url) if looks_like_image(&url) => {}
        Ok(_) => {
            errors.insert(
                Field::ImageUrl,
                "Image link must point to a png, jpg, gif, webp, svg or avif file".to_string(),
            );
        }
        Err(err) => {
            errors.insert(Field::ImageUrl, format!("Image link is invalid: {err}"));
        }
    }
}

/// Empty input means "no limit".
pub(crate) fn parse_capacity(raw: &str) -> Result<Option<u32>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<i64>() {
        Ok(value) if value < 1 => Err("Capacity must be at least 1"),
        Ok(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| "Capacity is too large"),
        Err(_) => Err("Capacity must be a whole number"),
    }
}

pub(crate) fn parse_min_age(raw: &str) -> Result<Option<u32>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| "Minimum age must be a whole number")
}
