use shared::{domain::EventType, protocol::EventPayload};

use super::{
    draft::{EventDraft, Field, FieldErrors},
    validation::{parse_capacity, parse_min_age},
};

/// Location sent for online-only events that carry no venue.
pub const ONLINE_LOCATION: &str = "Online";

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Converts the draft into the body of the create/update call.
///
/// Fails only on inputs that cannot be represented on the wire; those are
/// reported per field like any other validation error.
pub fn build_payload(draft: &EventDraft) -> Result<EventPayload, FieldErrors> {
    let mut errors = FieldErrors::new();

    let capacity = parse_capacity(&draft.capacity).unwrap_or_else(|message| {
        errors.insert(Field::Capacity, message.to_string());
        None
    });
    let min_age = parse_min_age(&draft.min_age).unwrap_or_else(|message| {
        errors.insert(Field::MinAge, message.to_string());
        None
    });
    if !draft.price.is_finite() || draft.price < 0.0 {
        errors.insert(Field::Price, "Price cannot be negative".to_string());
    }
    if draft.title.trim().is_empty() {
        errors.insert(Field::Title, "Title is required".to_string());
    }
    if draft.date.trim().is_empty() {
        errors.insert(Field::Date, "Date is required".to_string());
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let location = match (non_empty(&draft.location), draft.event_type) {
        (Some(location), _) => location,
        (None, EventType::Online) => ONLINE_LOCATION.to_string(),
        (None, _) => String::new(),
    };
    let online_url = if draft.event_type.needs_online_url() {
        non_empty(&draft.online_url)
    } else {
        None
    };

    Ok(EventPayload {
        title: draft.title.trim().to_string(),
        description: non_empty(&draft.description),
        date: draft.date.trim().to_string(),
        time: non_empty(&draft.time),
        end_date: non_empty(&draft.end_date),
        end_time: non_empty(&draft.end_time),
        location,
        latitude: draft.coordinates.map(|c| c.latitude),
        longitude: draft.coordinates.map(|c| c.longitude),
        visibility: draft.visibility,
        category: draft.category,
        event_type: draft.event_type,
        price: draft.price,
        capacity,
        allow_waitlist: draft.allow_waitlist,
        require_approval: draft.require_approval,
        show_guest_list: draft.show_guest_list,
        rsvp_deadline: non_empty(&draft.rsvp_deadline),
        min_age,
        image_url: non_empty(&draft.image_url),
        online_url,
        tags: (!draft.tags.is_empty()).then(|| draft.tags.join()),
    })
}
