use std::{collections::BTreeMap, fmt};

use serde::Deserialize;
use shared::{
    domain::{Category, Coordinates, EventType, Visibility},
    protocol::EventRecord,
};

use crate::fields::{GuestList, TagSet};

/// Validation messages keyed by the field they belong to.
pub type FieldErrors = BTreeMap<Field, String>;

/// Every editable field of an [`EventDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Description,
    Category,
    Date,
    Time,
    EndDate,
    EndTime,
    EventType,
    Location,
    Coordinates,
    OnlineUrl,
    Visibility,
    Price,
    Capacity,
    MinAge,
    AllowWaitlist,
    RequireApproval,
    RsvpDeadline,
    ShowGuestList,
    ImageUrl,
    Tags,
    GuestEmails,
}

impl Field {
    /// Name used by the API for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Category => "category",
            Field::Date => "date",
            Field::Time => "time",
            Field::EndDate => "endDate",
            Field::EndTime => "endTime",
            Field::EventType => "eventType",
            Field::Location => "location",
            Field::Coordinates => "coordinates",
            Field::OnlineUrl => "onlineUrl",
            Field::Visibility => "visibility",
            Field::Price => "price",
            Field::Capacity => "capacity",
            Field::MinAge => "minAge",
            Field::AllowWaitlist => "allowWaitlist",
            Field::RequireApproval => "requireApproval",
            Field::RsvpDeadline => "rsvpDeadline",
            Field::ShowGuestList => "showGuestList",
            Field::ImageUrl => "imageUrl",
            Field::Tags => "tags",
            Field::GuestEmails => "guestEmails",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The event being created or edited. Text inputs are kept exactly as typed
/// and only interpreted by validation and payload conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub date: String,
    pub time: String,
    pub end_date: String,
    pub end_time: String,
    pub event_type: EventType,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub online_url: String,
    pub visibility: Visibility,
    pub price: f64,
    pub capacity: String,
    pub min_age: String,
    pub allow_waitlist: bool,
    pub require_approval: bool,
    pub rsvp_deadline: String,
    pub show_guest_list: bool,
    pub image_url: String,
    pub tags: TagSet,
    pub guest_emails: GuestList,
}

impl EventDraft {
    /// Pre-fills a draft from an event fetched for editing.
    pub fn from_record(record: &EventRecord) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let coordinates = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Self {
            title: record.title.clone(),
            description: text(&record.description),
            category: record.category,
            date: date_part(&record.date),
            time: text(&record.time),
            end_date: record.end_date.as_deref().map(date_part).unwrap_or_default(),
            end_time: text(&record.end_time),
            event_type: record.event_type,
            location: text(&record.location),
            coordinates,
            online_url: text(&record.online_url),
            visibility: record.visibility,
            price: record.price,
            capacity: record.capacity.map(|c| c.to_string()).unwrap_or_default(),
            min_age: record.min_age.map(|a| a.to_string()).unwrap_or_default(),
            allow_waitlist: record.allow_waitlist,
            require_approval: record.require_approval,
            rsvp_deadline: record
                .rsvp_deadline
                .as_deref()
                .map(date_part)
                .unwrap_or_default(),
            show_guest_list: record.show_guest_list,
            image_url: text(&record.image_url),
            tags: record.tags.as_deref().map(TagSet::parse).unwrap_or_default(),
            guest_emails: GuestList::new(),
        }
    }
}

// The API may answer with full ISO timestamps where the form wants a date.
fn date_part(raw: &str) -> String {
    raw.split('T').next().unwrap_or(raw).to_string()
}

/// A partial update of an [`EventDraft`]; `None` means the field is absent
/// from the update and left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub event_type: Option<EventType>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub online_url: Option<String>,
    pub visibility: Option<Visibility>,
    pub price: Option<f64>,
    pub capacity: Option<String>,
    pub min_age: Option<String>,
    pub allow_waitlist: Option<bool>,
    pub require_approval: Option<bool>,
    pub rsvp_deadline: Option<String>,
    pub show_guest_list: Option<bool>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub guest_emails: Option<Vec<String>>,
}

impl DraftPatch {
    /// Fields this patch sets, in declaration order.
    pub fn fields(&self) -> Vec<Field> {
        let present = [
            (self.title.is_some(), Field::Title),
            (self.description.is_some(), Field::Description),
            (self.category.is_some(), Field::Category),
            (self.date.is_some(), Field::Date),
            (self.time.is_some(), Field::Time),
            (self.end_date.is_some(), Field::EndDate),
            (self.end_time.is_some(), Field::EndTime),
            (self.event_type.is_some(), Field::EventType),
            (self.location.is_some(), Field::Location),
            (self.coordinates.is_some(), Field::Coordinates),
            (self.online_url.is_some(), Field::OnlineUrl),
            (self.visibility.is_some(), Field::Visibility),
            (self.price.is_some(), Field::Price),
            (self.capacity.is_some(), Field::Capacity),
            (self.min_age.is_some(), Field::MinAge),
            (self.allow_waitlist.is_some(), Field::AllowWaitlist),
            (self.require_approval.is_some(), Field::RequireApproval),
            (self.rsvp_deadline.is_some(), Field::RsvpDeadline),
            (self.show_guest_list.is_some(), Field::ShowGuestList),
            (self.image_url.is_some(), Field::ImageUrl),
            (self.tags.is_some(), Field::Tags),
            (self.guest_emails.is_some(), Field::GuestEmails),
        ];
        present
            .into_iter()
            .filter_map(|(is_set, field)| is_set.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Writes every present field into `draft`. Tag and guest entries the
    /// list helpers reject are returned as messages.
    pub(crate) fn apply(self, draft: &mut EventDraft) -> Vec<String> {
        let mut rejected = Vec::new();

        macro_rules! assign {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = self.$field {
                        draft.$field = value;
                    }
                )*
            };
        }

        assign!(
            title,
            description,
            category,
            date,
            time,
            end_date,
            end_time,
            event_type,
            location,
            online_url,
            visibility,
            price,
            capacity,
            min_age,
            allow_waitlist,
            require_approval,
            rsvp_deadline,
            show_guest_list,
            image_url,
        );

        if let Some(coordinates) = self.coordinates {
            draft.coordinates = Some(coordinates);
        }
        if let Some(tags) = self.tags {
            let mut set = TagSet::new();
            for tag in &tags {
                if let Err(err) = set.add(tag) {
                    rejected.push(format!("tag \"{}\": {err}", tag.trim()));
                }
            }
            draft.tags = set;
        }
        if let Some(emails) = self.guest_emails {
            let mut guests = GuestList::new();
            rejected.extend(
                guests
                    .extend(emails.iter().map(String::as_str))
                    .into_iter()
                    .map(|err| err.to_string()),
            );
            draft.guest_emails = guests;
        }

        rejected
    }
}
