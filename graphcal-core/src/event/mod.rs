//! Calendar events as returned by the service.
//!
//! A [`CalendarEvent`] is only ever built in two ways: decoded from a
//! service payload (which runs the time normalizer exactly once) or
//! constructed by the application before a create call.

mod normalize;
pub mod recurrence;

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::datetime::{DateTimeTimeZone, WireDateTimeTimeZone};
use crate::error::GraphCalResult;
use crate::timezone::{ZoneCatalog, ZoneResolver};

pub(crate) use normalize::EventTimeNormalizer;
pub use recurrence::{
    DayOfWeek, PatternedRecurrence, RecurrencePattern, RecurrencePatternType, RecurrenceRange,
    RecurrenceRangeType, WeekIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Importance {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sensitivity {
    Normal,
    Personal,
    Private,
    Confidential,
}

/// Free/busy status shown for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShowAs {
    Free,
    Tentative,
    Busy,
    Oof,
    WorkingElsewhere,
    Unknown,
}

/// An event resource with the service's field names.
///
/// Decoding goes through [`CalendarEvent::decode`]; this type is also what
/// [`CalendarEvent::to_wire`] produces for create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "iCalUId", default, skip_serializing_if = "Option::is_none")]
    pub ical_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_preview: Option<String>,

    pub start: WireDateTimeTimeZone,
    pub end: WireDateTimeTimeZone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_start_time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_end_time_zone: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Sensitivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_as: Option<ShowAs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cancelled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_organizer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_master_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_minutes_before_start: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    #[serde(alias = "TransactionId", default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<PatternedRecurrence>,
}

/// A calendar event with normalized start and end times.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub ical_uid: Option<String>,
    pub subject: String,
    pub body_preview: Option<String>,

    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub is_all_day: bool,
    /// Zone the organizer created the start in. Kept for provenance; the
    /// start above already reflects it.
    pub original_start_zone: Tz,
    pub original_end_zone: Tz,

    pub importance: Option<Importance>,
    pub sensitivity: Option<Sensitivity>,
    pub show_as: Option<ShowAs>,
    pub is_cancelled: bool,
    pub is_organizer: bool,
    pub series_master_id: Option<String>,
    pub event_type: Option<String>,
    pub categories: Vec<String>,
    pub web_link: Option<String>,
    pub reminder_minutes_before_start: Option<i32>,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,

    /// Client-chosen token for finding the event again after creation.
    pub transaction_id: Option<String>,
    pub recurrence: Option<PatternedRecurrence>,
}

impl CalendarEvent {
    /// A new timed event, ready to be sent with a create call.
    pub fn new(subject: impl Into<String>, start: DateTimeTimeZone, end: DateTimeTimeZone) -> Self {
        CalendarEvent {
            id: None,
            ical_uid: None,
            subject: subject.into(),
            body_preview: None,
            original_start_zone: start.zone(),
            original_end_zone: end.zone(),
            start,
            end,
            is_all_day: false,
            importance: None,
            sensitivity: None,
            show_as: None,
            is_cancelled: false,
            is_organizer: true,
            series_master_id: None,
            event_type: None,
            categories: Vec::new(),
            web_link: None,
            reminder_minutes_before_start: None,
            created: None,
            last_modified: None,
            transaction_id: None,
            recurrence: None,
        }
    }

    pub fn with_transaction_id(mut self, token: impl Into<String>) -> Self {
        self.transaction_id = Some(token.into());
        self
    }

    /// Mark as all-day. Start and end should sit on local midnight.
    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    /// Decode a single event payload and normalize its times.
    pub fn decode(json: &str, resolver: &ZoneResolver) -> GraphCalResult<Self> {
        let wire: WireEvent = serde_json::from_str(json)?;
        Self::from_wire(wire, resolver)
    }

    pub(crate) fn from_wire(wire: WireEvent, resolver: &ZoneResolver) -> GraphCalResult<Self> {
        EventTimeNormalizer::new(resolver).normalize(wire)
    }

    /// Encode for a create or update request.
    ///
    /// Times are written as display-zone wall clock with the zone's display
    /// name. Read-only fields are left out.
    pub fn to_wire(&self, catalog: &ZoneCatalog) -> WireEvent {
        WireEvent {
            id: None,
            ical_uid: None,
            subject: Some(self.subject.clone()),
            body_preview: None,
            start: self.start.serialize(catalog),
            end: self.end.serialize(catalog),
            original_start_time_zone: None,
            original_end_time_zone: None,
            is_all_day: self.is_all_day,
            importance: self.importance,
            sensitivity: self.sensitivity,
            show_as: self.show_as,
            is_cancelled: None,
            is_organizer: None,
            series_master_id: None,
            event_type: None,
            categories: self.categories.clone(),
            web_link: None,
            reminder_minutes_before_start: self.reminder_minutes_before_start,
            created_date_time: None,
            last_modified_date_time: None,
            transaction_id: self.transaction_id.clone(),
            recurrence: self.recurrence.clone(),
        }
    }

    /// Closed-interval containment: an event touching `instant` at either
    /// end counts.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.instant() <= instant && instant <= self.end.instant()
    }

    pub fn duration(&self) -> Duration {
        self.end.instant() - self.start.instant()
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} [{} - {}] }}", self.subject, self.start, self.end)
    }
}
