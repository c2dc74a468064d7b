//! Time and zone normalization for calendar events.
//!
//! This crate turns the calendar service's event payloads into typed events:
//! - `timezone` resolves the service's zone strings against its zone table
//! - `datetime` pairs an instant with its display zone and owns the wire form
//! - `event` decodes events and corrects their start/end times once
//! - `collection` keeps events start-ordered for point-in-time queries

pub mod collection;
pub mod config;
pub mod datetime;
pub mod error;
pub mod event;
pub mod timezone;

pub use collection::EventCollection;
pub use config::GraphCalConfig;
pub use datetime::{DateTimeTimeZone, WireDateTimeTimeZone};
pub use error::{GraphCalError, GraphCalResult, ZoneField};
pub use event::{CalendarEvent, Importance, Sensitivity, ShowAs, WireEvent};
pub use timezone::{
    CUSTOM_ZONE_SENTINEL, CatalogCache, ResolveRule, ZoneCatalog, ZoneEntry, ZoneRecord,
    ZoneResolver, ZoneTableProvider,
};
