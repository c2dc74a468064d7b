//! Start-ordered collections of events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{GraphCalError, GraphCalResult};
use crate::event::{CalendarEvent, WireEvent};
use crate::timezone::ZoneResolver;

/// List envelope the service wraps event collections in.
#[derive(Deserialize)]
struct ListEnvelope {
    value: Vec<WireEvent>,
}

/// Events kept in ascending start-instant order.
///
/// Every way of adding events re-establishes the ordering, so queries can
/// rely on it without an explicit sort.
#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    events: Vec<CalendarEvent>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<CalendarEvent>) -> Self {
        let mut collection = EventCollection { events };
        collection.sort_by_start();
        collection
    }

    /// Decode a `{"value": [...]}` payload, normalizing each event once.
    ///
    /// The first event that fails aborts the whole decode.
    pub fn decode(json: &str, resolver: &ZoneResolver) -> GraphCalResult<Self> {
        let envelope: ListEnvelope = serde_json::from_str(json)?;

        let events = envelope
            .value
            .into_iter()
            .enumerate()
            .map(|(index, wire)| {
                let id = wire.id.clone().unwrap_or_else(|| format!("#{index}"));
                CalendarEvent::from_wire(wire, resolver).map_err(|e| GraphCalError::Event {
                    id,
                    source: Box::new(e),
                })
            })
            .collect::<GraphCalResult<Vec<_>>>()?;

        debug!("Decoded {} events", events.len());
        Ok(Self::from_events(events))
    }

    /// Stable ascending sort by start instant.
    pub fn sort_by_start(&mut self) {
        self.events.sort_by_key(|e| e.start.instant());
    }

    /// Events whose closed `[start, end]` interval contains `instant`.
    pub fn events_at(
        &self,
        instant: DateTime<Utc>,
    ) -> impl Iterator<Item = &CalendarEvent> + Clone + '_ {
        self.events.iter().filter(move |e| e.contains(instant))
    }

    /// First event carrying `token` as its transaction id.
    pub fn find_by_transaction_token(&self, token: &str) -> GraphCalResult<&CalendarEvent> {
        self.events
            .iter()
            .find(|e| e.transaction_id.as_deref() == Some(token))
            .ok_or_else(|| GraphCalError::TransactionNotFound(token.to_string()))
    }

    /// Insert after any events with the same start.
    pub fn push(&mut self, event: CalendarEvent) {
        let start = event.start.instant();
        let index = self.events.partition_point(|e| e.start.instant() <= start);
        self.events.insert(index, event);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalendarEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[CalendarEvent] {
        &self.events
    }
}

/// Order-insensitive: each event must be matched by a distinct equal event
/// on the other side.
impl PartialEq for EventCollection {
    fn eq(&self, other: &Self) -> bool {
        if self.events.len() != other.events.len() {
            return false;
        }

        let mut used = vec![false; other.events.len()];
        self.events.iter().all(|event| {
            let found = other
                .events
                .iter()
                .enumerate()
                .position(|(i, candidate)| !used[i] && candidate == event);
            match found {
                Some(i) => {
                    used[i] = true;
                    true
                }
                None => false,
            }
        })
    }
}

impl Extend<CalendarEvent> for EventCollection {
    fn extend<I: IntoIterator<Item = CalendarEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
        self.sort_by_start();
    }
}

impl FromIterator<CalendarEvent> for EventCollection {
    fn from_iter<I: IntoIterator<Item = CalendarEvent>>(iter: I) -> Self {
        Self::from_events(iter.into_iter().collect())
    }
}

impl IntoIterator for EventCollection {
    type Item = CalendarEvent;
    type IntoIter = std::vec::IntoIter<CalendarEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventCollection {
    type Item = &'a CalendarEvent;
    type IntoIter = std::slice::Iter<'a, CalendarEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl fmt::Display for EventCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "{event}")?;
        }
        Ok(())
    }
}
