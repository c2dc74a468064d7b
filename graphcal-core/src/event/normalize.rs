//! Decode-time correction of event start and end times.

use chrono::Duration;
use chrono_tz::Tz;
use tracing::debug;

use crate::datetime::DateTimeTimeZone;
use crate::error::{GraphCalResult, ZoneField};
use crate::event::{CalendarEvent, WireEvent};
use crate::timezone::ZoneResolver;

/// Moves the decoded start/end pair into the organizer's zones and pins
/// all-day events to local midnight.
///
/// Only reachable through [`CalendarEvent::decode`] and the collection
/// decoder, so every event passes through here exactly once.
pub(crate) struct EventTimeNormalizer<'a> {
    resolver: &'a ZoneResolver,
}

impl<'a> EventTimeNormalizer<'a> {
    pub(crate) fn new(resolver: &'a ZoneResolver) -> Self {
        EventTimeNormalizer { resolver }
    }

    pub(crate) fn normalize(&self, wire: WireEvent) -> GraphCalResult<CalendarEvent> {
        let start = DateTimeTimeZone::from_wire(&wire.start, self.resolver)
            .map_err(|e| e.in_field(ZoneField::Start))?;
        let end = DateTimeTimeZone::from_wire(&wire.end, self.resolver)
            .map_err(|e| e.in_field(ZoneField::End))?;

        // A missing hint means the wire zone already is the intended one.
        let original_start_zone = self
            .resolve_hint(wire.original_start_time_zone.as_deref(), &wire.start.time_zone)
            .map_err(|e| e.in_field(ZoneField::OriginalStart))?;
        let original_end_zone = self
            .resolve_hint(wire.original_end_time_zone.as_deref(), &wire.end.time_zone)
            .map_err(|e| e.in_field(ZoneField::OriginalEnd))?;

        let (start, end) = self.correct(
            start.convert_to(original_start_zone),
            end.convert_to(original_end_zone),
            wire.is_all_day,
        )?;

        Ok(CalendarEvent {
            id: wire.id,
            ical_uid: wire.ical_uid,
            subject: wire.subject.unwrap_or_default(),
            body_preview: wire.body_preview,
            start,
            end,
            is_all_day: wire.is_all_day,
            original_start_zone,
            original_end_zone,
            importance: wire.importance,
            sensitivity: wire.sensitivity,
            show_as: wire.show_as,
            is_cancelled: wire.is_cancelled.unwrap_or(false),
            is_organizer: wire.is_organizer.unwrap_or(false),
            series_master_id: wire.series_master_id,
            event_type: wire.event_type,
            categories: wire.categories,
            web_link: wire.web_link,
            reminder_minutes_before_start: wire.reminder_minutes_before_start,
            created: wire.created_date_time,
            last_modified: wire.last_modified_date_time,
            transaction_id: wire.transaction_id,
            recurrence: wire.recurrence,
        })
    }

    fn resolve_hint(&self, hint: Option<&str>, fallback: &str) -> GraphCalResult<Tz> {
        self.resolver.resolve(hint.unwrap_or(fallback))
    }

    fn correct(
        &self,
        start: DateTimeTimeZone,
        end: DateTimeTimeZone,
        is_all_day: bool,
    ) -> GraphCalResult<(DateTimeTimeZone, DateTimeTimeZone)> {
        let zone = self.resolver.all_day_zone();
        if !is_all_day || zone == Tz::UTC {
            return Ok((start, end));
        }

        debug!("Pinning all-day event to local midnight in {}", zone.name());
        Ok((
            shift_to_local_midnight(start, zone)?,
            shift_to_local_midnight(end, zone)?,
        ))
    }
}

/// All-day times arrive as midnight UTC. Subtracting the zone's offset at
/// that instant turns them into midnight wall clock in `zone`.
fn shift_to_local_midnight(value: DateTimeTimeZone, zone: Tz) -> GraphCalResult<DateTimeTimeZone> {
    let in_zone = value.convert_to(zone);
    let offset = i64::from(in_zone.utc_offset().local_minus_utc());
    in_zone.shifted(-Duration::seconds(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphCalError;
    use crate::timezone::{CUSTOM_ZONE_SENTINEL, ZoneCatalog, ZoneRecord};
    use crate::datetime::WireDateTimeTimeZone;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::{America, Europe};
    use std::sync::Arc;

    fn resolver(all_day_zone: Tz) -> ZoneResolver {
        let catalog = ZoneCatalog::from_records(vec![
            ZoneRecord::new(
                "(UTC-05:00) Eastern Time (US & Canada)",
                "America/New_York",
                &["Eastern Standard Time"],
            ),
            ZoneRecord::new(
                "(UTC+01:00) Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna",
                "Europe/Berlin",
                &["W. Europe Standard Time"],
            ),
        ])
        .unwrap();
        ZoneResolver::new(Arc::new(catalog), all_day_zone)
    }

    fn wire_event(start: &str, end: &str, zone: &str) -> WireEvent {
        serde_json::from_value(serde_json::json!({
            "subject": "Test",
            "start": { "dateTime": start, "timeZone": zone },
            "end": { "dateTime": end, "timeZone": zone },
        }))
        .unwrap()
    }

    fn all_day(date: &str, next: &str) -> WireEvent {
        let mut wire = wire_event(
            &format!("{date}T00:00:00.0000000"),
            &format!("{next}T00:00:00.0000000"),
            "UTC",
        );
        wire.is_all_day = true;
        wire.original_start_time_zone = Some(CUSTOM_ZONE_SENTINEL.to_string());
        wire.original_end_time_zone = Some(CUSTOM_ZONE_SENTINEL.to_string());
        wire
    }

    fn midnight(date: &str) -> chrono::NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_start_and_end_use_their_own_hints() {
        let resolver = resolver(Tz::UTC);
        let mut wire = wire_event("2024-03-04T15:00:00", "2024-03-04T17:00:00", "UTC");
        wire.original_start_time_zone = Some("Eastern Standard Time".into());
        wire.original_end_time_zone = Some("W. Europe Standard Time".into());

        let event = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap();

        assert_eq!(event.start.zone(), America::New_York);
        assert_eq!(event.end.zone(), Europe::Berlin);
        assert_eq!(event.start.local().to_string(), "2024-03-04 10:00:00");
        assert_eq!(event.end.local().to_string(), "2024-03-04 18:00:00");
        assert_eq!(event.start.instant(), Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_hints_keep_wire_zone() {
        let resolver = resolver(Tz::UTC);
        let wire = wire_event("2024-03-04T10:00:00", "2024-03-04T11:00:00", "Eastern Standard Time");

        let event = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap();

        assert_eq!(event.original_start_zone, America::New_York);
        assert_eq!(event.start.local().to_string(), "2024-03-04 10:00:00");
    }

    #[test]
    fn test_all_day_reads_midnight_in_summer_and_winter() {
        let resolver = resolver(Europe::Berlin);

        for (date, next) in [("2024-07-15", "2024-07-16"), ("2024-01-15", "2024-01-16")] {
            let event = EventTimeNormalizer::new(&resolver)
                .normalize(all_day(date, next))
                .unwrap();

            assert_eq!(event.start.zone(), Europe::Berlin);
            assert_eq!(event.start.local(), midnight(date));
            assert_eq!(event.end.local(), midnight(next));
        }
    }

    #[test]
    fn test_all_day_offset_differs_across_dst() {
        let resolver = resolver(Europe::Berlin);
        let summer = EventTimeNormalizer::new(&resolver)
            .normalize(all_day("2024-07-15", "2024-07-16"))
            .unwrap();
        let winter = EventTimeNormalizer::new(&resolver)
            .normalize(all_day("2024-01-15", "2024-01-16"))
            .unwrap();

        assert_eq!(summer.start.instant(), Utc.with_ymd_and_hms(2024, 7, 14, 22, 0, 0).unwrap());
        assert_eq!(winter.start.instant(), Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_all_day_untouched_when_zone_is_utc() {
        let resolver = resolver(Tz::UTC);
        let event = EventTimeNormalizer::new(&resolver)
            .normalize(all_day("2024-07-15", "2024-07-16"))
            .unwrap();

        assert_eq!(event.start.zone(), Tz::UTC);
        assert_eq!(event.start.instant(), Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_timed_event_ignores_all_day_zone() {
        let resolver = resolver(Europe::Berlin);
        let wire = wire_event("2024-07-15T09:00:00", "2024-07-15T10:00:00", "UTC");

        let event = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap();

        assert_eq!(event.start.zone(), Tz::UTC);
        assert_eq!(event.start.local().to_string(), "2024-07-15 09:00:00");
    }

    #[test]
    fn test_unresolvable_hint_names_the_field() {
        let resolver = resolver(Tz::UTC);
        let mut wire = wire_event("2024-03-04T15:00:00", "2024-03-04T17:00:00", "UTC");
        wire.original_start_time_zone = Some("Eastern Standard Time".into());
        wire.original_end_time_zone = Some("Mars Standard Time".into());

        let err = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap_err();
        match err {
            GraphCalError::UnresolvableZone { raw, field } => {
                assert_eq!(raw, "Mars Standard Time");
                assert_eq!(field, Some(ZoneField::OriginalEnd));
            }
            other => panic!("Expected UnresolvableZone, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolvable_wire_zone_names_the_side() {
        let resolver = resolver(Tz::UTC);
        let mut wire = wire_event("2024-03-04T15:00:00", "2024-03-04T17:00:00", "UTC");
        wire.end = WireDateTimeTimeZone {
            date_time: "2024-03-04T17:00:00".into(),
            time_zone: "Nowhere".into(),
        };

        let err = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap_err();
        assert!(err.to_string().contains("end.timeZone"), "{err}");
    }

    #[test]
    fn test_bad_timestamp_is_a_parse_error() {
        let resolver = resolver(Tz::UTC);
        let wire = wire_event("2024-03-04 15:00", "2024-03-04T17:00:00", "UTC");

        let err = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap_err();
        assert!(matches!(
            err,
            GraphCalError::TimeParse { field: Some(ZoneField::Start), .. }
        ));
    }

    #[test]
    fn test_bad_end_timestamp_names_the_end() {
        let resolver = resolver(Tz::UTC);
        let wire = wire_event("2024-03-04T15:00:00", "2024-03-04T17:00:00.1234567890123", "UTC");

        let err = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap_err();
        assert!(matches!(
            err,
            GraphCalError::TimeParse { field: Some(ZoneField::End), .. }
        ));
        assert!(err.to_string().contains("end.dateTime"), "{err}");
    }

    #[test]
    fn test_far_future_all_day_event_is_an_error_not_a_panic() {
        let resolver = resolver(America::New_York);
        let mut wire = all_day("2024-07-15", "2024-07-16");
        wire.start.date_time = "+262142-12-31T00:00:00".to_string();

        let err = EventTimeNormalizer::new(&resolver).normalize(wire).unwrap_err();
        assert!(matches!(
            err,
            GraphCalError::TimeParse { field: Some(ZoneField::Start), .. }
        ));
    }

    #[test]
    fn test_all_day_shift_past_range_is_an_error() {
        let resolver = resolver(America::New_York);
        let last = DateTimeTimeZone::from_utc(chrono::DateTime::<Utc>::MAX_UTC, Tz::UTC);

        let result = EventTimeNormalizer::new(&resolver).correct(last, last, true);
        assert!(matches!(result, Err(GraphCalError::TimeOverflow(_))));
    }
}
