//! An instant paired with the zone it should be displayed in.
//!
//! On the wire the service sends a naive timestamp and a separate zone
//! string:
//!
//! ```json
//! { "dateTime": "2024-03-10T14:30:00.0000000", "timeZone": "Pacific Standard Time" }
//! ```
//!
//! The timestamp never carries an offset; it is wall-clock time in the
//! paired zone.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{GraphCalError, GraphCalResult};
use crate::timezone::{ZoneCatalog, ZoneResolver};

/// `YYYY-MM-DDTHH:MM:SS` with an optional fraction of up to nine digits.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// The `{dateTime, timeZone}` object exactly as the service sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

/// An instant and its display zone.
///
/// The wall-clock fields are derived from the instant and the zone, so
/// the two can never disagree. Equality requires the same instant *and*
/// the same zone; use [`same_instant`](Self::same_instant) to compare
/// instants only.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeTimeZone {
    value: DateTime<Tz>,
}

impl DateTimeTimeZone {
    pub fn new(value: DateTime<Tz>) -> Self {
        DateTimeTimeZone { value }
    }

    pub fn from_utc(instant: DateTime<Utc>, zone: Tz) -> Self {
        Self::new(instant.with_timezone(&zone))
    }

    /// Interpret `local` as wall-clock time in `zone`.
    ///
    /// An ambiguous wall clock (fall-back overlap) picks the earlier
    /// instant. A wall clock inside a spring-forward gap is read with the
    /// offset in effect before the gap, landing just after it.
    pub fn from_local(local: NaiveDateTime, zone: Tz) -> Self {
        let value = match zone.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => {
                let before = zone
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix();
                let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
                zone.from_utc_datetime(&utc)
            }
        };
        Self::new(value)
    }

    /// Current time, displayed in UTC.
    pub fn now() -> Self {
        Self::from_utc(Utc::now(), Tz::UTC)
    }

    /// Current time plus `duration`, displayed in UTC.
    pub fn now_add(duration: Duration) -> Self {
        Self::from_utc(Utc::now() + duration, Tz::UTC)
    }

    /// Parse a wire timestamp and zone string.
    ///
    /// The zone is resolved first; the timestamp is then read as wall-clock
    /// time in that zone. Timestamps with an explicit offset are rejected.
    pub fn parse(date_time: &str, time_zone: &str, resolver: &ZoneResolver) -> GraphCalResult<Self> {
        let zone = resolver.resolve(time_zone)?;
        let invalid = |reason: String| GraphCalError::TimeParse {
            value: date_time.to_string(),
            field: None,
            reason,
        };

        if !has_wire_shape(date_time) {
            return Err(invalid(
                "expected YYYY-MM-DDTHH:MM:SS with at most nine fraction digits".to_string(),
            ));
        }
        let local = NaiveDateTime::parse_from_str(date_time, WIRE_FORMAT)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self::from_local(local, zone))
    }

    pub fn from_wire(wire: &WireDateTimeTimeZone, resolver: &ZoneResolver) -> GraphCalResult<Self> {
        Self::parse(&wire.date_time, &wire.time_zone, resolver)
    }

    /// Wire form: display-zone wall clock plus the zone's registered
    /// display name. Zones missing from the catalog fall back to their
    /// IANA identifier.
    pub fn serialize(&self, catalog: &ZoneCatalog) -> WireDateTimeTimeZone {
        let zone = self.zone();
        let time_zone = catalog
            .display_name_for(zone)
            .unwrap_or_else(|| zone.name())
            .to_string();

        WireDateTimeTimeZone {
            date_time: self.local().format(WIRE_FORMAT).to_string(),
            time_zone,
        }
    }

    /// Same instant, displayed in `zone`.
    pub fn convert_to(&self, zone: Tz) -> Self {
        Self::new(self.value.with_timezone(&zone))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.value.with_timezone(&Utc)
    }

    pub fn zone(&self) -> Tz {
        self.value.timezone()
    }

    /// Wall-clock time in the display zone.
    pub fn local(&self) -> NaiveDateTime {
        self.value.naive_local()
    }

    /// UTC offset of the display zone at this instant.
    pub fn utc_offset(&self) -> FixedOffset {
        self.value.offset().fix()
    }

    /// Compare instants only, ignoring the display zone.
    pub fn same_instant(&self, other: &Self) -> bool {
        self.value == other.value
    }

    /// Move the instant by `delta`, keeping the display zone.
    pub fn shifted(&self, delta: Duration) -> GraphCalResult<Self> {
        self.value
            .checked_add_signed(delta)
            .map(Self::new)
            .ok_or_else(|| GraphCalError::TimeOverflow(self.to_string()))
    }
}

/// Checks the fixed-width layout chrono's `%Y` and `%.f` would otherwise
/// relax: a four-digit year and a fraction of one to nine digits.
fn has_wire_shape(date_time: &str) -> bool {
    let bytes = date_time.as_bytes();
    if bytes.len() < 19 {
        return false;
    }
    let (fixed, fraction) = bytes.split_at(19);

    let fixed_ok = fixed.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b'T',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    });

    let fraction_ok = match fraction.split_first() {
        None => true,
        Some((&b'.', digits)) => {
            (1..=9).contains(&digits.len()) && digits.iter().all(u8::is_ascii_digit)
        }
        Some(_) => false,
    };

    fixed_ok && fraction_ok
}

impl PartialEq for DateTimeTimeZone {
    fn eq(&self, other: &Self) -> bool {
        self.same_instant(other) && self.zone() == other.zone()
    }
}

impl Eq for DateTimeTimeZone {}

impl fmt::Display for DateTimeTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.value.format("%Y-%m-%dT%H:%M:%S%:z"),
            self.zone().name()
        )
    }
}
