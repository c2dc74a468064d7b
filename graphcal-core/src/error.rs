//! Error types for graphcal.

use std::fmt;

use thiserror::Error;

/// Which side of the wire event a failing zone or timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneField {
    Start,
    End,
    OriginalStart,
    OriginalEnd,
}

impl fmt::Display for ZoneField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ZoneField::Start => "start.timeZone",
            ZoneField::End => "end.timeZone",
            ZoneField::OriginalStart => "originalStartTimeZone",
            ZoneField::OriginalEnd => "originalEndTimeZone",
        };
        f.write_str(name)
    }
}

impl ZoneField {
    /// The timestamp key on the same side, for start and end.
    pub fn date_time_key(self) -> Option<&'static str> {
        match self {
            ZoneField::Start => Some("start.dateTime"),
            ZoneField::End => Some("end.dateTime"),
            ZoneField::OriginalStart | ZoneField::OriginalEnd => None,
        }
    }
}

fn field_suffix(field: &Option<ZoneField>) -> String {
    match field {
        Some(field) => format!(" (in {field})"),
        None => String::new(),
    }
}

fn time_field_suffix(field: &Option<ZoneField>) -> String {
    match field.and_then(ZoneField::date_time_key) {
        Some(key) => format!(" (in {key})"),
        None => String::new(),
    }
}

/// Errors that can occur while decoding and normalizing calendar data.
#[derive(Error, Debug)]
pub enum GraphCalError {
    #[error("Invalid timestamp '{value}'{}: {reason}", time_field_suffix(.field))]
    TimeParse {
        value: String,
        field: Option<ZoneField>,
        reason: String,
    },

    #[error("Time {0} moved out of the supported range")]
    TimeOverflow(String),

    #[error("Unresolvable time zone '{raw}'{}", field_suffix(.field))]
    UnresolvableZone {
        raw: String,
        field: Option<ZoneField>,
    },

    #[error("No event with transaction id '{0}'")]
    TransactionNotFound(String),

    #[error("Zone table fetch failed: {0}")]
    Fetch(String),

    #[error("Zone name '{name}' maps to more than one time zone")]
    AmbiguousZoneName { name: String },

    #[error("Event '{id}': {source}")]
    Event {
        id: String,
        #[source]
        source: Box<GraphCalError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphCalError {
    /// Attach the originating wire field to a parse or resolution failure.
    ///
    /// Other variants are returned unchanged.
    pub fn in_field(self, field: ZoneField) -> Self {
        match self {
            GraphCalError::UnresolvableZone { raw, .. } => GraphCalError::UnresolvableZone {
                raw,
                field: Some(field),
            },
            GraphCalError::TimeParse { value, reason, .. } => GraphCalError::TimeParse {
                value,
                field: Some(field),
                reason,
            },
            other => other,
        }
    }

    /// True for the "nothing matched" outcome of an identity lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphCalError::TransactionNotFound(_))
    }
}

/// Result type alias for graphcal operations.
pub type GraphCalResult<T> = Result<T, GraphCalError>;
