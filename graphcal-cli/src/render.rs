//! Colored terminal rendering for graphcal types.

use graphcal_core::{CalendarEvent, DateTimeTimeZone, ResolveRule, ZoneEntry};
use owo_colors::OwoColorize;

/// Extension trait for terminal rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DateTimeTimeZone {
    fn render(&self) -> String {
        format!(
            "{} {}",
            self.local().format("%Y-%m-%d %H:%M"),
            self.zone().name().dimmed()
        )
    }
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let subject = if self.is_cancelled {
            self.subject.strikethrough().to_string()
        } else {
            self.subject.bold().to_string()
        };

        let time = if self.is_all_day {
            format!(
                "{} - {} {}",
                self.start.local().format("%Y-%m-%d"),
                self.end.local().format("%Y-%m-%d"),
                "(all day)".dimmed()
            )
        } else {
            format!("{} - {}", self.start.render(), self.end.render())
        };

        match &self.transaction_id {
            Some(token) => format!("{}  {}  {}", subject, time, token.dimmed()),
            None => format!("{}  {}", subject, time),
        }
    }
}

impl Render for ZoneEntry {
    fn render(&self) -> String {
        let mut line = format!("{}  {}", self.zone().name().bold(), self.display_name());
        if !self.aliases().is_empty() {
            line.push_str(&format!("  {}", self.aliases().join(", ").dimmed()));
        }
        line
    }
}

impl Render for ResolveRule {
    fn render(&self) -> String {
        match self {
            ResolveRule::CustomSentinel => self.to_string().yellow().to_string(),
            _ => self.to_string().green().to_string(),
        }
    }
}
