use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use graphcal_core::{DateTimeTimeZone, EventCollection};
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::Render;

pub fn run(ctx: &Context, payload: &Path, at: Option<&str>, zone: Option<&str>) -> Result<()> {
    let json = ctx.read_payload(payload)?;
    let events = EventCollection::decode(&json, &ctx.resolver)?;

    let instant = at.map(|at| parse_instant(ctx, at, zone.unwrap_or("UTC"))).transpose()?;

    let shown: Vec<_> = match instant {
        Some(instant) => events.events_at(instant).collect(),
        None => events.iter().collect(),
    };

    if shown.is_empty() {
        println!("{}", "No events".dimmed());
        return Ok(());
    }

    for event in &shown {
        println!("{}", event.render());
    }

    Ok(())
}

fn parse_instant(ctx: &Context, at: &str, zone: &str) -> Result<DateTime<Utc>> {
    let zone = ctx.resolver.resolve(zone)?;
    let local = NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("Invalid --at '{at}', expected YYYY-MM-DDTHH:MM:SS"))?;

    Ok(DateTimeTimeZone::from_local(local, zone).instant())
}
