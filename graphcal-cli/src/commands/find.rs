use std::path::Path;

use anyhow::Result;
use graphcal_core::EventCollection;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::Render;

pub fn run(ctx: &Context, payload: &Path, transaction_id: &str) -> Result<()> {
    let json = ctx.read_payload(payload)?;
    let events = EventCollection::decode(&json, &ctx.resolver)?;

    let event = events.find_by_transaction_token(transaction_id)?;

    println!("{}", event.render());
    if let Some(id) = &event.id {
        println!("  {}", id.dimmed());
    }

    Ok(())
}
