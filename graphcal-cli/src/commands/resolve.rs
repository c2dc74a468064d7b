use anyhow::Result;
use graphcal_core::GraphCalError;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::Render;

pub fn run(ctx: &Context, raw: &str) -> Result<()> {
    let Some((rule, zone)) = ctx.resolver.resolve_with_rule(raw) else {
        return Err(GraphCalError::UnresolvableZone {
            raw: raw.to_string(),
            field: None,
        }
        .into());
    };

    println!("{}  {}", zone.name().bold(), rule.render());
    if let Some(display_name) = ctx.resolver.catalog().display_name_for(zone) {
        println!("  {}", display_name.dimmed());
    }

    Ok(())
}
