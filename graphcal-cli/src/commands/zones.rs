use anyhow::Result;
use owo_colors::OwoColorize;

use crate::context::Context;
use crate::render::Render;

pub fn run(ctx: &Context) -> Result<()> {
    let catalog = ctx.resolver.catalog();

    if catalog.is_empty() {
        println!("{}", "No zone table loaded.".dimmed());
        println!("Pass --zones <file> or set zone_table in the config.");
        return Ok(());
    }

    for entry in catalog.entries() {
        println!("{}", entry.render());
    }
    println!();
    println!("{}", format!("{} zones", catalog.len()).dimmed());

    Ok(())
}
