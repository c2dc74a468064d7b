use std::path::Path;

use anyhow::Result;
use graphcal_core::GraphCalConfig;
use owo_colors::OwoColorize;

use crate::context::Context;

/// Write the commented template, or a concrete config when `--zones` or
/// `--all-day-zone` were given.
pub fn init(force: bool, zones: Option<&Path>, all_day_zone: Option<&str>) -> Result<()> {
    let config_path = GraphCalConfig::config_path()?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}\n\nUse --force to overwrite it.",
            config_path.display()
        );
    }

    if zones.is_none() && all_day_zone.is_none() {
        GraphCalConfig::create_default_config(&config_path)?;
    } else {
        let mut config = GraphCalConfig::default();
        if let Some(zone) = all_day_zone {
            config.all_day_zone = zone.to_string();
        }
        // Reject an unknown zone before anything is written.
        config.all_day_zone()?;
        config.zone_table = zones.map(Path::to_path_buf);
        config.save_to(&config_path)?;
    }
    println!("Wrote {}", config_path.display().bold());

    Ok(())
}

pub fn show(ctx: &Context) -> Result<()> {
    println!("{}", "Paths".bold());
    println!("  Config:        {}", ctx.config_path.display());
    println!(
        "  Zone table:    {}",
        ctx.config
            .zone_table
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".dimmed().to_string())
    );

    println!("{}", "Zones".bold());
    println!(
        "  All-day zone:  {} {}",
        ctx.resolver.all_day_zone().name(),
        format!("({})", ctx.config.all_day_zone).dimmed()
    );
    println!("  Catalog size:  {}", ctx.resolver.catalog().len());

    Ok(())
}
