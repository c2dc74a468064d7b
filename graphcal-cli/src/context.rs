use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use graphcal_core::{GraphCalConfig, ZoneCatalog, ZoneResolver};
use tracing::debug;

use crate::zone_table::FileZoneTable;

/// Everything a command needs: the effective config and a resolver built
/// from it.
pub struct Context {
    pub config: GraphCalConfig,
    pub config_path: PathBuf,
    pub resolver: ZoneResolver,
}

impl Context {
    pub fn load(zones: Option<&Path>, all_day_zone: Option<&str>) -> Result<Self> {
        let config_path = GraphCalConfig::config_path()?;
        let mut config = GraphCalConfig::load_from(&config_path)
            .with_context(|| format!("Could not load {}", config_path.display()))?;

        if let Some(zones) = zones {
            config.zone_table = Some(zones.to_path_buf());
        }
        if let Some(zone) = all_day_zone {
            config.all_day_zone = zone.to_string();
        }

        let catalog = match &config.zone_table {
            Some(path) => Arc::new(ZoneCatalog::load(&FileZoneTable::new(path))?),
            None => {
                debug!("No zone table configured, only IANA names will resolve");
                Arc::new(ZoneCatalog::empty())
            }
        };

        let resolver = ZoneResolver::from_config(catalog, &config)?;

        Ok(Context {
            config,
            config_path,
            resolver,
        })
    }

    pub fn read_payload(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
    }
}
