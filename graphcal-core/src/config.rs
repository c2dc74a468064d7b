//! Global graphcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{GraphCalError, GraphCalResult};

/// Setting value that selects the host's own zone.
pub const LOCAL_ZONE: &str = "local";

static DEFAULT_ALL_DAY_ZONE: &str = "UTC";

fn default_all_day_zone() -> String {
    DEFAULT_ALL_DAY_ZONE.to_string()
}

fn is_default_all_day_zone(zone: &String) -> bool {
    zone == DEFAULT_ALL_DAY_ZONE
}

/// Configuration at ~/.config/graphcal/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GraphCalConfig {
    /// Zone that all-day events are pinned to: "local", "UTC" or an IANA name.
    #[serde(
        default = "default_all_day_zone",
        skip_serializing_if = "is_default_all_day_zone"
    )]
    pub all_day_zone: String,

    /// JSON file holding the service's zone table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_table: Option<PathBuf>,
}

impl Default for GraphCalConfig {
    fn default() -> Self {
        GraphCalConfig {
            all_day_zone: default_all_day_zone(),
            zone_table: None,
        }
    }
}

impl GraphCalConfig {
    pub fn config_path() -> GraphCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GraphCalError::Config("Could not determine config directory".into()))?
            .join("graphcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> GraphCalResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> GraphCalResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> GraphCalResult<Self> {
        toml::from_str(content).map_err(|e| GraphCalError::Config(e.to_string()))
    }

    /// Write this config to `path` as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> GraphCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| GraphCalError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| GraphCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> GraphCalResult<()> {
        let contents = format!(
            "\
# graphcal configuration

# Zone that all-day events are shown in (\"{LOCAL_ZONE}\", \"UTC\" or an IANA name):
# all_day_zone = \"{DEFAULT_ALL_DAY_ZONE}\"

# Zone table exported from the calendar service:
# zone_table = \"~/.config/graphcal/zones.json\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GraphCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GraphCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Resolve `all_day_zone` to a concrete zone.
    pub fn all_day_zone(&self) -> GraphCalResult<Tz> {
        if self.all_day_zone == LOCAL_ZONE {
            return local_zone();
        }
        self.all_day_zone.parse::<Tz>().map_err(|e| {
            GraphCalError::Config(format!(
                "Unknown all_day_zone '{}': {e}",
                self.all_day_zone
            ))
        })
    }
}

fn local_zone() -> GraphCalResult<Tz> {
    let name = iana_time_zone::get_timezone()
        .map_err(|e| GraphCalError::Config(format!("Could not determine local zone: {e}")))?;
    name.parse::<Tz>()
        .map_err(|e| GraphCalError::Config(format!("Local zone '{name}' is not supported: {e}")))
}
