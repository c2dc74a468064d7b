//! Zone table read from a JSON export of the service's table.

use std::path::PathBuf;

use graphcal_core::{GraphCalError, GraphCalResult, ZoneRecord, ZoneTableProvider};

/// A file holding `[{ "displayName", "standardId", "aliases": [..] }, ...]`.
pub struct FileZoneTable {
    path: PathBuf,
}

impl FileZoneTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileZoneTable { path: path.into() }
    }
}

impl ZoneTableProvider for FileZoneTable {
    fn fetch_zone_table(&self) -> GraphCalResult<Vec<ZoneRecord>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            GraphCalError::Fetch(format!("Could not read {}: {e}", self.path.display()))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            GraphCalError::Fetch(format!("Invalid zone table {}: {e}", self.path.display()))
        })
    }
}
