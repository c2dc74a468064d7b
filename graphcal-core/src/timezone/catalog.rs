//! The calendar service's table of supported time zones.
//!
//! The service names zones by Windows-style aliases ("W. Europe Standard
//! Time") and by human-readable display names ("(UTC+01:00) Amsterdam,
//! Berlin, ..."). The catalog maps both back to IANA zones. It is fetched
//! once from a [`ZoneTableProvider`] and then shared read-only.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use chrono_tz::Tz;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GraphCalError, GraphCalResult};

/// One row of the zone table as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    pub display_name: String,
    pub standard_id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl ZoneRecord {
    pub fn new(display_name: &str, standard_id: &str, aliases: &[&str]) -> Self {
        ZoneRecord {
            display_name: display_name.to_string(),
            standard_id: standard_id.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Source of the zone table. Invoked at most once per [`CatalogCache`]
/// unless the cache is invalidated.
pub trait ZoneTableProvider {
    fn fetch_zone_table(&self) -> GraphCalResult<Vec<ZoneRecord>>;
}

impl<F> ZoneTableProvider for F
where
    F: Fn() -> GraphCalResult<Vec<ZoneRecord>>,
{
    fn fetch_zone_table(&self) -> GraphCalResult<Vec<ZoneRecord>> {
        self()
    }
}

/// A catalog row whose standard identifier resolved to an IANA zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    display_name: String,
    zone: Tz,
    aliases: Vec<String>,
}

impl ZoneEntry {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// Immutable lookup table over [`ZoneEntry`] values.
///
/// Lookups are exact and case-sensitive. A name that would point at two
/// different zones is rejected when the catalog is built.
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    entries: Vec<ZoneEntry>,
    by_alias: HashMap<String, usize>,
    by_display_name: HashMap<String, usize>,
    by_zone: HashMap<&'static str, usize>,
}

impl ZoneCatalog {
    /// Catalog with no entries. Resolution then falls through to IANA names.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch the table from `provider` and build a catalog from it.
    pub fn load<P>(provider: &P) -> GraphCalResult<Self>
    where
        P: ZoneTableProvider + ?Sized,
    {
        let records = provider.fetch_zone_table()?;
        let catalog = Self::from_records(records)?;
        info!("Loaded zone table with {} entries", catalog.len());
        Ok(catalog)
    }

    pub fn from_records(records: Vec<ZoneRecord>) -> GraphCalResult<Self> {
        let mut catalog = Self::default();

        for record in records {
            let zone = match record.standard_id.parse::<Tz>() {
                Ok(zone) => zone,
                Err(_) => {
                    warn!(
                        "Skipping zone '{}': unknown standard identifier '{}'",
                        record.display_name, record.standard_id
                    );
                    continue;
                }
            };

            let index = catalog.entries.len();
            let entry = ZoneEntry {
                display_name: record.display_name,
                zone,
                aliases: record.aliases,
            };

            let names = std::iter::once(&entry.display_name).map(|n| (n, true));
            let aliases = entry.aliases.iter().map(|a| (a, false));
            for (name, is_display_name) in names.chain(aliases) {
                let map = if is_display_name {
                    &mut catalog.by_display_name
                } else {
                    &mut catalog.by_alias
                };
                match map.entry(name.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(index);
                    }
                    Entry::Occupied(existing) => {
                        if catalog.entries[*existing.get()].zone != zone {
                            return Err(GraphCalError::AmbiguousZoneName { name: name.clone() });
                        }
                        debug!("Duplicate zone name '{}' ignored", name);
                    }
                }
            }

            catalog.by_zone.entry(zone.name()).or_insert(index);
            catalog.entries.push(entry);
        }

        Ok(catalog)
    }

    pub fn lookup_by_alias(&self, raw: &str) -> Option<&ZoneEntry> {
        self.by_alias.get(raw).map(|&i| &self.entries[i])
    }

    pub fn lookup_by_display_name(&self, raw: &str) -> Option<&ZoneEntry> {
        self.by_display_name.get(raw).map(|&i| &self.entries[i])
    }

    /// The display name the service expects on write for `zone`.
    ///
    /// When several rows share a zone the first registered one wins.
    pub fn display_name_for(&self, zone: Tz) -> Option<&str> {
        self.by_zone
            .get(zone.name())
            .map(|&i| self.entries[i].display_name.as_str())
    }

    pub fn entries(&self) -> &[ZoneEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide, populate-once holder for the catalog.
///
/// Concurrent first users block while a single fetch runs. A failed fetch
/// leaves the cache empty so the operation can be retried later.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cell: OnceCell<Arc<ZoneCatalog>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fetch is still required.
    pub fn is_empty(&self) -> bool {
        self.cell.get().is_none()
    }

    pub fn get(&self) -> Option<Arc<ZoneCatalog>> {
        self.cell.get().cloned()
    }

    pub fn get_or_load<P>(&self, provider: &P) -> GraphCalResult<Arc<ZoneCatalog>>
    where
        P: ZoneTableProvider + ?Sized,
    {
        self.cell
            .get_or_try_init(|| ZoneCatalog::load(provider).map(Arc::new))
            .cloned()
    }

    /// Drop the cached table so the next [`get_or_load`](Self::get_or_load)
    /// fetches again.
    pub fn invalidate(&mut self) {
        self.cell.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_records() -> Vec<ZoneRecord> {
        vec![
            ZoneRecord::new(
                "(UTC+01:00) Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna",
                "Europe/Berlin",
                &["W. Europe Standard Time"],
            ),
            ZoneRecord::new(
                "(UTC-08:00) Pacific Time (US & Canada)",
                "America/Los_Angeles",
                &["Pacific Standard Time"],
            ),
        ]
    }

    #[test]
    fn test_lookup_by_alias_and_display_name() {
        let catalog = ZoneCatalog::from_records(sample_records()).unwrap();

        let by_alias = catalog.lookup_by_alias("Pacific Standard Time").unwrap();
        assert_eq!(by_alias.zone(), chrono_tz::America::Los_Angeles);

        let by_name = catalog
            .lookup_by_display_name("(UTC-08:00) Pacific Time (US & Canada)")
            .unwrap();
        assert_eq!(by_name, by_alias);
    }

    #[test]
    fn test_lookups_are_case_sensitive() {
        let catalog = ZoneCatalog::from_records(sample_records()).unwrap();
        assert!(catalog.lookup_by_alias("pacific standard time").is_none());
        assert!(catalog.lookup_by_display_name("Pacific Standard Time").is_none());
    }

    #[test]
    fn test_display_name_for_zone() {
        let catalog = ZoneCatalog::from_records(sample_records()).unwrap();
        assert_eq!(
            catalog.display_name_for(chrono_tz::Europe::Berlin),
            Some("(UTC+01:00) Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna")
        );
        assert_eq!(catalog.display_name_for(chrono_tz::Asia::Tokyo), None);
    }

    #[test]
    fn test_ambiguous_alias_is_rejected() {
        let mut records = sample_records();
        records.push(ZoneRecord::new(
            "(UTC+01:00) Brussels, Copenhagen, Madrid, Paris",
            "Europe/Paris",
            &["W. Europe Standard Time"],
        ));

        let err = ZoneCatalog::from_records(records).unwrap_err();
        assert!(matches!(
            err,
            GraphCalError::AmbiguousZoneName { ref name } if name == "W. Europe Standard Time"
        ));
    }

    #[test]
    fn test_unknown_standard_id_is_skipped() {
        let mut records = sample_records();
        records.push(ZoneRecord::new("(UTC+13:37) Nowhere", "Nowhere/City", &["Nowhere"]));

        let catalog = ZoneCatalog::from_records(records).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup_by_alias("Nowhere").is_none());
    }

    #[test]
    fn test_cache_fetches_once_under_concurrent_first_use() {
        let fetches = AtomicUsize::new(0);
        let provider = || -> GraphCalResult<Vec<ZoneRecord>> {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(sample_records())
        };
        let cache = CatalogCache::new();
        assert!(cache.is_empty());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let catalog = cache.get_or_load(&provider).unwrap();
                    assert_eq!(catalog.len(), 2);
                });
            }
        });

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_failed_fetch_leaves_cache_empty() {
        let cache = CatalogCache::new();
        let failing = || -> GraphCalResult<Vec<ZoneRecord>> {
            Err(GraphCalError::Fetch("service unavailable".to_string()))
        };

        assert!(matches!(cache.get_or_load(&failing), Err(GraphCalError::Fetch(_))));
        assert!(cache.is_empty());

        let working = || -> GraphCalResult<Vec<ZoneRecord>> { Ok(sample_records()) };
        let catalog = cache.get_or_load(&working).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let fetches = AtomicUsize::new(0);
        let provider = || -> GraphCalResult<Vec<ZoneRecord>> {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(sample_records())
        };
        let mut cache = CatalogCache::new();

        cache.get_or_load(&provider).unwrap();
        cache.get_or_load(&provider).unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        cache.invalidate();
        assert!(cache.is_empty());
        cache.get_or_load(&provider).unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
