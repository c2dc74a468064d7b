//! Raw wire zone string -> concrete zone.

use std::fmt;
use std::sync::Arc;

use chrono_tz::Tz;
use tracing::debug;

use crate::config::GraphCalConfig;
use crate::error::{GraphCalError, GraphCalResult};
use crate::timezone::catalog::ZoneCatalog;

/// Zone string the service uses for all-day events with a vendor-custom zone.
pub const CUSTOM_ZONE_SENTINEL: &str = "tzone://Microsoft/Custom";

/// One step of zone resolution. Steps are tried in [`ResolveRule::ORDER`];
/// the first that matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveRule {
    /// The custom sentinel maps to the configured all-day zone. Checked
    /// before the catalog so a colliding alias can never shadow it.
    CustomSentinel,
    CatalogAlias,
    CatalogDisplayName,
    /// Plain IANA identifier such as `Europe/Berlin` or `UTC`.
    StandardIdentifier,
}

impl ResolveRule {
    pub const ORDER: [ResolveRule; 4] = [
        ResolveRule::CustomSentinel,
        ResolveRule::CatalogAlias,
        ResolveRule::CatalogDisplayName,
        ResolveRule::StandardIdentifier,
    ];

    /// Apply this single rule, without falling through to the others.
    pub fn apply(self, resolver: &ZoneResolver, raw: &str) -> Option<Tz> {
        match self {
            ResolveRule::CustomSentinel => {
                (raw == CUSTOM_ZONE_SENTINEL).then_some(resolver.all_day_zone)
            }
            ResolveRule::CatalogAlias => resolver.catalog.lookup_by_alias(raw).map(|e| e.zone()),
            ResolveRule::CatalogDisplayName => resolver
                .catalog
                .lookup_by_display_name(raw)
                .map(|e| e.zone()),
            ResolveRule::StandardIdentifier => raw.parse::<Tz>().ok(),
        }
    }
}

impl fmt::Display for ResolveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolveRule::CustomSentinel => "custom sentinel",
            ResolveRule::CatalogAlias => "catalog alias",
            ResolveRule::CatalogDisplayName => "catalog display name",
            ResolveRule::StandardIdentifier => "standard identifier",
        };
        f.write_str(name)
    }
}

/// Resolves wire zone strings against a loaded catalog.
///
/// Build one at startup and pass it to every decode call.
#[derive(Debug, Clone)]
pub struct ZoneResolver {
    catalog: Arc<ZoneCatalog>,
    all_day_zone: Tz,
}

impl ZoneResolver {
    pub fn new(catalog: Arc<ZoneCatalog>, all_day_zone: Tz) -> Self {
        ZoneResolver {
            catalog,
            all_day_zone,
        }
    }

    pub fn from_config(catalog: Arc<ZoneCatalog>, config: &GraphCalConfig) -> GraphCalResult<Self> {
        Ok(Self::new(catalog, config.all_day_zone()?))
    }

    pub fn catalog(&self) -> &ZoneCatalog {
        &self.catalog
    }

    /// Zone applied to all-day events and to the custom sentinel.
    pub fn all_day_zone(&self) -> Tz {
        self.all_day_zone
    }

    pub fn resolve(&self, raw: &str) -> GraphCalResult<Tz> {
        self.resolve_with_rule(raw)
            .map(|(_, zone)| zone)
            .ok_or_else(|| GraphCalError::UnresolvableZone {
                raw: raw.to_string(),
                field: None,
            })
    }

    /// Like [`resolve`](Self::resolve), also reporting which rule matched.
    pub fn resolve_with_rule(&self, raw: &str) -> Option<(ResolveRule, Tz)> {
        let (rule, zone) = ResolveRule::ORDER
            .iter()
            .find_map(|rule| rule.apply(self, raw).map(|zone| (*rule, zone)))?;
        debug!("Resolved zone '{}' to {} via {}", raw, zone.name(), rule);
        Some((rule, zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::catalog::ZoneRecord;
    use chrono_tz::{America, Europe};

    fn resolver_with(records: Vec<ZoneRecord>, all_day_zone: Tz) -> ZoneResolver {
        let catalog = ZoneCatalog::from_records(records).unwrap();
        ZoneResolver::new(Arc::new(catalog), all_day_zone)
    }

    fn resolver() -> ZoneResolver {
        resolver_with(
            vec![ZoneRecord::new(
                "(UTC-05:00) Eastern Time (US & Canada)",
                "America/New_York",
                &["Eastern Standard Time"],
            )],
            Europe::Berlin,
        )
    }

    #[test]
    fn test_sentinel_resolves_to_all_day_zone() {
        let (rule, zone) = resolver().resolve_with_rule(CUSTOM_ZONE_SENTINEL).unwrap();
        assert_eq!(rule, ResolveRule::CustomSentinel);
        assert_eq!(zone, Europe::Berlin);
    }

    #[test]
    fn test_sentinel_wins_over_colliding_alias() {
        let resolver = resolver_with(
            vec![ZoneRecord::new(
                "(UTC-05:00) Eastern Time (US & Canada)",
                "America/New_York",
                &[CUSTOM_ZONE_SENTINEL],
            )],
            Europe::Berlin,
        );

        assert_eq!(resolver.resolve(CUSTOM_ZONE_SENTINEL).unwrap(), Europe::Berlin);
        // The alias rule on its own would have matched.
        assert_eq!(
            ResolveRule::CatalogAlias.apply(&resolver, CUSTOM_ZONE_SENTINEL),
            Some(America::New_York)
        );
    }

    #[test]
    fn test_alias_then_display_name_then_standard_id() {
        let resolver = resolver();

        let (rule, zone) = resolver.resolve_with_rule("Eastern Standard Time").unwrap();
        assert_eq!((rule, zone), (ResolveRule::CatalogAlias, America::New_York));

        let (rule, zone) = resolver
            .resolve_with_rule("(UTC-05:00) Eastern Time (US & Canada)")
            .unwrap();
        assert_eq!((rule, zone), (ResolveRule::CatalogDisplayName, America::New_York));

        let (rule, zone) = resolver.resolve_with_rule("America/Chicago").unwrap();
        assert_eq!((rule, zone), (ResolveRule::StandardIdentifier, America::Chicago));

        let (rule, zone) = resolver.resolve_with_rule("UTC").unwrap();
        assert_eq!((rule, zone), (ResolveRule::StandardIdentifier, Tz::UTC));
    }

    #[test]
    fn test_each_rule_is_independent() {
        let resolver = resolver();
        assert_eq!(ResolveRule::CustomSentinel.apply(&resolver, "Eastern Standard Time"), None);
        assert_eq!(ResolveRule::CatalogDisplayName.apply(&resolver, "Eastern Standard Time"), None);
        assert_eq!(ResolveRule::StandardIdentifier.apply(&resolver, "Eastern Standard Time"), None);
        assert_eq!(ResolveRule::CatalogAlias.apply(&resolver, "America/New_York"), None);
    }

    #[test]
    fn test_unknown_zone_fails_with_raw_string() {
        let err = resolver().resolve("Atlantis Standard Time").unwrap_err();
        match err {
            GraphCalError::UnresolvableZone { raw, field } => {
                assert_eq!(raw, "Atlantis Standard Time");
                assert_eq!(field, None);
            }
            other => panic!("Expected UnresolvableZone, got {:?}", other),
        }
    }

    #[test]
    fn test_no_case_folding_for_standard_ids() {
        assert!(resolver().resolve("europe/berlin").is_err());
    }
}
