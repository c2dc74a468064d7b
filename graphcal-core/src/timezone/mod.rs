//! Zone catalog and resolution of the service's zone strings.

pub mod catalog;
pub mod resolver;

pub use catalog::{CatalogCache, ZoneCatalog, ZoneEntry, ZoneRecord, ZoneTableProvider};
pub use resolver::{CUSTOM_ZONE_SENTINEL, ResolveRule, ZoneResolver};
