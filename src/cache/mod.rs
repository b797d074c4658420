//! In-memory cache for API responses
//!
//! Provides a TTL-based key-value store with lazy eviction on read and a
//! periodic background sweep. Entries live only for the process lifetime;
//! nothing is persisted.

pub mod store;

use std::time::Duration;

/// Cache TTL configuration per data type
///
/// Structural metadata (modules, field configurations) changes rarely and
/// gets a longer window than the dynamic values hanging off it.
pub struct CacheTtl;

impl CacheTtl {
    /// Module and field-configuration lookups
    pub const STRUCTURE: Duration = Duration::from_secs(10 * 60); // 10 min

    /// Dynamic data and the derived produto/porte lists
    pub const VALUES: Duration = Duration::from_secs(5 * 60); // 5 min

    /// Fallback when callers don't pick a TTL
    pub const DEFAULT: Duration = Duration::from_secs(5 * 60); // 5 min

    /// Interval between background sweeps of expired entries
    pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
}

// Re-export main types
pub use store::TtlCache;
