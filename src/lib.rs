//! apolice-core - structural-data caching and remote lookup
//!
//! Client-side core for the Apolice policy administration platform:
//! a TTL cache with lazy and periodic eviction, a resolver that collapses
//! the backend's module -> field-configuration -> dynamic-data hierarchy
//! into two cached reference lists (produtos, portes), and the debounced
//! remote search controllers behind the searchable select widgets.
//!
//! The REST backend itself, persistence, and all rendering live outside
//! this crate; the only external collaborator is the lookup API described
//! by [`client::LookupApi`].

pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod resolver;
pub mod search;

pub use cache::{CacheTtl, TtlCache};
pub use client::{LookupApi, RestClient, StructuralValue};
pub use config::Config;
pub use context::AppContext;
pub use error::{ApiError, ConfigError, Error, Result};
pub use resolver::{Resolution, StructuralResolver};
pub use search::{FieldAccessor, MultiConfig, MultiSelect, SearchSelect, SelectConfig};
