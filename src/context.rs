//! Application context
//!
//! Owns the single cache instance, the API client, and the resolver built
//! from them. Constructed once at startup and passed by reference to every
//! consumer; nothing in this crate reaches for a hidden global.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::cache::{CacheTtl, TtlCache};
use crate::client::{LookupApi, RestClient};
use crate::config::Config;
use crate::error::Result;
use crate::resolver::StructuralResolver;
use crate::search::{FieldAccessor, SelectConfig};

/// Root context wiring the cache, client, and resolver together.
pub struct AppContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Process-wide TTL cache
    pub cache: Arc<TtlCache>,
    /// Lookup API client
    pub api: Arc<dyn LookupApi>,
    /// Structural data resolver over the cache and client
    pub resolver: StructuralResolver,
    sweeper: JoinHandle<()>,
}

impl AppContext {
    /// Build the context: validate config, construct the HTTP client and
    /// cache, start the periodic cache sweep, and wire up the resolver.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(TtlCache::default());
        let sweeper = cache.spawn_sweeper(CacheTtl::SWEEP_INTERVAL);

        let api: Arc<dyn LookupApi> = Arc::new(RestClient::new(&config)?);
        let resolver = StructuralResolver::new(Arc::clone(&api), Arc::clone(&cache));

        Ok(Self {
            config,
            cache,
            api,
            resolver,
            sweeper,
        })
    }

    /// Select configuration pre-wired with the user's configured search
    /// limit; callers layer their own filters and callbacks on top.
    pub fn select_config<T>(
        &self,
        endpoint: impl Into<String>,
        search_param: impl Into<String>,
        label: FieldAccessor<T>,
        identity: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> SelectConfig<T> {
        SelectConfig::new(endpoint, search_param, label, identity)
            .limit(self.config.preferences.search_limit)
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
