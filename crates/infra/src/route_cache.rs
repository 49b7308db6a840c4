//! Route-level render cache.
//!
//! Rendered documents are cached per route path and variant key (e.g. the
//! query string). Mutations invalidate a whole route so the next request
//! re-fetches from the store.
//!
//! Each route carries a generation that `invalidate` bumps. A render is
//! only stored if the route's generation is still the one read before the
//! render started fetching, so a render racing a mutation is never cached.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

/// Invalidation side of the cache, injected into mutating services.
pub trait RouteCache: Send + Sync {
    /// Mark every cached render of `route` stale.
    fn invalidate(&self, route: &str);
}

#[derive(Debug, Default)]
struct RouteEntry {
    generation: u64,
    variants: HashMap<String, JsonValue>,
}

#[derive(Debug, Default)]
pub struct InMemoryRouteCache {
    routes: RwLock<HashMap<String, RouteEntry>>,
}

impl InMemoryRouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, route: &str, key: &str) -> Option<JsonValue> {
        let routes = match self.routes.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        routes.get(route).and_then(|entry| entry.variants.get(key)).cloned()
    }

    /// Current generation of `route`. Read it before fetching a render.
    pub fn generation(&self, route: &str) -> u64 {
        let routes = match self.routes.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        routes.get(route).map(|entry| entry.generation).unwrap_or(0)
    }

    /// Store a render fetched at `generation`. Returns `false` (and stores
    /// nothing) if the route was invalidated since.
    pub fn put(&self, route: &str, key: &str, value: JsonValue, generation: u64) -> bool {
        let mut routes = match self.routes.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = routes.entry(route.to_string()).or_default();
        if entry.generation != generation {
            tracing::debug!(route, key, "discarding render fetched before invalidation");
            return false;
        }
        entry.variants.insert(key.to_string(), value);
        true
    }

    /// Number of cached variants for `route`.
    pub fn len(&self, route: &str) -> usize {
        let routes = match self.routes.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        routes.get(route).map(|entry| entry.variants.len()).unwrap_or(0)
    }
}

impl RouteCache for InMemoryRouteCache {
    fn invalidate(&self, route: &str) {
        let mut routes = match self.routes.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = routes.entry(route.to_string()).or_default();
        let dropped = entry.variants.len();
        entry.variants.clear();
        entry.generation += 1;
        tracing::debug!(route, dropped, generation = entry.generation, "route cache invalidated");
    }
}
