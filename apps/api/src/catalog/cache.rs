use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use serde::Serialize;

use crate::catalog::{FacetCounts, Record};

const DEFAULT_CAPACITY: usize = 256;

/// One filtered catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub items: Vec<Record>,
    pub total: usize,
    pub facet_counts: FacetCounts,
}

/// Bounded LRU of catalog listings keyed by canonical query string.
///
/// Owned by `AppState`; tests build their own instances. Canonical keys mean
/// differently ordered URLs for the same filters share one entry.
pub struct ResultsCache {
    pages: Mutex<LruCache<String, Arc<CatalogPage>>>,
}

impl ResultsCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            pages: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached page for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> Arc<CatalogPage>
    where
        F: FnOnce() -> CatalogPage,
    {
        if let Some(page) = self.lock().get(key) {
            tracing::debug!(key, "results cache hit");
            return Arc::clone(page);
        }
        let page = Arc::new(compute());
        self.lock().put(key.to_string(), Arc::clone(&page));
        page
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<CatalogPage>>> {
        match self.pages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
