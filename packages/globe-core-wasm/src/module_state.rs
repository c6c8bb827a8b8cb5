use lazy_static::lazy_static;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;

use crate::membership::MembershipIndex;
use crate::models::CacheStats;

// Last membership index built, with the key it was built for
struct CachedIndex {
    key: String,
    index: Arc<MembershipIndex>,
}

// Module state to keep cached resources between calls from JavaScript.
// Only the most recent index is kept: loading a new border dataset replaces
// the previous one.
pub struct ModuleState {
    membership: Option<CachedIndex>,

    // Stats
    pub cache_hits: usize,
    pub cache_misses: usize,
}

// Create a global static instance of the module state
lazy_static! {
    static ref MODULE_STATE: ReentrantMutex<RefCell<ModuleState>> =
        ReentrantMutex::new(RefCell::new(ModuleState::new()));
}

impl Default for ModuleState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            membership: None,
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let mut borrow = guard.borrow_mut();
        f(&mut borrow)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let borrow = guard.borrow();
        f(&borrow)
    }

    // Cached index if it was built for `key`
    pub fn get_membership(&mut self, key: &str) -> Option<Arc<MembershipIndex>> {
        match &self.membership {
            Some(cached) if cached.key == key => {
                self.cache_hits += 1;
                Some(Arc::clone(&cached.index))
            }
            _ => {
                self.cache_misses += 1;
                None
            }
        }
    }

    pub fn store_membership(&mut self, key: String, index: Arc<MembershipIndex>) {
        self.membership = Some(CachedIndex { key, index });
    }

    // Whatever index was loaded last, regardless of key
    pub fn current_membership(&self) -> Option<Arc<MembershipIndex>> {
        self.membership.as_ref().map(|cached| Arc::clone(&cached.index))
    }

    pub fn stats(&self) -> CacheStats {
        let total_requests = self.cache_hits + self.cache_misses;
        let hit_rate = if total_requests > 0 {
            self.cache_hits as f64 / total_requests as f64
        } else {
            0.0
        };
        CacheStats {
            index_loaded: self.membership.is_some(),
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            hit_rate,
        }
    }

    pub fn clear_all_caches(&mut self) {
        self.membership = None;
        self.cache_hits = 0;
        self.cache_misses = 0;
    }
}
