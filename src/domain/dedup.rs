//! Scoped duplicate suppression
//!
//! The registry remembers, per scope, every identifier already handed to a list.
//! Filtering a page records the identifiers it lets through, so feeding the same
//! page twice yields nothing the second time. Identifiers are only forgotten when
//! their scope is cleared or destroyed.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{item::PageItem, scope::ScopeKey};

type Scopes = HashMap<ScopeKey, HashSet<String>>;

/// Shared, scope-partitioned set of delivered identifiers
///
/// Cloning yields another handle onto the same registry.
#[derive(Debug, Clone, Default)]
pub struct DedupRegistry {
    scopes: Arc<Mutex<Scopes>>,
}

impl DedupRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn scopes(&self) -> MutexGuard<'_, Scopes> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keep the items of `items` not yet seen in `scope`, recording their ids
    ///
    /// Items for which `id_of` returns `None` are always kept. The relative order of
    /// surviving items is preserved.
    pub fn filter_new<T, F>(&self, scope: &ScopeKey, items: Vec<T>, id_of: F) -> Vec<T>
    where
        F: Fn(&T) -> Option<String>,
    {
        let mut scopes = self.scopes();
        let seen = scopes.entry(scope.clone()).or_default();
        let before = items.len();

        let fresh: Vec<T> = items
            .into_iter()
            .filter(|item| match id_of(item) {
                Some(id) => seen.insert(id),
                None => true,
            })
            .collect();

        let dropped = before - fresh.len();
        if dropped > 0 {
            log::debug!("Dropped {dropped} duplicate item(s) in scope {scope}");
        }
        fresh
    }

    /// [`Self::filter_new`] using the item's own identifier
    pub fn filter_page<T: PageItem>(&self, scope: &ScopeKey, items: Vec<T>) -> Vec<T> {
        self.filter_new(scope, items, PageItem::item_id)
    }

    /// Forget every identifier recorded for `scope`
    ///
    /// Returns how many identifiers were forgotten.
    pub fn clear(&self, scope: &ScopeKey) -> usize {
        self.scopes()
            .get_mut(scope)
            .map(|seen| {
                let count = seen.len();
                seen.clear();
                count
            })
            .unwrap_or_default()
    }

    /// Remove `scope` from the registry altogether
    pub fn destroy(&self, scope: &ScopeKey) -> bool {
        self.scopes().remove(scope).is_some()
    }

    /// Forget all scopes
    pub fn clear_all(&self) {
        self.scopes().clear();
    }

    pub fn contains(&self, scope: &ScopeKey, id: &str) -> bool {
        self.scopes()
            .get(scope)
            .is_some_and(|seen| seen.contains(id))
    }

    /// Number of identifiers recorded for `scope`
    pub fn seen_count(&self, scope: &ScopeKey) -> usize {
        self.scopes().get(scope).map(HashSet::len).unwrap_or_default()
    }

    /// Scopes currently known to the registry, sorted
    pub fn scope_keys(&self) -> Vec<ScopeKey> {
        let mut keys: Vec<ScopeKey> = self.scopes().keys().cloned().collect();
        keys.sort();
        keys
    }
}
