//! Query cache keyed by entity kind and parent id
//!
//! Reads fill the cache; every successful write invalidates the keys it
//! touched. Nothing is updated in place, so a failed write leaves the cached
//! copy equal to what the database still holds.

use std::any::Any;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Projects,
    Phases,
    Tasks,
    ProjectTasks,
    Risks,
    Forecasts,
}

/// Identity of one cached query: the entity listed and the parent it is
/// scoped to (`None` for top-level lists)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: EntityKind,
    pub parent: Option<String>,
}

impl QueryKey {
    pub fn new(kind: EntityKind, parent: impl Into<String>) -> Self {
        Self {
            kind,
            parent: Some(parent.into()),
        }
    }

    pub fn root(kind: EntityKind) -> Self {
        Self { kind, parent: None }
    }
}

#[derive(Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Box<dyn Any + Send>>,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rows for `key`, if present and of type `T`
    pub fn get<T: Clone + 'static>(&mut self, key: &QueryKey) -> Option<T> {
        match self.entries.get(key).and_then(|v| v.downcast_ref::<T>()) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put<T: Send + 'static>(&mut self, key: QueryKey, value: T) {
        self.entries.insert(key, Box::new(value));
    }

    /// Return the cached value or load, store and return it
    pub fn get_or_load<T, F>(&mut self, key: QueryKey, load: F) -> anyhow::Result<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> anyhow::Result<T>,
    {
        if let Some(value) = self.get::<T>(&key) {
            return Ok(value);
        }
        let value = load()?;
        self.put(key, value.clone());
        Ok(value)
    }

    pub fn invalidate(&mut self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Drop every entry of `kind`, whatever its parent
    pub fn invalidate_kind(&mut self, kind: EntityKind) {
        self.entries.retain(|k, _| k.kind != kind);
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_load_loads_once() {
        let mut cache = QueryCache::new();
        let key = QueryKey::new(EntityKind::Phases, "p1");
        let mut loads = 0;

        for _ in 0..3 {
            let value: Vec<u8> = cache
                .get_or_load(key.clone(), || {
                    loads += 1;
                    Ok(vec![1, 2, 3])
                })
                .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }

        assert_eq!(loads, 1);
        assert_eq!(cache.stats(), (2, 1));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache = QueryCache::new();
        let key = QueryKey::root(EntityKind::Projects);
        let result: anyhow::Result<Vec<u8>> =
            cache.get_or_load(key.clone(), || anyhow::bail!("connection refused"));
        assert!(result.is_err());
        assert!(!cache.contains(&key));
    }

    #[test]
    fn test_invalidation_by_key_and_kind() {
        let mut cache = QueryCache::new();
        cache.put(QueryKey::new(EntityKind::Tasks, "ph1"), vec![1u8]);
        cache.put(QueryKey::new(EntityKind::Tasks, "ph2"), vec![2u8]);
        cache.put(QueryKey::new(EntityKind::Phases, "p1"), vec![3u8]);

        cache.invalidate(&QueryKey::new(EntityKind::Tasks, "ph1"));
        assert_eq!(cache.len(), 2);

        cache.invalidate_kind(EntityKind::Tasks);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&QueryKey::new(EntityKind::Phases, "p1")));
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let mut cache = QueryCache::new();
        let key = QueryKey::root(EntityKind::Risks);
        cache.put(key.clone(), 5u32);
        assert_eq!(cache.get::<String>(&key), None);
        assert_eq!(cache.get::<u32>(&key), Some(5));
    }
}
