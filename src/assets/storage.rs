use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::errors::Result;

// Thread-safe keyed cache exposed to the loaders.
pub struct AssetStorage<T> {
    inner: RwLock<FxHashMap<String, Arc<T>>>,
}

impl<T> Default for AssetStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for AssetStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStorage")
            .field("len", &self.len())
            .finish()
    }
}

impl<T> AssetStorage<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::default(),
        }
    }

    /// [Read] Gets a single asset.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.inner.read().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// [Write] Inserts an asset unless the key is taken. Returns the stored
    /// asset, which is the existing one when another writer got there first.
    pub fn insert(&self, key: impl Into<String>, asset: impl Into<Arc<T>>) -> Arc<T> {
        let mut guard = self.inner.write();
        guard.entry(key.into()).or_insert_with(|| asset.into()).clone()
    }

    /// [Read, then Write] Returns the cached asset or builds it with `load`.
    ///
    /// `load` runs without holding the lock, so it may recurse into this
    /// storage. Two threads missing the same key both load; the first insert
    /// wins and both get that value.
    pub fn get_or_try_insert_with<F>(&self, key: &str, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(asset) = self.get(key) {
            log::debug!("Asset cache hit: {key}");
            return Ok(asset);
        }
        log::debug!("Asset cache miss: {key}");
        let asset = load()?;
        Ok(self.insert(key, Arc::new(asset)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let storage: AssetStorage<u32> = AssetStorage::new();
        assert_eq!(*storage.insert("a", Arc::new(1u32)), 1);
        assert_eq!(*storage.insert("a", Arc::new(2u32)), 1);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn loader_runs_once_per_key() {
        let storage: AssetStorage<String> = AssetStorage::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = storage
                .get_or_try_insert_with("k", || {
                    calls += 1;
                    Ok("v".to_string())
                })
                .unwrap();
            assert_eq!(value.as_str(), "v");
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let storage: AssetStorage<String> = AssetStorage::new();
        let err = storage.get_or_try_insert_with("k", || {
            Err(crate::errors::MaterialError::AssetNotFound("k".into()))
        });
        assert!(err.is_err());
        assert!(!storage.contains("k"));
    }
}
