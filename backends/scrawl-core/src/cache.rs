// this_file: backends/scrawl-core/src/cache.rs

//! Font caching shared by every render call of a process.

use crate::Result;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Key for font lookups
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub weight: u16,
}

impl FontKey {
    pub fn new(family: impl Into<String>, weight: u16) -> Self {
        Self {
            family: family.into(),
            weight,
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.family, self.weight)
    }
}

/// Append-only cache of loaded faces plus the lookups that failed.
///
/// Entries are never evicted, so a face handed out once stays valid for
/// every later render.
pub struct FontCache<F: ?Sized> {
    faces: DashMap<FontKey, Arc<F>>,
    failures: DashMap<FontKey, String>,
}

impl<F: ?Sized> Default for FontCache<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> FontCache<F> {
    pub fn new() -> Self {
        Self {
            faces: DashMap::new(),
            failures: DashMap::new(),
        }
    }

    pub fn get(&self, key: &FontKey) -> Option<Arc<F>> {
        self.faces.get(key).map(|face| face.clone())
    }

    /// Reason recorded for an earlier failed load of `key`.
    pub fn failure(&self, key: &FontKey) -> Option<String> {
        self.failures.get(key).map(|reason| reason.clone())
    }

    /// Return the cached face or run `load` once to produce it.
    ///
    /// When two threads race on the same key the first insert wins and both
    /// get the same `Arc`. A failed load is remembered so later lookups
    /// return the error without touching the filesystem again.
    pub fn get_or_load<L>(&self, key: &FontKey, load: L) -> std::result::Result<Arc<F>, String>
    where
        L: FnOnce() -> Result<Arc<F>>,
    {
        if let Some(face) = self.get(key) {
            return Ok(face);
        }
        if let Some(reason) = self.failure(key) {
            return Err(reason);
        }
        match load() {
            Ok(face) => Ok(self.faces.entry(key.clone()).or_insert(face).value().clone()),
            Err(err) => {
                let reason = err.to_string();
                self.failures.insert(key.clone(), reason.clone());
                Err(reason)
            }
        }
    }

    /// Register a face under `key`, replacing any recorded failure.
    pub fn insert(&self, key: FontKey, face: Arc<F>) -> Arc<F> {
        self.failures.remove(&key);
        self.faces.insert(key, face.clone());
        face
    }

    /// Forget every recorded failure so the next lookup retries the load.
    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            face_count: self.faces.len(),
            failure_count: self.failures.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub face_count: usize,
    pub failure_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScrawlError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_loads_once() {
        let cache: FontCache<str> = FontCache::new();
        let key = FontKey::new("Caveat", 400);
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let face = cache
                .get_or_load(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::from("caveat-face"))
                })
                .unwrap();
            assert_eq!(&*face, "caveat-face");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_remembered() {
        let cache: FontCache<str> = FontCache::new();
        let key = FontKey::new("Missing", 400);
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let err = cache
                .get_or_load(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ScrawlError::font_unavailable("Missing", 400, "not found"))
                })
                .unwrap_err();
            assert!(err.contains("not found"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                face_count: 0,
                failure_count: 1
            }
        );
    }

    #[test]
    fn test_insert_clears_failure() {
        let cache: FontCache<str> = FontCache::new();
        let key = FontKey::new("Late", 700);
        let _ = cache.get_or_load(&key, || Err(ScrawlError::render("boom")));
        cache.insert(key.clone(), Arc::from("late"));
        assert!(cache.failure(&key).is_none());
        assert_eq!(cache.get(&key).as_deref(), Some("late"));
    }
}
