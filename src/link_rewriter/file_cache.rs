//! Bounded cache of file contents for read-only checks
//!
//! Rewrites never read through this cache: they read the file fresh right
//! before writing it. Every write must be followed by `invalidate` for the
//! written path so later readers see the new contents.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;

use crate::error::{LinkrotError, LinkrotResult};

/// Default number of files kept in memory
pub const DEFAULT_FILE_CACHE_CAPACITY: usize = 256;

/// LRU cache from path to file contents
#[derive(Debug)]
pub struct FileCache {
    entries: LruCache<PathBuf, Arc<str>>,
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_CACHE_CAPACITY)
    }
}

impl FileCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Cached contents of `path`, reading the file on a miss
    pub async fn load(&mut self, path: &Path) -> LinkrotResult<Arc<str>> {
        if let Some(contents) = self.entries.get(path) {
            return Ok(Arc::clone(contents));
        }
        let contents: Arc<str> = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LinkrotError::io(path, e))?
            .into();
        self.entries.put(path.to_path_buf(), Arc::clone(&contents));
        Ok(contents)
    }

    /// Drop the cached contents of `path`
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.pop(path);
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_forces_a_fresh_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.md");
        std::fs::write(&path, "before").expect("write");

        let mut cache = FileCache::new(4);
        assert_eq!(&*cache.load(&path).await.expect("load"), "before");

        std::fs::write(&path, "after").expect("write");
        assert_eq!(&*cache.load(&path).await.expect("load"), "before");

        cache.invalidate(&path);
        assert!(!cache.contains(&path));
        assert_eq!(&*cache.load(&path).await.expect("load"), "after");
    }

    #[tokio::test]
    async fn capacity_bounds_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = FileCache::new(2);
        for name in ["a", "b", "c"] {
            let path = dir.path().join(name);
            std::fs::write(&path, name).expect("write");
            cache.load(&path).await.expect("load");
        }
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&dir.path().join("a")));
    }
}
