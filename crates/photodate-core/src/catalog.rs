use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::record::PhotoRecord;

/// A point-in-time snapshot of one directory's photo records, in
/// enumeration order. Never mutated in place; a re-scan builds a new
/// one and swaps it in wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub directory: PathBuf,
    pub records: Vec<PhotoRecord>,
}

impl Catalog {
    pub fn record(&self, path: &Path) -> Option<&PhotoRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Holds the live catalog snapshot: single writer (the scanner), any
/// number of readers. Readers clone the `Arc` and keep a complete
/// snapshot even while a replacement is being built.
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if any scan has completed.
    pub fn snapshot(&self) -> Option<Arc<Catalog>> {
        self.current.read().unwrap().clone()
    }

    /// Swap in a freshly built snapshot, returning it.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let snapshot = Arc::new(catalog);
        *self.current.write().unwrap() = Some(Arc::clone(&snapshot));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(dir: &str, names: &[&str]) -> Catalog {
        Catalog {
            directory: PathBuf::from(dir),
            records: names
                .iter()
                .map(|n| PhotoRecord {
                    name: n.to_string(),
                    path: PathBuf::from(dir).join(n),
                    created: None,
                    modified: chrono::Local::now(),
                    size: 0,
                    metadata: Default::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_store_starts_empty() {
        assert!(CatalogStore::new().snapshot().is_none());
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let store = CatalogStore::new();
        store.replace(catalog("/photos", &["a.jpg"]));
        assert_eq!(store.snapshot().unwrap().len(), 1);

        store.replace(catalog("/photos", &["a.jpg", "b.jpg"]));
        assert_eq!(store.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_old_readers_keep_their_snapshot() {
        let store = CatalogStore::new();
        store.replace(catalog("/photos", &["a.jpg"]));
        let old = store.snapshot().unwrap();

        store.replace(catalog("/photos", &[]));
        assert_eq!(old.len(), 1);
        assert_eq!(old.records[0].name, "a.jpg");
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_record_lookup_by_path() {
        let c = catalog("/photos", &["a.jpg", "b.jpg"]);
        assert_eq!(c.record(Path::new("/photos/b.jpg")).unwrap().name, "b.jpg");
        assert!(c.record(Path::new("/photos/c.jpg")).is_none());
    }
}
