//! Core library for reconciling photo filenames against embedded
//! capture dates.
//!
//! A [`Library`] scans one directory at a time into an immutable
//! [`Catalog`] snapshot, derives a [`DateAssessment`] per record on
//! demand, and dispatches capture-date rewrites to an external
//! metadata-writing tool, re-scanning after each successful update so
//! the snapshot reflects what the tool actually wrote.

pub mod catalog;
pub mod date;
pub mod error;
pub mod exif;
pub mod record;
pub mod scan;
pub mod update;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use catalog::{Catalog, CatalogStore};
pub use date::{assess, filename_year_month, DateAssessment, YearMonth};
pub use error::{Error, Result};
pub use record::PhotoRecord;
pub use update::{DateSpec, PendingUpdate, UpdateOutcome, Updater};

/// One directory-browsing session: the live catalog snapshot plus the
/// updater for the external metadata-writing tool.
pub struct Library {
    store: CatalogStore,
    updater: Updater,
}

impl Library {
    /// `tool` is the external metadata-writing binary invoked for
    /// capture-date rewrites.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            store: CatalogStore::new(),
            updater: Updater::new(tool),
        }
    }

    /// Scan `dir` and swap the result in as the live catalog.
    pub fn scan(&self, dir: &Path) -> Result<Arc<Catalog>> {
        let catalog = scan::scan_directory(dir)?;
        Ok(self.store.replace(catalog))
    }

    /// The live snapshot, if a scan has completed.
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.store.snapshot()
    }

    /// Dispatch an update without waiting. See [`Updater::dispatch`].
    pub fn request_update(&self, path: &Path, spec: DateSpec) -> Result<PendingUpdate> {
        self.updater.dispatch(path, spec)
    }

    /// Dispatch an update, wait for its terminal outcome, and on
    /// success re-scan the file's directory. The refreshed snapshot is
    /// swapped in strictly after the completion notification; on any
    /// failure the catalog is left untouched.
    pub fn apply_update(&self, path: &Path, spec: DateSpec) -> Result<UpdateOutcome> {
        let pending = self.updater.dispatch(path, spec)?;
        let outcome = pending.wait();

        if outcome.is_success() {
            if let Some(dir) = path.parent() {
                self.scan(dir)?;
            }
        }

        Ok(outcome)
    }
}
