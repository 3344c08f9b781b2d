//! Directory scan: enumerate direct children, keep supported photo
//! files, stat each one and read its embedded metadata.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::warn;
use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::error::Error;
use crate::exif;
use crate::record::PhotoRecord;

/// Scan one directory (non-recursive) into a fresh catalog.
///
/// The directory itself must be listable; individual files are allowed
/// to fail. A file that disappears between enumeration and stat is
/// logged and excluded, and the scan continues.
pub fn scan_directory(dir: &Path) -> Result<Catalog, Error> {
    let entries = fs::read_dir(dir).map_err(|source| Error::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    // Enumeration order is whatever the OS returns; no sorting here.
    let candidates: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("unreadable entry under {}: {}", dir.display(), e);
                    return None;
                }
            };
            let path = entry.path();
            (path.is_file() && exif::is_supported(&path)).then_some(path)
        })
        .collect();

    // Per-file stat and metadata reads are independent; the indexed
    // collect keeps records in enumeration order.
    let records: Vec<PhotoRecord> = candidates
        .par_iter()
        .filter_map(|path| read_record(path))
        .collect();

    Ok(Catalog {
        directory: dir.to_path_buf(),
        records,
    })
}

fn read_record(path: &Path) -> Option<PhotoRecord> {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            warn!("skipping {}: stat failed: {}", path.display(), e);
            return None;
        }
    };

    let modified = match meta.modified() {
        Ok(t) => DateTime::<Local>::from(t),
        Err(e) => {
            warn!("skipping {}: no modification time: {}", path.display(), e);
            return None;
        }
    };
    // Birthtime is best-effort; many filesystems cannot report one.
    let created = meta.created().ok().map(DateTime::<Local>::from);

    let name = path.file_name()?.to_string_lossy().into_owned();

    Some(PhotoRecord {
        name,
        path: path.to_path_buf(),
        created,
        modified,
        size: meta.len(),
        metadata: exif::extract_metadata(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_keeps_only_supported_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("202401_a.jpg"), b"jpgdata").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"text").unwrap();
        fs::write(tmp.path().join("202402_b.PNG"), b"pngdata").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("202403_c.jpg"), b"nested").unwrap();

        let catalog = scan_directory(tmp.path()).unwrap();
        assert_eq!(catalog.directory, tmp.path());
        assert_eq!(catalog.records.len(), 2);
        let mut names: Vec<&str> = catalog.records.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["202401_a.jpg", "202402_b.PNG"]);
    }

    #[test]
    fn test_scan_records_stat_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("202401_a.jpg"), b"1234567").unwrap();

        let catalog = scan_directory(tmp.path()).unwrap();
        let record = &catalog.records[0];
        assert_eq!(record.size, 7);
        assert_eq!(record.path, tmp.path().join("202401_a.jpg"));
        // Garbage bytes carry no embedded metadata.
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_scan_of_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("nope");
        match scan_directory(&gone) {
            Err(Error::DirectoryAccess { path, .. }) => assert_eq!(path, gone),
            other => panic!("expected DirectoryAccess, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_of_empty_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let catalog = scan_directory(tmp.path()).unwrap();
        assert!(catalog.records.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_vanished_file_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("202401_a.jpg"), b"ok").unwrap();
        // A dangling symlink stands in for a file that vanished mid-scan.
        std::os::unix::fs::symlink(tmp.path().join("gone.jpg"), tmp.path().join("dangling.jpg"))
            .unwrap();

        let catalog = scan_directory(tmp.path()).unwrap();
        assert_eq!(catalog.records.len(), 1);
        assert_eq!(catalog.records[0].name, "202401_a.jpg");
    }
}
