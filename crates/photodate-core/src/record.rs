use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

/// One scanned photo file: a point-in-time snapshot of its filesystem
/// stats plus whatever embedded metadata could be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoRecord {
    /// Base filename
    pub name: String,
    /// Full path, unique within a catalog snapshot
    pub path: PathBuf,
    /// Filesystem creation time (None where the platform has no birthtime)
    pub created: Option<DateTime<Local>>,
    /// Filesystem modification time
    pub modified: DateTime<Local>,
    /// File size in bytes
    pub size: u64,
    /// Embedded metadata field -> display value; empty means unknown
    pub metadata: HashMap<String, String>,
}

impl PhotoRecord {
    /// Look up one embedded metadata field by its published key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
