use std::path::PathBuf;

/// Errors surfaced to callers. Per-file problems during a scan are not
/// errors: they are logged and the file is skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read directory {}: {}", .path.display(), .source)]
    DirectoryAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("an update for {} is already in flight", .0.display())]
    UpdateInProgress(PathBuf),

    #[error("invalid date specification: {0}")]
    InvalidDateSpec(String),
}

pub type Result<T> = std::result::Result<T, Error>;
