//! Out-of-process metadata updates: normalizes the requested date
//! source to a literal timestamp, spawns the external metadata-writing
//! tool on a worker thread, and delivers exactly one terminal outcome
//! per request.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Serialize;

use crate::date::filename_year_month;
use crate::error::Error;

/// Wire format for the date-time argument passed to the external tool.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where the new capture date comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateSpec {
    /// An explicit date-time, passed through as-is.
    Literal(NaiveDateTime),
    /// First of the month encoded in the leading YYYYMM filename token.
    Filename,
    /// The file's modification time.
    Modified,
    /// The file's creation time.
    Created,
}

impl DateSpec {
    /// Parse a user-supplied date argument: a symbolic source token, or
    /// a literal `YYYY-MM-DD HH:MM:SS`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "filename" => Ok(Self::Filename),
            "modified" => Ok(Self::Modified),
            "created" => Ok(Self::Created),
            literal => NaiveDateTime::parse_from_str(literal, DATE_TIME_FORMAT)
                .map(Self::Literal)
                .map_err(|_| {
                    Error::InvalidDateSpec(format!(
                        "expected YYYY-MM-DD HH:MM:SS or one of filename/modified/created, got {literal:?}"
                    ))
                }),
        }
    }
}

/// Terminal result of one update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateOutcome {
    /// The tool exited 0; message is its captured stdout.
    Succeeded { message: String },
    /// The tool failed, could not be launched, or died without
    /// reporting; reason carries its stderr (or spawn error) verbatim.
    Failed { reason: String },
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Handle for one in-flight update; resolves to exactly one outcome.
#[derive(Debug)]
pub struct PendingUpdate {
    path: PathBuf,
    rx: Receiver<UpdateOutcome>,
}

impl PendingUpdate {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the external process finishes. No timeout is
    /// imposed here; callers wanting one wrap this in their own policy.
    pub fn wait(self) -> UpdateOutcome {
        self.rx.recv().unwrap_or_else(|_| UpdateOutcome::Failed {
            reason: "update worker exited without reporting an outcome".to_string(),
        })
    }
}

/// Dispatches update requests to the external metadata-writing tool.
///
/// At most one request per path is in flight at a time; requests for
/// different paths run independently. Dropping a [`PendingUpdate`]
/// does not stop the external process.
#[derive(Debug, Clone)]
pub struct Updater {
    tool: PathBuf,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Updater {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Normalize the spec, mark the path in flight, and spawn the tool
    /// on a worker thread. Returns immediately with a handle; launch
    /// and exit failures are reported through the handle's outcome, so
    /// a dispatched request always resolves.
    pub fn dispatch(&self, path: &Path, spec: DateSpec) -> Result<PendingUpdate, Error> {
        let datetime = normalize(path, spec)?;

        {
            let mut in_flight = self.in_flight.lock().unwrap();
            if !in_flight.insert(path.to_path_buf()) {
                return Err(Error::UpdateInProgress(path.to_path_buf()));
            }
        }

        let (tx, rx) = mpsc::channel();
        let tool = self.tool.clone();
        let target = path.to_path_buf();
        let in_flight = Arc::clone(&self.in_flight);

        thread::spawn(move || {
            let outcome = run_tool(&tool, &target, &datetime);
            in_flight.lock().unwrap().remove(&target);
            // The receiver may already be gone; the process still ran.
            let _ = tx.send(outcome);
        });

        Ok(PendingUpdate {
            path: path.to_path_buf(),
            rx,
        })
    }
}

/// Resolve a date spec against the target file, yielding the literal
/// wire-format string the tool expects.
fn normalize(path: &Path, spec: DateSpec) -> Result<String, Error> {
    let dt = match spec {
        DateSpec::Literal(dt) => dt,
        DateSpec::Filename => {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let ym = filename_year_month(name).ok_or_else(|| {
                Error::InvalidDateSpec(format!("{name:?} has no leading YYYYMM token"))
            })?;
            NaiveDate::from_ymd_opt(ym.year, ym.month, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(|| Error::InvalidDateSpec(format!("unusable filename date {ym}")))?
        }
        DateSpec::Modified => stat_time(path, |m| m.modified().ok())?,
        DateSpec::Created => stat_time(path, |m| m.created().ok())?,
    };
    Ok(dt.format(DATE_TIME_FORMAT).to_string())
}

fn stat_time(
    path: &Path,
    pick: impl Fn(&fs::Metadata) -> Option<std::time::SystemTime>,
) -> Result<NaiveDateTime, Error> {
    let meta = fs::metadata(path)
        .map_err(|e| Error::InvalidDateSpec(format!("cannot stat {}: {e}", path.display())))?;
    let time = pick(&meta).ok_or_else(|| {
        Error::InvalidDateSpec(format!("{} has no such timestamp", path.display()))
    })?;
    Ok(DateTime::<Local>::from(time).naive_local())
}

/// Run the tool with its two positional arguments and translate the
/// exit into an outcome. Exit 0 is success with stdout as the message;
/// anything else is a failure carrying stderr, or a synthesized reason
/// when the tool said nothing.
fn run_tool(tool: &Path, target: &Path, datetime: &str) -> UpdateOutcome {
    debug!("running {} {} {:?}", tool.display(), target.display(), datetime);

    let output = match Command::new(tool).arg(target).arg(datetime).output() {
        Ok(out) => out,
        Err(e) => {
            return UpdateOutcome::Failed {
                reason: format!("failed to launch {}: {e}", tool.display()),
            };
        }
    };

    if output.status.success() {
        UpdateOutcome::Succeeded {
            message: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        }
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() {
            format!("{} exited with {}", tool.display(), output.status)
        } else {
            stderr
        };
        UpdateOutcome::Failed { reason }
    }
}
