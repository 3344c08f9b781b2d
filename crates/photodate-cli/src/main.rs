use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use photodate_core::scan::scan_directory;
use photodate_core::{assess, exif, DateSpec, Library, PhotoRecord};

#[derive(Parser)]
#[command(name = "photodate", version)]
#[command(about = "Reconcile photo filenames against embedded capture dates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and list each photo with its date assessment
    Scan {
        /// Directory containing photos (scanned non-recursively)
        dir: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one photo's filesystem and embedded metadata in detail
    Show {
        /// Photo file
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a photo's capture date via the external metadata tool
    Update {
        /// Photo file
        file: PathBuf,

        /// New date: `YYYY-MM-DD HH:MM:SS`, or one of
        /// filename / modified / created
        date: String,

        /// External metadata-writing tool to invoke
        #[arg(long)]
        tool: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan { dir, json } => cmd_scan(&dir, json),
        Command::Show { file, json } => cmd_show(&file, json),
        Command::Update { file, date, tool, json } => cmd_update(&file, &date, &tool, json),
    }
}

fn cmd_scan(dir: &Path, json: bool) -> Result<()> {
    let catalog = scan_directory(dir)?;

    if json {
        let lines: Vec<serde_json::Value> = catalog
            .records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "record": r,
                    "assessment": assess(r),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No photos found in {}", dir.display());
        return Ok(());
    }

    let name_width = catalog
        .records
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max(4);

    println!("{:<name_width$}  {:<6}  {:<19}  status", "name", "token", "captured");
    for record in &catalog.records {
        let a = assess(record);
        let token = a
            .filename_year_month
            .map(|ym| ym.to_string())
            .unwrap_or_else(|| "------".to_string());
        let captured = a
            .captured
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = if !a.mismatch {
            "ok"
        } else if a.missing_captured {
            "MISMATCH (no capture date)"
        } else {
            "MISMATCH"
        };
        println!("{:<name_width$}  {:<6}  {:<19}  {}", record.name, token, captured, status);
    }

    let mismatches = catalog.records.iter().filter(|r| assess(r).mismatch).count();
    println!("\n{} photo(s), {} mismatch(es)", catalog.len(), mismatches);
    Ok(())
}

fn cmd_show(file: &Path, json: bool) -> Result<()> {
    let record = load_record(file)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "record": &record,
                "assessment": assess(&record),
            }))?
        );
        return Ok(());
    }

    let a = assess(&record);
    let field = |key: &str| record.field(key).unwrap_or("Not available").to_string();

    println!("Name:       {}", record.name);
    println!("Path:       {}", record.path.display());
    println!("Size:       {}", format_size(record.size));
    println!(
        "Captured:   {}",
        a.captured
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Not available".to_string())
    );
    println!(
        "Created:    {}",
        record
            .created
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Not available".to_string())
    );
    println!("Modified:   {}", record.modified.format("%Y-%m-%d %H:%M:%S"));

    let title = record
        .field(exif::IMAGE_DESCRIPTION)
        .or_else(|| record.field(exif::XP_TITLE))
        .unwrap_or("Not available");
    println!("Title:      {}", title);
    println!("Camera:     {} {}", field(exif::MAKE), field(exif::MODEL));
    match (record.field(exif::IMAGE_WIDTH), record.field(exif::IMAGE_HEIGHT)) {
        (Some(w), Some(h)) => println!("Dimensions: {} x {}", w, h),
        _ => println!("Dimensions: Not available"),
    }
    println!(
        "Status:     {}",
        if a.mismatch { "date mismatch" } else { "ok" }
    );
    Ok(())
}

fn cmd_update(file: &Path, date: &str, tool: &Path, json: bool) -> Result<()> {
    let spec = DateSpec::parse(date)?;
    let library = Library::new(tool);

    let outcome = library
        .apply_update(file, spec)
        .with_context(|| format!("cannot update {}", file.display()))?;

    if json {
        let refreshed = library
            .catalog()
            .and_then(|c| c.record(file).map(assess));
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "outcome": &outcome,
                "assessment": refreshed,
            }))?
        );
    } else {
        match &outcome {
            photodate_core::UpdateOutcome::Succeeded { message } => {
                if message.is_empty() {
                    println!("Updated {}", file.display());
                } else {
                    println!("{}", message);
                }
                if let Some(catalog) = library.catalog() {
                    if let Some(record) = catalog.record(file) {
                        let a = assess(record);
                        println!(
                            "Now: token {}, captured {}",
                            a.filename_year_month
                                .map(|ym| ym.to_string())
                                .unwrap_or_else(|| "------".to_string()),
                            a.captured
                                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                                .unwrap_or_else(|| "-".to_string())
                        );
                    }
                }
            }
            photodate_core::UpdateOutcome::Failed { reason } => {
                eprintln!("Update failed: {}", reason);
            }
        }
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Stat the file's directory and pull out its record.
fn load_record(file: &Path) -> Result<PhotoRecord> {
    let dir = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let catalog = scan_directory(&dir)?;

    let name = file
        .file_name()
        .with_context(|| format!("{} has no filename", file.display()))?;
    match catalog.records.into_iter().find(|r| name == r.name.as_str()) {
        Some(record) => Ok(record),
        None => bail!("{} is not a photo file", file.display()),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
