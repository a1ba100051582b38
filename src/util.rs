use crate::error::{IoContext, Result};
use std::path::Path;
use std::time::UNIX_EPOCH;
use time::format_description::well_known::Rfc3339;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).io_context(|| format!("create_dir_all {}", p.display()))
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Modification time and byte size of a file, as recorded in cache metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileStamp {
    /// Seconds since the Unix epoch.
    pub mtime: f64,
    pub size: u64,
}

pub fn file_stamp(path: &Path) -> Result<FileStamp> {
    let meta = std::fs::metadata(path).io_context(|| format!("stat {}", path.display()))?;
    let modified = meta
        .modified()
        .io_context(|| format!("mtime {}", path.display()))?;
    // Pre-epoch mtimes are stored as negative seconds.
    let mtime = match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    };
    Ok(FileStamp {
        mtime,
        size: meta.len(),
    })
}

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;

/// Directory totals, always in MB.
pub fn size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MB)
}

/// Single files, always in KB.
pub fn size_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / KB)
}
