//! On-disk page cache.
//!
//! Each source document gets a sibling directory `<stem>_pdf_cache/` holding
//! a metadata record and the rendered page artifacts. There is no locking:
//! two processes resolving the same document can race on invalidation.

pub mod meta;

use crate::error::{Error, IoContext, Result};
use crate::util::ensure_dir;
use meta::{CacheMeta, META_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const CACHE_DIR_SUFFIX: &str = "_pdf_cache";

/// A cache directory that has been validated against its source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDir {
    path: PathBuf,
}

impl CacheDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }
}

/// Where the cache directory for `source` lives. Creates nothing.
pub fn locate(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{stem}{CACHE_DIR_SUFFIX}"))
}

/// Returns the cache directory for `source`, creating it if needed and
/// discarding it first if its metadata no longer matches the source.
pub fn resolve(source: &Path) -> Result<CacheDir> {
    if !source.exists() {
        return Err(Error::DocumentNotFound(source.to_path_buf()));
    }

    let dir = locate(source);
    if dir.exists() && !meta::is_valid(source, &dir) {
        info!("invalidating cache {}", dir.display());
        invalidate(&dir)?;
    }

    ensure_dir(&dir)?;

    if !dir.join(META_FILE).exists() {
        debug!("writing cache meta in {}", dir.display());
        CacheMeta::for_source(source)?.write(&dir)?;
    }

    Ok(CacheDir { path: dir })
}

/// Deletes a cache directory and everything in it. Missing is fine.
pub fn invalidate(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).io_context(|| format!("remove_dir_all {}", dir.display()))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFile {
    /// Path relative to the cache directory.
    pub name: String,
    pub bytes: u64,
}

/// Contents of a cache directory: totals over every file, plus the first
/// `max_listed` files in name order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheListing {
    pub file_count: usize,
    pub total_bytes: u64,
    pub files: Vec<CachedFile>,
}

pub fn inspect(dir: &Path, max_listed: usize) -> Result<CacheListing> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            context: format!("walk {}", dir.display()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let bytes = entry
            .metadata()
            .map_err(|e| Error::Io {
                context: format!("stat {}", entry.path().display()),
                source: e.into(),
            })?
            .len();
        let name = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .display()
            .to_string();
        files.push(CachedFile { name, bytes });
    }

    let file_count = files.len();
    let total_bytes = files.iter().map(|f| f.bytes).sum();
    files.truncate(max_listed);

    Ok(CacheListing {
        file_count,
        total_bytes,
        files,
    })
}
