use crate::error::{IoContext, Result};
use crate::util::{file_stamp, now_rfc3339, FileStamp};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const META_FILE: &str = ".cache_meta.json";

/// Snapshot of the source document a cache directory was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    #[serde(default)]
    pub pdf_path: String,
    pub pdf_mtime: f64,
    pub pdf_size: u64,
    #[serde(default)]
    pub created_at: String,
}

impl CacheMeta {
    pub fn for_source(source: &Path) -> Result<Self> {
        let stamp = file_stamp(source)?;
        let abs = std::path::absolute(source)
            .io_context(|| format!("absolute path of {}", source.display()))?;
        Ok(Self {
            pdf_path: abs.display().to_string(),
            pdf_mtime: stamp.mtime,
            pdf_size: stamp.size,
            created_at: now_rfc3339(),
        })
    }

    /// Reads the record from `cache_dir`. Missing, unreadable or malformed
    /// records all come back as `None`.
    pub fn read(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(META_FILE);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("cache meta unreadable {}: {err}", path.display());
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(meta) => Some(meta),
            Err(err) => {
                debug!("cache meta corrupt {}: {err}", path.display());
                None
            }
        }
    }

    pub fn write(&self, cache_dir: &Path) -> Result<()> {
        let path = cache_dir.join(META_FILE);
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, raw).io_context(|| format!("write {}", path.display()))
    }

    /// Exact comparison; no tolerance for clock skew.
    pub fn matches(&self, stamp: &FileStamp) -> bool {
        self.pdf_mtime == stamp.mtime && self.pdf_size == stamp.size
    }
}

/// Whether `cache_dir` was built from the current state of `source`.
/// Fails closed: anything short of a readable record with matching
/// mtime and size is invalid.
pub fn is_valid(source: &Path, cache_dir: &Path) -> bool {
    let Some(meta) = CacheMeta::read(cache_dir) else {
        return false;
    };
    let stamp = match file_stamp(source) {
        Ok(stamp) => stamp,
        Err(err) => {
            debug!("cannot stat source {}: {err}", source.display());
            return false;
        }
    };
    let valid = meta.matches(&stamp);
    if !valid {
        debug!(
            "cache stale for {}: stored mtime={} size={}, current mtime={} size={}",
            source.display(),
            meta.pdf_mtime,
            meta.pdf_size,
            stamp.mtime,
            stamp.size
        );
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_without_optional_fields_parses() {
        let meta: CacheMeta =
            serde_json::from_str(r#"{"pdf_mtime": 1700000000.25, "pdf_size": 42}"#).unwrap();
        assert!(meta.matches(&FileStamp {
            mtime: 1700000000.25,
            size: 42
        }));
        assert!(!meta.matches(&FileStamp {
            mtime: 1700000000.25,
            size: 43
        }));
    }

    #[test]
    fn record_missing_size_is_rejected() {
        let parsed = serde_json::from_str::<CacheMeta>(r#"{"pdf_mtime": 1.0}"#);
        assert!(parsed.is_err());
    }
}
