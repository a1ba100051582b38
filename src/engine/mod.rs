pub mod lazy;
pub mod mupdf_engine;
pub mod types;

use crate::error::Result;
use std::path::Path;
use std::sync::Arc;

pub use lazy::LazyEngine;
pub use mupdf_engine::{MupdfDocument, MupdfEngine};
pub use types::{DocInfo, PageStats, Raster};

/// Opens documents. Implementations are the only place that parses PDFs.
pub trait Engine {
    type Doc: Document;

    fn open(&self, path: &Path) -> Result<Self::Doc>;
}

/// An open document handle. Dropping it releases the underlying document,
/// so holding it in a local binding scopes it to the current operation.
///
/// Page indices are 0-based.
pub trait Document {
    fn page_count(&self) -> u32;
    fn info(&self) -> DocInfo;
    fn page_text(&self, index: u32) -> Result<String>;
    fn page_stats(&self, index: u32) -> Result<PageStats>;
    /// Rasterizes a page with `zoom` applied to both axes (1.0 = 72 dpi).
    fn rasterize(&self, index: u32, zoom: f32) -> Result<Raster>;
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    type Doc = E::Doc;

    fn open(&self, path: &Path) -> Result<Self::Doc> {
        (**self).open(path)
    }
}
