//! MuPDF-backed document library.
//!
//! Text, metadata, image placements, vector drawings and rasterization all
//! come from MuPDF, so any format it opens (PDF, XPS, EPUB, images) is
//! handled the same way.

use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mupdf::text_page::TextBlockType;
use mupdf::{
    ColorParams, Colorspace, Device, Matrix, MetadataName, NativeDevice, Pixmap, Shade,
    StrokeState, TextPageFlags,
};
use tracing::debug;

use super::{DocInfo, Document, Engine, PageStats, Raster};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct MupdfEngine {
    text_flags: TextPageFlags,
}

impl MupdfEngine {
    pub fn new() -> Self {
        Self {
            text_flags: TextPageFlags::PRESERVE_WHITESPACE | TextPageFlags::PRESERVE_LIGATURES,
        }
    }
}

impl Default for MupdfEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MupdfEngine {
    type Doc = MupdfDocument;

    fn open(&self, path: &Path) -> Result<MupdfDocument> {
        let doc = mupdf::Document::open(path)?;
        let page_count = doc.page_count()?.max(0) as u32;
        debug!("opened {} pages={}", path.display(), page_count);
        Ok(MupdfDocument {
            path: path.to_path_buf(),
            doc,
            page_count,
            text_flags: self.text_flags,
        })
    }
}

pub struct MupdfDocument {
    path: PathBuf,
    doc: mupdf::Document,
    page_count: u32,
    text_flags: TextPageFlags,
}

impl MupdfDocument {
    fn load_page(&self, index: u32) -> Result<mupdf::Page> {
        if index >= self.page_count {
            return Err(Error::Library(format!(
                "page index {} out of bounds ({} pages)",
                index, self.page_count
            )));
        }
        Ok(self.doc.load_page(index as i32)?)
    }

    /// Runs the page's full display list, form XObjects and annotations
    /// included, through a counting device.
    fn drawing_count(&self, page: &mupdf::Page) -> Result<u32> {
        let counter = Rc::new(RefCell::new(DrawingCounter::default()));
        let device = Device::from_native(counter.clone())?;
        page.run(&device, &Matrix::IDENTITY)?;
        drop(device);
        let count = counter.borrow().count;
        Ok(count)
    }
}

/// Counts path fills, path strokes and shadings. A path that is both filled
/// and stroked counts twice.
#[derive(Debug, Default)]
struct DrawingCounter {
    count: u32,
}

#[allow(clippy::too_many_arguments)]
impl NativeDevice for DrawingCounter {
    fn fill_path(
        &mut self,
        _path: &mupdf::Path,
        _even_odd: bool,
        _cmt: Matrix,
        _color_space: &Colorspace,
        _color: &[f32],
        _alpha: f32,
        _cp: ColorParams,
    ) {
        self.count += 1;
    }

    fn stroke_path(
        &mut self,
        _path: &mupdf::Path,
        _stroke_state: &StrokeState,
        _cmt: Matrix,
        _color_space: &Colorspace,
        _color: &[f32],
        _alpha: f32,
        _cp: ColorParams,
    ) {
        self.count += 1;
    }

    fn fill_shade(&mut self, _shade: &Shade, _cmt: Matrix, _alpha: f32, _cp: ColorParams) {
        self.count += 1;
    }
}

impl Document for MupdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn info(&self) -> DocInfo {
        let get = |name: MetadataName| -> Option<String> {
            self.doc.metadata(name).ok().filter(|s| !s.trim().is_empty())
        };
        DocInfo {
            title: get(MetadataName::Title),
            author: get(MetadataName::Author),
            subject: get(MetadataName::Subject),
            creator: get(MetadataName::Creator),
            creation_date: get(MetadataName::CreationDate),
        }
    }

    fn page_text(&self, index: u32) -> Result<String> {
        let page = self.load_page(index)?;
        let text_page = page.to_text_page(self.text_flags)?;
        Ok(text_page.to_text()?)
    }

    fn page_stats(&self, index: u32) -> Result<PageStats> {
        let page = self.load_page(index)?;
        let text_page = page.to_text_page(TextPageFlags::PRESERVE_IMAGES)?;
        let image_count = text_page
            .blocks()
            .filter(|block| block.r#type() == TextBlockType::Image)
            .count() as u32;
        Ok(PageStats {
            image_count,
            drawing_count: self.drawing_count(&page)?,
        })
    }

    fn rasterize(&self, index: u32, zoom: f32) -> Result<Raster> {
        let page = self.load_page(index)?;
        let matrix = Matrix::new_scale(zoom, zoom);
        let rgb = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&matrix, &rgb, false, true)?;
        encode_png(&pixmap)
    }
}

impl Drop for MupdfDocument {
    // The native handle is released when `doc` drops after this.
    fn drop(&mut self) {
        debug!("closed {}", self.path.display());
    }
}

fn encode_png(pixmap: &Pixmap) -> Result<Raster> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(Error::Library(format!(
            "unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(Error::Library("pixmap buffer size mismatch".into()));
    }

    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            rgb.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                rgb.extend_from_slice(&px[..3]);
            }
        }
    }

    let img = image::RgbImage::from_raw(width as u32, height as u32, rgb)
        .ok_or_else(|| Error::Library("failed to create image buffer".into()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    Ok(Raster {
        width: width as u32,
        height: height as u32,
        png,
    })
}
