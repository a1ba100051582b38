#![allow(dead_code)]

use pdf_page_cache::engine::{DocInfo, Document, Engine, PageStats, Raster};
use pdf_page_cache::{Error, Result};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FakePage {
    pub text: String,
    pub images: u32,
    pub drawings: u32,
}

pub fn text_page(text: &str) -> FakePage {
    FakePage {
        text: text.to_string(),
        images: 0,
        drawings: 0,
    }
}

pub fn visual_page(text: &str, images: u32, drawings: u32) -> FakePage {
    FakePage {
        text: text.to_string(),
        images,
        drawings,
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub rasterized: AtomicUsize,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
    pub fn rasterized(&self) -> usize {
        self.rasterized.load(Ordering::SeqCst)
    }
}

/// Scripted document library: every opened path yields the same pages.
#[derive(Debug, Clone)]
pub struct FakeEngine {
    pub pages: Arc<Vec<FakePage>>,
    pub info: DocInfo,
    pub counters: Arc<Counters>,
    /// 0-based page whose rasterization fails.
    pub fail_rasterize: Option<u32>,
}

impl FakeEngine {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages: Arc::new(pages),
            info: DocInfo::default(),
            counters: Arc::new(Counters::default()),
            fail_rasterize: None,
        }
    }

    pub fn with_pages(n: usize) -> Self {
        Self::new(
            (1..=n)
                .map(|i| text_page(&format!("text of page {i}")))
                .collect(),
        )
    }
}

impl Engine for FakeEngine {
    type Doc = FakeDoc;

    fn open(&self, _path: &Path) -> Result<FakeDoc> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeDoc {
            engine: self.clone(),
        })
    }
}

pub struct FakeDoc {
    engine: FakeEngine,
}

impl FakeDoc {
    fn page(&self, index: u32) -> Result<&FakePage> {
        self.engine
            .pages
            .get(index as usize)
            .ok_or_else(|| Error::Library(format!("no page {index}")))
    }
}

impl Document for FakeDoc {
    fn page_count(&self) -> u32 {
        self.engine.pages.len() as u32
    }

    fn info(&self) -> DocInfo {
        self.engine.info.clone()
    }

    fn page_text(&self, index: u32) -> Result<String> {
        Ok(self.page(index)?.text.clone())
    }

    fn page_stats(&self, index: u32) -> Result<PageStats> {
        let p = self.page(index)?;
        Ok(PageStats {
            image_count: p.images,
            drawing_count: p.drawings,
        })
    }

    fn rasterize(&self, index: u32, zoom: f32) -> Result<Raster> {
        self.page(index)?;
        if self.engine.fail_rasterize == Some(index) {
            return Err(Error::Library(format!("cannot rasterize page {index}")));
        }
        self.engine.counters.rasterized.fetch_add(1, Ordering::SeqCst);
        let width = (10.0 * zoom).round() as u32;
        let height = (14.0 * zoom).round() as u32;
        let img = image::RgbImage::new(width, height);
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(Raster { width, height, png })
    }
}

impl Drop for FakeDoc {
    fn drop(&mut self) {
        self.engine.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writes a placeholder source document into `dir`.
pub fn source_doc(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4\n% placeholder\n").unwrap();
    path
}

pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
