use crate::{
    cache,
    classify::{classify, PageKind},
    config::Config,
    engine::{Document, Engine},
    error::{Error, IoContext, Result},
    range::{self, PageRange},
    render::{RenderedPage, Renderer, Resolution},
    report::{
        AllPagesReport, ClearReport, DocumentSummary, PageImage, PagePreview, PageReport,
        PageText, RenderReport, Scope, SmartPage, SmartReport, TextReport,
    },
    text,
};
use base64::Engine as _;
use std::path::Path;
use tracing::{debug, info, warn};

/// The public read operations over a document and its page cache.
///
/// Every operation opens the document on entry; the handle is a local and is
/// released on every return path, including errors raised mid-range. A
/// failure on any page aborts the whole request.
pub struct Reader<E: Engine> {
    cfg: Config,
    engine: E,
    renderer: Renderer,
}

impl<E: Engine> Reader<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
            renderer: Renderer::new(cfg.render.default_dpi),
        }
    }

    fn open(&self, path: &Path) -> Result<E::Doc> {
        validate_input(&self.cfg, path)?;
        let doc = self.engine.open(path)?;
        debug!("open {} pages={}", path.display(), doc.page_count());
        Ok(doc)
    }

    /// Page count, metadata and a short per-page preview.
    pub fn summary(&self, path: &Path) -> Result<DocumentSummary> {
        let doc = self.open(path)?;
        let total = doc.page_count();
        let shown = total.min(self.cfg.preview.max_pages);

        let mut pages = Vec::with_capacity(shown as usize);
        for index in 0..shown {
            let stats = doc.page_stats(index)?;
            let raw = doc.page_text(index)?;
            pages.push(PagePreview {
                page: index + 1,
                image_count: stats.image_count,
                drawing_count: stats.drawing_count,
                snippet: text::snippet(&raw, self.cfg.preview.snippet_chars),
            });
        }

        Ok(DocumentSummary {
            file_name: file_name(path),
            page_count: total,
            info: doc.info(),
            pages,
            remaining_pages: total - shown,
        })
    }

    /// Plain text of every page in the range.
    pub fn text(&self, path: &Path, start: Option<u32>, end: Option<u32>) -> Result<TextReport> {
        let doc = self.open(path)?;
        let range = self.range_of(path, &doc, start, end)?;

        let mut pages = Vec::with_capacity(range.len() as usize);
        for index in range.indices() {
            let raw = doc.page_text(index)?;
            pages.push(PageText {
                page: index + 1,
                text: text::normalize(&self.cfg, &raw),
            });
        }

        Ok(TextReport {
            file_name: file_name(path),
            first_page: range.first_page(),
            last_page: range.last_page(),
            pages,
        })
    }

    /// One page, always rendered at the default resolution.
    pub fn page(&self, path: &Path, page_number: u32) -> Result<PageReport> {
        let doc = self.open(path)?;
        let total = doc.page_count();
        check_page(page_number, total)?;

        let cache_dir = cache::resolve(path)?;
        let rendered =
            self.renderer
                .render(&doc, page_number - 1, &cache_dir, Resolution::Default)?;

        Ok(PageReport {
            file_name: file_name(path),
            page: page_number,
            total_pages: total,
            image: self.page_image(rendered)?,
        })
    }

    /// Every page in the range rendered at the default resolution.
    pub fn all_pages(
        &self,
        path: &Path,
        start: Option<u32>,
        end: Option<u32>,
    ) -> Result<AllPagesReport> {
        let doc = self.open(path)?;
        let range = self.range_of(path, &doc, start, end)?;
        let cache_dir = cache::resolve(path)?;
        info!("rendering {} pages of {}", range.len(), path.display());

        let mut pages = Vec::with_capacity(range.len() as usize);
        for index in range.indices() {
            let rendered = self
                .renderer
                .render(&doc, index, &cache_dir, Resolution::Default)?;
            pages.push(self.page_image(rendered)?);
        }

        Ok(AllPagesReport {
            file_name: file_name(path),
            scope: scope_of(&range, doc.page_count(), start, end),
            pages,
        })
    }

    /// Text for text-only pages, a rendered image for visual ones.
    pub fn smart(&self, path: &Path, start: Option<u32>, end: Option<u32>) -> Result<SmartReport> {
        let doc = self.open(path)?;
        let range = self.range_of(path, &doc, start, end)?;
        let cache_dir = cache::resolve(path)?;

        let mut pages = Vec::with_capacity(range.len() as usize);
        let mut text_pages = 0;
        let mut image_pages = 0;

        for index in range.indices() {
            let stats = doc.page_stats(index)?;
            match classify(&stats) {
                PageKind::Visual => {
                    image_pages += 1;
                    let rendered =
                        self.renderer
                            .render(&doc, index, &cache_dir, Resolution::Default)?;
                    pages.push(SmartPage::Image(self.page_image(rendered)?));
                }
                PageKind::TextOnly => {
                    text_pages += 1;
                    let raw = doc.page_text(index)?;
                    pages.push(SmartPage::Text(PageText {
                        page: index + 1,
                        text: text::normalize(&self.cfg, &raw),
                    }));
                }
            }
        }

        info!(
            "smart read {}: text_pages={} image_pages={}",
            path.display(),
            text_pages,
            image_pages
        );

        Ok(SmartReport {
            file_name: file_name(path),
            scope: scope_of(&range, doc.page_count(), start, end),
            pages,
            text_pages,
            image_pages,
        })
    }

    /// Renders one page at an explicit resolution (default: `render.default_dpi`).
    pub fn render_page(
        &self,
        path: &Path,
        page_number: u32,
        dpi: Option<u32>,
    ) -> Result<RenderReport> {
        let dpi = dpi.unwrap_or(self.cfg.render.default_dpi);
        if dpi == 0 || dpi > self.cfg.render.max_dpi {
            return Err(Error::InvalidDpi {
                dpi,
                max: self.cfg.render.max_dpi,
            });
        }

        let doc = self.open(path)?;
        check_page(page_number, doc.page_count())?;

        let cache_dir = cache::resolve(path)?;
        let rendered = self
            .renderer
            .render(&doc, page_number - 1, &cache_dir, Resolution::Dpi(dpi))?;

        Ok(RenderReport { rendered })
    }

    /// Deletes, or with `dry_run` only lists, the document's cache directory.
    /// The document itself is not opened.
    pub fn clear_cache(&self, path: &Path, dry_run: bool) -> Result<ClearReport> {
        if !path.exists() {
            return Err(Error::DocumentNotFound(path.to_path_buf()));
        }

        let dir = cache::locate(path);
        if !dir.exists() {
            return Ok(ClearReport {
                cache_dir: dir,
                dry_run,
                listing: None,
            });
        }

        let listing = cache::inspect(&dir, self.cfg.cache.max_listed_files)?;
        if !dry_run {
            cache::invalidate(&dir)?;
            info!(
                "cleared cache {} files={} bytes={}",
                dir.display(),
                listing.file_count,
                listing.total_bytes
            );
        }

        Ok(ClearReport {
            cache_dir: dir,
            dry_run,
            listing: Some(listing),
        })
    }

    fn range_of(
        &self,
        path: &Path,
        doc: &E::Doc,
        start: Option<u32>,
        end: Option<u32>,
    ) -> Result<PageRange> {
        let total = doc.page_count();
        if total == 0 {
            return Err(Error::EmptyDocument(path.to_path_buf()));
        }
        Ok(PageRange::resolve(total, start, end))
    }

    fn page_image(&self, rendered: RenderedPage) -> Result<PageImage> {
        let data = if self.cfg.output.embed_images {
            let bytes = std::fs::read(&rendered.path)
                .io_context(|| format!("read {}", rendered.path.display()))?;
            Some(base64::engine::general_purpose::STANDARD.encode(bytes))
        } else {
            None
        };
        Ok(PageImage { rendered, data })
    }
}

fn check_page(page_number: u32, total: u32) -> Result<()> {
    if page_number < 1 || page_number > total {
        return Err(Error::InvalidPageNumber {
            page: page_number,
            total,
        });
    }
    Ok(())
}

fn scope_of(range: &PageRange, total: u32, start: Option<u32>, end: Option<u32>) -> Scope {
    if range::is_explicit(start, end) {
        Scope::Pages {
            first: range.first_page(),
            last: range.last_page(),
        }
    } else {
        Scope::All { total }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Rejects inputs before the document library sees them.
pub fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();

    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(Error::RejectedInput(format!(
            "URL inputs are disabled: {input_str}"
        )));
    }

    let meta = match std::fs::metadata(input) {
        Ok(meta) => meta,
        Err(_) => return Err(Error::DocumentNotFound(input.to_path_buf())),
    };

    if meta.len() > cfg.limits.max_input_file_bytes {
        return Err(Error::RejectedInput(format!(
            "input exceeds max_input_file_bytes ({} > {})",
            meta.len(),
            cfg.limits.max_input_file_bytes
        )));
    }

    match input.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => {}
        Some(_) => warn!("input is not a .pdf; trying anyway: {}", input.display()),
        None => warn!("input has no extension; assuming PDF: {}", input.display()),
    }

    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
