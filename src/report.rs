use crate::{cache::CacheListing, engine::DocInfo, render::RenderedPage, util::{size_kb, size_mb}};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "----------------------------------------";
const NO_TEXT: &str = "(no text)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub page_count: u32,
    pub info: DocInfo,
    pub pages: Vec<PagePreview>,
    /// Pages beyond the preview cap.
    pub remaining_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagePreview {
    pub page: u32,
    pub image_count: u32,
    pub drawing_count: u32,
    pub snippet: String,
}

/// How a range request was phrased, for headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Scope {
    All { total: u32 },
    Pages { first: u32, last: u32 },
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All { total } => write!(f, "all {total} pages"),
            Scope::Pages { first, last } => write!(f, "pages {first}~{last}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextReport {
    pub file_name: String,
    pub first_page: u32,
    pub last_page: u32,
    pub pages: Vec<PageText>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageImage {
    #[serde(flatten)]
    pub rendered: RenderedPage,
    /// Base64 PNG, present when image embedding is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub file_name: String,
    pub page: u32,
    pub total_pages: u32,
    pub image: PageImage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllPagesReport {
    pub file_name: String,
    pub scope: Scope,
    pub pages: Vec<PageImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SmartPage {
    Text(PageText),
    Image(PageImage),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartReport {
    pub file_name: String,
    pub scope: Scope,
    pub pages: Vec<SmartPage>,
    pub text_pages: u32,
    pub image_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderReport {
    #[serde(flatten)]
    pub rendered: RenderedPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearReport {
    pub cache_dir: PathBuf,
    pub dry_run: bool,
    /// `None` when no cache directory existed.
    pub listing: Option<CacheListing>,
}

impl ClearReport {
    pub fn deleted(&self) -> bool {
        !self.dry_run && self.listing.is_some()
    }
}

fn or_no_text(text: &str) -> &str {
    if text.trim().is_empty() { NO_TEXT } else { text.trim() }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PDF: {}", self.file_name)?;
        writeln!(f, "   pages: {}", self.page_count)?;
        let fields = [
            ("title", &self.info.title),
            ("author", &self.info.author),
            ("subject", &self.info.subject),
            ("creator", &self.info.creator),
            ("created", &self.info.creation_date),
        ];
        for (label, value) in fields {
            if let Some(v) = value {
                writeln!(f, "   {label}: {v}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Page summary:")?;
        writeln!(f, "{THIN_RULE}")?;
        for p in &self.pages {
            writeln!(
                f,
                "  [{}] images: {}, drawings: {} | {}...",
                p.page, p.image_count, p.drawing_count, p.snippet
            )?;
        }
        if self.remaining_pages > 0 {
            writeln!(f, "  ... {} more pages", self.remaining_pages)?;
        }
        Ok(())
    }
}

impl fmt::Display for TextReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PDF: {}", self.file_name)?;
        writeln!(f, "   pages: {} ~ {}", self.first_page, self.last_page)?;
        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        for p in &self.pages {
            writeln!(f)?;
            writeln!(f, "Page {}", p.page)?;
            writeln!(f, "{THIN_RULE}")?;
            writeln!(f, "{}", or_no_text(&p.text))?;
        }
        Ok(())
    }
}

impl fmt::Display for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.rendered.cached { " (cached)" } else { "" };
        write!(f, "image: {}{tag}", self.rendered.path.display())
    }
}

impl fmt::Display for PageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page {} / {}", self.page, self.total_pages)?;
        writeln!(f, "{}", self.image)
    }
}

impl fmt::Display for AllPagesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PDF: {} ({})", self.file_name, self.scope)?;
        writeln!(f, "{RULE}")?;
        for p in &self.pages {
            writeln!(f)?;
            writeln!(f, "Page {}", p.rendered.page)?;
            writeln!(f, "{p}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SmartReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PDF: {} ({}) [smart]", self.file_name, self.scope)?;
        writeln!(f, "{RULE}")?;
        for p in &self.pages {
            writeln!(f)?;
            match p {
                SmartPage::Text(t) => {
                    writeln!(f, "Page {} [text]", t.page)?;
                    writeln!(f, "{THIN_RULE}")?;
                    writeln!(f, "{}", or_no_text(&t.text))?;
                }
                SmartPage::Image(img) => {
                    writeln!(f, "Page {} [image]", img.rendered.page)?;
                    writeln!(f, "{img}")?;
                }
            }
        }
        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Result: {} text pages, {} image pages",
            self.text_pages, self.image_pages
        )
    }
}

impl fmt::Display for RenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rendered;
        writeln!(f, "Rendered page {}", r.page)?;
        writeln!(f, "   resolution: {} DPI", r.dpi)?;
        match r.dimensions {
            Some(d) => writeln!(f, "   size: {} x {}", d.width, d.height)?,
            None => writeln!(f, "   size: unknown")?,
        }
        if r.cached {
            writeln!(f, "   from cache")?;
        }
        writeln!(f)?;
        writeln!(f, "Image path: {}", r.path.display())
    }
}

impl fmt::Display for ClearReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(listing) = &self.listing else {
            return writeln!(f, "No cache exists: {}", self.cache_dir.display());
        };
        let name = self
            .cache_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.dry_run {
            writeln!(f, "Cache preview: {name}")?;
            writeln!(f, "   location: {}", self.cache_dir.display())?;
            writeln!(f, "   files: {}", listing.file_count)?;
            writeln!(f, "   total size: {}", size_mb(listing.total_bytes))?;
            writeln!(f)?;
            writeln!(f, "   files:")?;
            for file in &listing.files {
                writeln!(f, "   - {} ({})", file.name, size_kb(file.bytes))?;
            }
            if listing.file_count > listing.files.len() {
                writeln!(
                    f,
                    "   ... {} more files",
                    listing.file_count - listing.files.len()
                )?;
            }
            writeln!(f)?;
            writeln!(f, "Run without --dry-run to delete.")
        } else {
            writeln!(f, "Cache deleted: {name}")?;
            writeln!(f, "   location: {}", self.cache_dir.display())?;
            writeln!(f, "   deleted files: {}", listing.file_count)?;
            writeln!(f, "   freed: {}", size_mb(listing.total_bytes))
        }
    }
}
