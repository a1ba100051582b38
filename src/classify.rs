use crate::engine::PageStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    TextOnly,
    Visual,
}

/// A page is `Visual` when it carries any embedded image or vector drawing.
/// No geometry filtering: zero-area images still count.
pub fn classify(stats: &PageStats) -> PageKind {
    if stats.image_count > 0 || stats.drawing_count > 0 {
        PageKind::Visual
    } else {
        PageKind::TextOnly
    }
}
