use serde::{Deserialize, Serialize};

/// A resolved page range as 0-based indices, `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Clamps a caller-supplied 1-based inclusive `(start, end)` against the
    /// document length. Out-of-range and inverted inputs are clamped, never
    /// rejected, and the result always spans at least one page. A page
    /// number of 0 counts as unset.
    pub fn resolve(total_pages: u32, start: Option<u32>, end: Option<u32>) -> Self {
        let total = i64::from(total_pages);
        let start = given(start).map(i64::from).unwrap_or(1);
        let end = given(end).map(i64::from).unwrap_or(total);

        let start_index = (start - 1).min(total - 1).max(0);
        let end_index = end.min(total).max(start_index + 1);

        Self {
            start: start_index as u32,
            end: end_index as u32,
        }
    }

    /// 0-based page indices covered by the range.
    pub fn indices(&self) -> std::ops::Range<u32> {
        self.start..self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// First page, 1-based.
    pub fn first_page(&self) -> u32 {
        self.start + 1
    }

    /// Last page, 1-based inclusive.
    pub fn last_page(&self) -> u32 {
        self.end
    }
}

/// True when either bound narrows the request.
pub fn is_explicit(start: Option<u32>, end: Option<u32>) -> bool {
    given(start).is_some() || given(end).is_some()
}

fn given(page: Option<u32>) -> Option<u32> {
    page.filter(|&p| p != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(total: u32, start: Option<u32>, end: Option<u32>) -> (u32, u32) {
        let p = PageRange::resolve(total, start, end);
        (p.start, p.end)
    }

    #[test]
    fn defaults_cover_whole_document() {
        assert_eq!(r(10, None, None), (0, 10));
    }

    #[test]
    fn inverted_range_keeps_one_page() {
        assert_eq!(r(10, Some(5), Some(3)), (4, 5));
    }

    #[test]
    fn out_of_bounds_is_clamped() {
        assert_eq!(r(10, Some(0), Some(999)), (0, 10));
        assert_eq!(r(10, Some(42), None), (9, 10));
    }

    #[test]
    fn zero_means_unset() {
        assert_eq!(r(10, Some(3), Some(0)), (2, 10));
        assert_eq!(r(10, Some(0), Some(0)), (0, 10));
        assert!(!is_explicit(Some(0), Some(0)));
        assert!(!is_explicit(None, None));
        assert!(is_explicit(None, Some(4)));
    }

    #[test]
    fn single_page_range() {
        let p = PageRange::resolve(10, Some(3), Some(3));
        assert_eq!((p.first_page(), p.last_page()), (3, 3));
        assert_eq!(p.len(), 1);
        assert_eq!(p.indices().collect::<Vec<_>>(), vec![2]);
    }
}
