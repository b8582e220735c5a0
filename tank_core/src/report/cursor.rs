//! Vertical write position during pagination.
//!
//! A cursor is created when assembly starts, advanced once per placed block,
//! reset at each page break, and dropped before footers are stamped.

use crate::report::layout::PageLayout;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCursor {
    /// 0-based page index
    page_index: usize,
    /// Distance from the top edge of the current page (pt)
    offset_pt: f64,
    page_height_pt: f64,
    top_margin_pt: f64,
    bottom_margin_pt: f64,
}

impl DocumentCursor {
    /// Cursor at the top of page 1
    pub fn new(layout: &PageLayout) -> Self {
        DocumentCursor {
            page_index: 0,
            offset_pt: layout.top_margin_pt,
            page_height_pt: layout.page_height_pt,
            top_margin_pt: layout.top_margin_pt,
            bottom_margin_pt: layout.bottom_margin_pt,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn offset(&self) -> f64 {
        self.offset_pt
    }

    /// Lowest y a block may reach on this page
    pub fn limit(&self) -> f64 {
        self.page_height_pt - self.bottom_margin_pt
    }

    /// True when nothing has been placed on the current page
    pub fn at_page_top(&self) -> bool {
        self.offset_pt <= self.top_margin_pt
    }

    /// Whether a block of this height fits below the cursor
    pub fn fits(&self, height_pt: f64) -> bool {
        self.offset_pt + height_pt <= self.limit()
    }

    /// Reserve `height_pt` and return the block's y offset.
    pub fn place(&mut self, height_pt: f64) -> f64 {
        let y = self.offset_pt;
        self.offset_pt += height_pt;
        y
    }

    /// Move to the top of the next page.
    pub fn break_page(&mut self) {
        self.page_index += 1;
        self.offset_pt = self.top_margin_pt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_lifecycle() {
        let layout = PageLayout::letter();
        let mut cursor = DocumentCursor::new(&layout);
        assert!(cursor.at_page_top());
        assert_eq!(cursor.limit(), 720.0);

        assert_eq!(cursor.place(100.0), 72.0);
        assert_eq!(cursor.offset(), 172.0);
        assert!(!cursor.at_page_top());
        assert!(cursor.fits(548.0));
        assert!(!cursor.fits(548.5));

        cursor.break_page();
        assert_eq!(cursor.page_index(), 1);
        assert_eq!(cursor.offset(), 72.0);
    }
}
