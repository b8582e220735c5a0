//! Page geometry used for pagination.
//!
//! All dimensions are in points (1/72 in). Block heights are estimated from
//! content as `rows × row_height (+ header_height)`; the assembler never
//! measures rendered output.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Page geometry and text metrics for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// Preset name, informational
    pub name: String,
    pub page_height_pt: f64,
    pub top_margin_pt: f64,
    pub bottom_margin_pt: f64,
    /// Height of one table row or text line
    pub row_height_pt: f64,
    /// Fixed height of headings and table header rows
    pub header_height_pt: f64,
    /// Characters per line used to wrap paragraphs
    pub chars_per_line: usize,
    /// Footer text; `{page}` and `{total}` are substituted
    pub footer_template: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        PageLayout::letter()
    }
}

impl PageLayout {
    /// US Letter, 1 in margins
    pub fn letter() -> Self {
        PageLayout {
            name: "letter".to_string(),
            page_height_pt: 792.0,
            top_margin_pt: 72.0,
            bottom_margin_pt: 72.0,
            row_height_pt: 14.0,
            header_height_pt: 24.0,
            chars_per_line: 90,
            footer_template: "Page {page} of {total}".to_string(),
        }
    }

    /// ISO A4, 20 mm margins
    pub fn a4() -> Self {
        PageLayout {
            name: "a4".to_string(),
            page_height_pt: 842.0,
            top_margin_pt: 56.69,
            bottom_margin_pt: 56.69,
            chars_per_line: 86,
            ..PageLayout::letter()
        }
    }

    /// US Letter with half-inch margins and tighter rows
    pub fn compact() -> Self {
        PageLayout {
            name: "compact".to_string(),
            page_height_pt: 792.0,
            top_margin_pt: 36.0,
            bottom_margin_pt: 36.0,
            row_height_pt: 11.0,
            header_height_pt: 18.0,
            chars_per_line: 110,
            footer_template: "Page {page} of {total}".to_string(),
        }
    }

    /// Vertical space available for blocks on one page
    pub fn usable_height(&self) -> f64 {
        self.page_height_pt - self.top_margin_pt - self.bottom_margin_pt
    }

    /// Largest number of body rows a single table block may hold
    pub fn max_table_rows(&self) -> usize {
        let rows = ((self.usable_height() - self.header_height_pt) / self.row_height_pt).floor();
        if rows.is_finite() && rows >= 1.0 {
            rows as usize
        } else {
            1
        }
    }

    /// Largest number of wrapped text lines a single paragraph block may hold
    pub fn max_text_lines(&self) -> usize {
        let lines = (self.usable_height() / self.row_height_pt).floor();
        if lines.is_finite() && lines >= 1.0 {
            lines as usize
        } else {
            1
        }
    }

    /// Footer text for one page
    pub fn footer_text(&self, page: usize, total: usize) -> String {
        self.footer_template
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }

    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("layout.page_height_pt", self.page_height_pt),
            ("layout.row_height_pt", self.row_height_pt),
            ("layout.header_height_pt", self.header_height_pt),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be a positive number"));
            }
        }
        for (field, value) in [
            ("layout.top_margin_pt", self.top_margin_pt),
            ("layout.bottom_margin_pt", self.bottom_margin_pt),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Margin cannot be negative"));
            }
        }
        // A page must hold at least a table header and one row
        if self.usable_height() < self.header_height_pt + self.row_height_pt {
            return Err(CalcError::invalid_input(
                "layout",
                format!("{:.1} pt usable", self.usable_height()),
                "Margins leave no room for content",
            ));
        }
        if self.chars_per_line == 0 {
            return Err(CalcError::invalid_input("layout.chars_per_line", "0", "Must be at least 1"));
        }
        Ok(())
    }
}
