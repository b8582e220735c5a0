//! # Report Assembler
//!
//! Paginates report sections into a [`DocumentModel`].
//!
//! ## State Machine
//!
//! ```text
//! Idle --assemble()--> Paginating --all blocks placed--> Finalizing --footers stamped--> Done
//! ```
//!
//! - **Paginating**: blocks are placed first-fit in order. A block that does
//!   not fit below the cursor moves to a new page; blocks are never split. A
//!   heading moves with the block after it when the pair fits on one page. A
//!   block taller than the usable page height fails with
//!   [`CalcError::BlockTooLarge`].
//! - **Finalizing**: once the page count is known, a second pass stamps
//!   `Page X of N` footers.
//!
//! `assemble` consumes the assembler, so a cursor can never outlive its
//! report. The state is only visible in `trace` logs.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::report::{ContentBlock, PageLayout, ReportAssembler, ReportSection};
//!
//! let sections = vec![
//!     ReportSection::new("Tank Information").with_block(ContentBlock::key_value([("Tank", "T-101")])),
//!     ReportSection::new("Settlement Survey"),
//! ];
//!
//! let document = ReportAssembler::new(PageLayout::letter())
//!     .unwrap()
//!     .with_title("API 653 Inspection Report")
//!     .assemble(&sections)
//!     .unwrap();
//!
//! assert_eq!(document.total_pages, 1);
//! assert_eq!(document.pages[0].footer.text, "Page 1 of 1");
//! ```

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::report::cursor::DocumentCursor;
use crate::report::layout::PageLayout;
use crate::report::model::{ContentBlock, DocumentModel, Footer, Page, PositionedBlock, ReportSection};

/// Assembly lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    Idle,
    Paginating,
    Finalizing,
    Done,
}

/// Single-use paginator for one report.
#[derive(Debug)]
pub struct ReportAssembler {
    layout: PageLayout,
    title: String,
    state: AssemblerState,
}

impl ReportAssembler {
    /// Create an idle assembler. The layout is validated up front.
    pub fn new(layout: PageLayout) -> CalcResult<Self> {
        layout.validate()?;
        Ok(ReportAssembler {
            layout,
            title: "Inspection Report".to_string(),
            state: AssemblerState::Idle,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn transition(&mut self, next: AssemblerState) {
        tracing::trace!(from = ?self.state, to = ?next, "assembler state");
        self.state = next;
    }

    /// Paginate sections in order and return the finished document.
    ///
    /// # Returns
    ///
    /// * `Ok(DocumentModel)` - pages with positioned blocks and footers
    /// * `Err(CalcError::BlockTooLarge)` - a block cannot fit on an empty page
    #[tracing::instrument(skip_all, fields(title = %self.title, sections = sections.len()))]
    pub fn assemble(mut self, sections: &[ReportSection]) -> CalcResult<DocumentModel> {
        self.transition(AssemblerState::Paginating);
        let drafts = self.paginate(sections)?;

        self.transition(AssemblerState::Finalizing);
        let pages = self.stamp_footers(drafts);

        self.transition(AssemblerState::Done);
        tracing::debug!(pages = pages.len(), "report assembled");

        Ok(DocumentModel {
            document_id: Uuid::new_v4(),
            title: self.title,
            generated_at: Utc::now(),
            layout: self.layout,
            total_pages: pages.len(),
            pages,
        })
    }

    fn paginate(&self, sections: &[ReportSection]) -> CalcResult<Vec<Vec<PositionedBlock>>> {
        let usable = self.layout.usable_height();
        let mut cursor = DocumentCursor::new(&self.layout);
        let mut pages: Vec<Vec<PositionedBlock>> = vec![Vec::new()];

        for section in sections {
            if section.starts_new_page && !cursor.at_page_top() {
                cursor.break_page();
                pages.push(Vec::new());
            }

            let blocks = section.layout_blocks();
            let heights: Vec<f64> = blocks.iter().map(|b| b.height(&self.layout)).collect();
            for (i, block) in blocks.into_iter().enumerate() {
                let height = heights[i];
                if height > usable {
                    return Err(CalcError::block_too_large(
                        section.title.as_str(),
                        block.describe(),
                        height,
                        usable,
                    ));
                }
                // keep a heading with its first block when both fit on a page
                let needed = match (&block, heights.get(i + 1)) {
                    (ContentBlock::Heading { .. }, Some(next)) if height + next <= usable => height + next,
                    _ => height,
                };
                if !cursor.fits(needed) && !cursor.at_page_top() {
                    cursor.break_page();
                    pages.push(Vec::new());
                }
                let y_offset_pt = cursor.place(height);
                if let Some(page) = pages.last_mut() {
                    page.push(PositionedBlock {
                        section: section.title.clone(),
                        y_offset_pt,
                        height_pt: height,
                        block,
                    });
                }
            }
        }

        Ok(pages)
    }

    fn stamp_footers(&self, drafts: Vec<Vec<PositionedBlock>>) -> Vec<Page> {
        let total = drafts.len();
        drafts
            .into_iter()
            .enumerate()
            .map(|(i, blocks)| {
                let number = i + 1;
                Page {
                    number,
                    blocks,
                    footer: Footer {
                        page_number: number,
                        total_pages: total,
                        text: self.layout.footer_text(number, total),
                    },
                }
            })
            .collect()
    }
}
