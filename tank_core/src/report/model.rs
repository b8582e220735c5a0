//! # Document Model
//!
//! Content blocks, report sections, and the paginated document produced by the
//! [`crate::report::ReportAssembler`]. The model carries resolved text only;
//! presentation is left to a [`crate::report::RenderStrategy`].
//!
//! ## Block Heights
//!
//! | Block       | Height                                   |
//! |-------------|------------------------------------------|
//! | Heading     | header height                            |
//! | KeyValue    | rows × row height                        |
//! | Table       | header height + rows × row height        |
//! | Paragraph   | wrapped lines × row height               |
//! | Banner      | header height                            |
//! | Placeholder | row height                               |
//! | Equation    | (3 + variables) × row height             |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::layout::PageLayout;

/// Text shown for a section with no content
pub const NO_DATA_PLACEHOLDER: &str = "No data available";

/// One variable row of an equation block: symbol, description, units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationVariable {
    pub symbol: String,
    pub description: String,
    pub units: String,
}

/// An indivisible unit of report content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading {
        text: String,
        /// 1 for section titles, 2 for sub-headings
        level: u8,
    },
    KeyValue {
        rows: Vec<(String, String)>,
    },
    Table {
        caption: Option<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Paragraph {
        text: String,
    },
    /// Highlighted status line
    Banner {
        label: String,
        value: String,
    },
    Placeholder {
        text: String,
    },
    Equation {
        name: String,
        formula_plain: String,
        formula_typst: String,
        reference: String,
        variables: Vec<EquationVariable>,
        applied_in: Vec<String>,
    },
}

impl ContentBlock {
    pub fn heading(text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            text: text.into(),
            level: 1,
        }
    }

    pub fn subheading(text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            text: text.into(),
            level: 2,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph { text: text.into() }
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        ContentBlock::Placeholder { text: text.into() }
    }

    pub fn banner(label: impl Into<String>, value: impl Into<String>) -> Self {
        ContentBlock::Banner {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn key_value<K: Into<String>, V: Into<String>>(rows: impl IntoIterator<Item = (K, V)>) -> Self {
        ContentBlock::KeyValue {
            rows: rows.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn table(caption: Option<String>, columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        ContentBlock::Table {
            caption,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// Estimated height in points under a layout.
    pub fn height(&self, layout: &PageLayout) -> f64 {
        let rows = |n: usize| n as f64 * layout.row_height_pt;
        match self {
            ContentBlock::Heading { .. } | ContentBlock::Banner { .. } => layout.header_height_pt,
            ContentBlock::KeyValue { rows: kv } => rows(kv.len()),
            ContentBlock::Table { rows: body, .. } => layout.header_height_pt + rows(body.len()),
            ContentBlock::Paragraph { text } => rows(wrap_lines(text, layout.chars_per_line).len()),
            ContentBlock::Placeholder { .. } => layout.row_height_pt,
            ContentBlock::Equation { variables, .. } => rows(3 + variables.len()),
        }
    }

    /// Short description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            ContentBlock::Heading { text, .. } => format!("heading '{}'", text),
            ContentBlock::KeyValue { rows } => format!("key-value list ({} rows)", rows.len()),
            ContentBlock::Table { caption, rows, .. } => match caption {
                Some(caption) => format!("table '{}' ({} rows)", caption, rows.len()),
                None => format!("table ({} rows)", rows.len()),
            },
            ContentBlock::Paragraph { text } => {
                let preview: String = text.chars().take(32).collect();
                format!("paragraph '{}'", preview)
            }
            ContentBlock::Banner { label, .. } => format!("banner '{}'", label),
            ContentBlock::Placeholder { text } => format!("placeholder '{}'", text),
            ContentBlock::Equation { name, .. } => format!("equation '{}'", name),
        }
    }
}

/// Greedy word wrap at `width` characters. Words longer than a line are
/// split. Always returns at least one line.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in source_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// A titled group of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
    /// Start on a fresh page unless the current page is still empty
    pub starts_new_page: bool,
}

impl ReportSection {
    pub fn new(title: impl Into<String>) -> Self {
        ReportSection {
            title: title.into(),
            blocks: Vec::new(),
            starts_new_page: false,
        }
    }

    pub fn with_block(mut self, block: ContentBlock) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn push(&mut self, block: ContentBlock) {
        self.blocks.push(block);
    }

    pub fn extend(&mut self, blocks: impl IntoIterator<Item = ContentBlock>) {
        self.blocks.extend(blocks);
    }

    pub fn starting_new_page(mut self) -> Self {
        self.starts_new_page = true;
        self
    }

    /// Blocks as paginated: heading first, then content, or a placeholder
    /// when the section is empty.
    pub fn layout_blocks(&self) -> Vec<ContentBlock> {
        let mut blocks = Vec::with_capacity(self.blocks.len() + 1);
        blocks.push(ContentBlock::heading(self.title.clone()));
        if self.blocks.is_empty() {
            blocks.push(ContentBlock::placeholder(NO_DATA_PLACEHOLDER));
        } else {
            blocks.extend(self.blocks.iter().cloned());
        }
        blocks
    }
}

/// A block placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedBlock {
    /// Title of the owning section
    pub section: String,
    /// Distance from the top edge of the page (pt)
    pub y_offset_pt: f64,
    pub height_pt: f64,
    pub block: ContentBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub page_number: usize,
    pub total_pages: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub blocks: Vec<PositionedBlock>,
    pub footer: Footer,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// The finished, paginated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub document_id: Uuid,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub layout: PageLayout,
    pub pages: Vec<Page>,
    pub total_pages: usize,
}

impl DocumentModel {
    /// Every placed block in reading order
    pub fn blocks(&self) -> impl Iterator<Item = &PositionedBlock> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    /// First page that holds a block of the given section
    pub fn page_of_section(&self, title: &str) -> Option<usize> {
        self.pages
            .iter()
            .find(|p| p.blocks.iter().any(|b| b.section == title))
            .map(|p| p.number)
    }

    /// Section titles in the order they first appear
    pub fn section_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = Vec::new();
        for block in self.blocks() {
            if !titles.contains(&block.section.as_str()) {
                titles.push(&block.section);
            }
        }
        titles
    }
}
