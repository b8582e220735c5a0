//! # Renderers
//!
//! Presentation strategies over a finished [`DocumentModel`]. Pagination is
//! already fixed by the assembler; a renderer only decides how each placed
//! block looks. Page breaks and footers come from the model, never from the
//! output format.
//!
//! | Format  | Renderer                 | Output                         |
//! |---------|--------------------------|--------------------------------|
//! | `text`  | [`PlainTextRenderer`]    | Fixed-width text, one page per form feed |
//! | `typst` | [`TypstMarkupRenderer`]  | Typst markup ready for compilation |
//! | `json`  | [`JsonRenderer`]         | The serialized document model  |

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::report::model::{ContentBlock, DocumentModel, Page};

/// A presentation strategy for a paginated document.
pub trait RenderStrategy {
    /// Short format name
    fn name(&self) -> &'static str;

    /// Render the whole document.
    fn render(&self, document: &DocumentModel) -> CalcResult<String>;
}

/// Output formats selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    Text,
    Typst,
    Json,
}

impl RenderFormat {
    pub fn from_name(name: &str) -> CalcResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(RenderFormat::Text),
            "typst" | "typ" => Ok(RenderFormat::Typst),
            "json" => Ok(RenderFormat::Json),
            other => Err(CalcError::invalid_input(
                "format",
                other,
                "Expected one of: text, typst, json",
            )),
        }
    }
}

/// Renderer for a format.
pub fn renderer_for(format: RenderFormat) -> Box<dyn RenderStrategy> {
    match format {
        RenderFormat::Text => Box::new(PlainTextRenderer::default()),
        RenderFormat::Typst => Box::new(TypstMarkupRenderer),
        RenderFormat::Json => Box::new(JsonRenderer),
    }
}

// ============================================================================
// Plain text
// ============================================================================

/// Fixed-width text. Pages are separated by a form feed.
#[derive(Debug, Clone)]
pub struct PlainTextRenderer {
    pub width: usize,
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        PlainTextRenderer { width: 90 }
    }
}

impl PlainTextRenderer {
    fn render_page(&self, page: &Page, out: &mut String) {
        for placed in &page.blocks {
            self.render_block(&placed.block, out);
        }
        let _ = writeln!(out, "{}", "-".repeat(self.width));
        let _ = writeln!(out, "{:>width$}", page.footer.text, width = self.width);
    }

    fn render_block(&self, block: &ContentBlock, out: &mut String) {
        match block {
            ContentBlock::Heading { text, level } => {
                let rule = if *level <= 1 { '=' } else { '-' };
                let _ = writeln!(out, "\n{}", text);
                let _ = writeln!(out, "{}", rule.to_string().repeat(text.chars().count()));
            }
            ContentBlock::KeyValue { rows } => {
                let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
                for (key, value) in rows {
                    let _ = writeln!(out, "  {:<width$}  {}", key, value, width = key_width);
                }
            }
            ContentBlock::Table { caption, columns, rows } => {
                if let Some(caption) = caption {
                    let _ = writeln!(out, "  {}", caption);
                }
                let widths = column_widths(columns, rows);
                let _ = writeln!(out, "  {}", pad_row(columns, &widths));
                let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
                let _ = writeln!(out, "  {}", rule.join("  "));
                for row in rows {
                    let _ = writeln!(out, "  {}", pad_row(row, &widths));
                }
            }
            ContentBlock::Paragraph { text } => {
                for line in crate::report::model::wrap_lines(text, self.width.saturating_sub(2)) {
                    let _ = writeln!(out, "  {}", line);
                }
            }
            ContentBlock::Banner { label, value } => {
                let _ = writeln!(out, "  ** {}: {} **", label, value);
            }
            ContentBlock::Placeholder { text } => {
                let _ = writeln!(out, "  ({})", text);
            }
            ContentBlock::Equation {
                name,
                formula_plain,
                reference,
                variables,
                applied_in,
                ..
            } => {
                let _ = writeln!(out, "  {}", name);
                let _ = writeln!(out, "      {}", formula_plain);
                let _ = writeln!(out, "      Ref: {}   Used in: {}", reference, applied_in.join(", "));
                for v in variables {
                    let _ = writeln!(out, "      {} = {} [{}]", v.symbol, v.description, v.units);
                }
            }
        }
    }
}

fn column_widths(columns: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    widths
}

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

impl RenderStrategy for PlainTextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, document: &DocumentModel) -> CalcResult<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{}", document.title);
        let _ = writeln!(out, "Document {}", document.document_id);
        let _ = writeln!(out, "Generated {}", document.generated_at.format("%Y-%m-%d %H:%M UTC"));
        for (i, page) in document.pages.iter().enumerate() {
            if i > 0 {
                out.push('\u{c}');
                out.push('\n');
            }
            self.render_page(page, &mut out);
        }
        Ok(out)
    }
}

// ============================================================================
// Typst markup
// ============================================================================

/// Typst source with one explicit page per document page.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypstMarkupRenderer;

/// Escape characters that carry meaning in Typst markup.
pub fn escape_typst(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn typst_cells(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| format!("[{}]", escape_typst(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

impl TypstMarkupRenderer {
    fn preamble(&self, document: &DocumentModel) -> String {
        let layout = &document.layout;
        format!(
            r##"#set page(
  height: {height}pt,
  width: 612pt,
  margin: (top: {top}pt, bottom: {bottom}pt, left: 54pt, right: 54pt),
)
#set text(size: 10pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{title}]
  ]
]
"##,
            height = layout.page_height_pt,
            top = layout.top_margin_pt,
            bottom = layout.bottom_margin_pt,
            title = escape_typst(&document.title),
        )
    }

    fn render_block(&self, block: &ContentBlock, out: &mut String) {
        match block {
            ContentBlock::Heading { text, level } => {
                let marker = if *level <= 1 { "==" } else { "===" };
                let _ = writeln!(out, "\n{} {}\n", marker, escape_typst(text));
            }
            ContentBlock::KeyValue { rows } => {
                let _ = writeln!(out, "#table(\n  columns: (auto, 1fr),\n  stroke: none,\n  row-gutter: 4pt,");
                for (key, value) in rows {
                    let _ = writeln!(out, "  [*{}:*], [{}],", escape_typst(key), escape_typst(value));
                }
                let _ = writeln!(out, ")");
            }
            ContentBlock::Table { caption, columns, rows } => {
                if let Some(caption) = caption {
                    let _ = writeln!(out, "_{}_\n", escape_typst(caption));
                }
                let header = columns
                    .iter()
                    .map(|c| format!("[*{}*]", escape_typst(c)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "#table(\n  columns: {},\n  inset: 6pt,\n  stroke: 0.5pt,\n  table.header({}),",
                    columns.len(),
                    header
                );
                for row in rows {
                    let _ = writeln!(out, "  {},", typst_cells(row));
                }
                let _ = writeln!(out, ")");
            }
            ContentBlock::Paragraph { text } => {
                let _ = writeln!(out, "{}\n", escape_typst(text));
            }
            ContentBlock::Banner { label, value } => {
                let _ = writeln!(
                    out,
                    "#block(width: 100%, fill: rgb(\"#f0f0f0\"), inset: 8pt, radius: 4pt)[*{}:* {}]",
                    escape_typst(label),
                    escape_typst(value)
                );
            }
            ContentBlock::Placeholder { text } => {
                let _ = writeln!(out, "#text(fill: gray)[{}]\n", escape_typst(text));
            }
            ContentBlock::Equation {
                name,
                formula_typst,
                reference,
                variables,
                applied_in,
                ..
            } => {
                let _ = writeln!(out, "*{}*\n", escape_typst(name));
                let _ = writeln!(out, "$ {} $\n", formula_typst);
                let _ = writeln!(
                    out,
                    "#text(size: 9pt)[{} | Used in: {}]\n",
                    escape_typst(reference),
                    escape_typst(&applied_in.join(", "))
                );
                for v in variables {
                    let _ = writeln!(
                        out,
                        "- {}: {} ({})",
                        escape_typst(&v.symbol),
                        escape_typst(&v.description),
                        escape_typst(&v.units)
                    );
                }
            }
        }
    }
}

impl RenderStrategy for TypstMarkupRenderer {
    fn name(&self) -> &'static str {
        "typst"
    }

    fn render(&self, document: &DocumentModel) -> CalcResult<String> {
        let mut out = self.preamble(document);
        for (i, page) in document.pages.iter().enumerate() {
            if i > 0 {
                let _ = writeln!(out, "\n#pagebreak()");
            }
            for placed in &page.blocks {
                self.render_block(&placed.block, &mut out);
            }
            let _ = writeln!(
                out,
                "#place(bottom + right, dy: 24pt)[#text(size: 9pt)[{}]]",
                escape_typst(&page.footer.text)
            );
        }
        Ok(out)
    }
}

// ============================================================================
// JSON
// ============================================================================

/// The document model as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl RenderStrategy for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, document: &DocumentModel) -> CalcResult<String> {
        serde_json::to_string_pretty(document).map_err(|e| CalcError::SerializationError {
            reason: format!("Failed to serialize document: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{PageLayout, ReportAssembler, ReportSection};

    fn document() -> DocumentModel {
        let sections = vec![
            ReportSection::new("Tank Information").with_block(ContentBlock::key_value([("Tank ID", "T_101")])),
            ReportSection::new("Appendix").starting_new_page(),
        ];
        ReportAssembler::new(PageLayout::letter())
            .unwrap()
            .with_title("Inspection #42")
            .assemble(&sections)
            .unwrap()
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("T_101 #1"), "T\\_101 \\#1");
        assert_eq!(escape_typst("a*b"), "a\\*b");
        assert_eq!(escape_typst("plain"), "plain");
    }

    #[test]
    fn test_text_pages_and_footers() {
        let text = PlainTextRenderer::default().render(&document()).unwrap();
        assert_eq!(text.matches('\u{c}').count(), 1);
        assert!(text.contains("Page 1 of 2"));
        assert!(text.contains("Page 2 of 2"));
        assert!(text.contains("T_101"));
        assert!(text.contains("(No data available)"));
    }

    #[test]
    fn test_typst_escapes_content() {
        let typst = TypstMarkupRenderer.render(&document()).unwrap();
        assert!(typst.contains("Inspection \\#42"));
        assert!(typst.contains("[T\\_101]"));
        assert_eq!(typst.matches("#pagebreak()").count(), 1);
    }

    #[test]
    fn test_json_round_trips_model() {
        let doc = document();
        let json = JsonRenderer.render(&doc).unwrap();
        let parsed: DocumentModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_pages, 2);
        assert_eq!(parsed.document_id, doc.document_id);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(RenderFormat::from_name("TYPST").unwrap(), RenderFormat::Typst);
        assert!(RenderFormat::from_name("pdf").is_err());
        assert_eq!(renderer_for(RenderFormat::Text).name(), "text");
    }
}
