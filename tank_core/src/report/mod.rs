//! # Report Assembly
//!
//! Sections are built from analysis results, paginated by the
//! [`ReportAssembler`] into a [`DocumentModel`], then handed to a
//! [`RenderStrategy`].
//!
//! - [`layout`] - page geometry presets
//! - [`model`] - content blocks, sections, pages
//! - [`cursor`] - vertical position during pagination
//! - [`assembler`] - first-fit paginator and footer stamping
//! - [`sections`] - section builders in fixed report order
//! - [`format`] - numeric display rules
//! - [`render`] - text, Typst, and JSON output

pub mod assembler;
pub mod cursor;
pub mod format;
pub mod layout;
pub mod model;
pub mod render;
pub mod sections;

pub use assembler::ReportAssembler;
pub use layout::PageLayout;
pub use model::{ContentBlock, DocumentModel, Footer, Page, PositionedBlock, ReportSection};
pub use render::{renderer_for, JsonRenderer, PlainTextRenderer, RenderFormat, RenderStrategy, TypstMarkupRenderer};
