//! # tank_core - Tank Inspection Calculation Engine
//!
//! `tank_core` turns an above-ground storage tank inspection (thickness
//! readings, an optional radial settlement survey, and tank metadata) into
//! corrosion analytics, a governing shell course, a settlement verdict, and a
//! paginated report. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: analyzers are pure functions; each report gets a fresh assembler
//! - **JSON-First**: all request, result, and document types implement Serialize/Deserialize
//! - **Rich Errors**: fatal problems are structured [`CalcError`]s, recoverable ones are
//!   [`DataQualityWarning`]s attached to the output
//!
//! ## Quick Start
//!
//! ```rust
//! use tank_core::config::EngineConfig;
//! use tank_core::inspection::{InspectionRequest, RawField, RawMeasurement};
//! use tank_core::report::{PlainTextRenderer, RenderStrategy};
//!
//! let mut request = InspectionRequest::new("T-101");
//! request.tank.age_years = Some(RawField::Number(10.0));
//! request.measurements.push(
//!     RawMeasurement::new("Shell", "Course 1", "shell")
//!         .with_original(0.500)
//!         .with_current(0.450),
//! );
//!
//! let output = tank_core::generate_report(&request, &EngineConfig::default()).unwrap();
//! let text = PlainTextRenderer::default().render(&output.document).unwrap();
//! assert!(text.contains("Thickness Measurements"));
//! ```
//!
//! ## Modules
//!
//! - [`inspection`] - Raw request contract
//! - [`input`] - Validation boundary producing typed records
//! - [`calculations`] - Corrosion, shell course, and settlement analyzers
//! - [`equations`] - Registry of applied equations
//! - [`report`] - Sections, pagination, and renderers
//! - [`pipeline`] - End-to-end report generation
//! - [`config`] - Analysis policy and page layout
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error and warning types
//! - [`file_io`] - JSON loading and atomic saves

pub mod calculations;
pub mod config;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod input;
pub mod inspection;
pub mod pipeline;
pub mod report;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use config::{AnalysisPolicy, EngineConfig};
pub use errors::{CalcError, CalcResult, DataQualityWarning, WarningCode};
pub use file_io::{load_config, load_request, save_text_atomic};
pub use inspection::{InspectionRequest, SCHEMA_VERSION};
pub use pipeline::{analyze_inspection, generate_report, AnalyticsSummary, ReportOutput};
