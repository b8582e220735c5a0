//! # Inspection Calculations
//!
//! Pure analysis functions over validated inspection data. Each analyzer
//! follows the same pattern:
//!
//! - typed input records (JSON-serializable)
//! - a `*Result` / `*Profile` / `*Analysis` output (JSON-serializable)
//! - recoverable data problems returned as [`crate::errors::DataQualityWarning`]s
//!   alongside the output, fatal ones as [`crate::errors::CalcError`]
//!
//! ## Available Analyzers
//!
//! - [`corrosion`] - Per-reading corrosion rate, remaining life and status
//! - [`shell_course`] - Shell course grouping and governing course
//! - [`settlement`] - Cosine fit of radial settlement surveys

pub mod corrosion;
pub mod settlement;
pub mod shell_course;

// Re-export commonly used types
pub use corrosion::{
    analyze_measurement, analyze_measurements, classify_status, corrosion_rate, remaining_life, ComponentKind,
    CorrosionTrend, InspectionStatus, Measurement, MeasurementResult,
};
pub use settlement::{
    analyze_settlement, fit_cosine, CosineFit, LimitSource, PointDeviation, SettlementAcceptance, SettlementPoint,
    SettlementProfile, SettlementSurvey,
};
pub use shell_course::{aggregate_courses, governing_course, parse_course_number, ShellCourse, ShellCourseAnalysis};
