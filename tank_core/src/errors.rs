//! # Error Types
//!
//! Structured error types for tank_core. Fatal conditions are [`CalcError`]
//! values returned through [`CalcResult`]; recoverable data-quality problems
//! are [`DataQualityWarning`] values that travel with the output instead.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::errors::{CalcError, CalcResult};
//!
//! fn validate_thickness(t_in: f64) -> CalcResult<()> {
//!     if t_in <= 0.0 || t_in > 2.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "current_thickness".to_string(),
//!             value: t_in.to_string(),
//!             reason: "Thickness must be within (0, 2.0] in".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tank_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation and assembly operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by callers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not a number, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Not enough observations for a stable analysis
    #[error("Insufficient data for {analysis}: {provided} provided, {required} required")]
    InsufficientData {
        analysis: String,
        required: usize,
        provided: usize,
    },

    /// A single content block cannot fit on an empty page
    #[error("Block too large: '{block}' in section '{section}' needs {height_pt:.1} pt, page holds {usable_pt:.1} pt")]
    BlockTooLarge {
        section: String,
        block: String,
        height_pt: f64,
        usable_pt: f64,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InsufficientData error
    pub fn insufficient_data(analysis: impl Into<String>, required: usize, provided: usize) -> Self {
        CalcError::InsufficientData {
            analysis: analysis.into(),
            required,
            provided,
        }
    }

    /// Create a BlockTooLarge error
    pub fn block_too_large(section: impl Into<String>, block: impl Into<String>, height_pt: f64, usable_pt: f64) -> Self {
        CalcError::BlockTooLarge {
            section: section.into(),
            block: block.into(),
            height_pt,
            usable_pt,
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (the report can still be produced)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::InsufficientData { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::InsufficientData { .. } => "INSUFFICIENT_DATA",
            CalcError::BlockTooLarge { .. } => "BLOCK_TOO_LARGE",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

// ============================================================================
// Data Quality Warnings
// ============================================================================

/// Category of a recoverable data-quality problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// Original or current thickness absent, blank, or zero
    MissingThickness,
    /// No corrosion time base could be derived for the report
    MissingAge,
    /// Current thickness exceeds original (negative corrosion rate)
    ThicknessGain,
    /// A metadata field was replaced by a fallback value
    MetadataFallback,
    /// Settlement survey could not be fitted
    SettlementInsufficient,
    /// No allowable settlement limit could be resolved
    SettlementLimitUnavailable,
    /// No shell measurement matched a course pattern
    NoShellData,
}

impl WarningCode {
    /// Short label for tables
    pub fn label(&self) -> &'static str {
        match self {
            WarningCode::MissingThickness => "Missing thickness",
            WarningCode::MissingAge => "Missing age",
            WarningCode::ThicknessGain => "Thickness gain",
            WarningCode::MetadataFallback => "Metadata fallback",
            WarningCode::SettlementInsufficient => "Settlement data",
            WarningCode::SettlementLimitUnavailable => "Settlement limit",
            WarningCode::NoShellData => "No shell data",
        }
    }
}

/// A recoverable problem that was resolved by a documented sentinel or
/// fallback policy. Warnings are attached to the output, never dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    pub code: WarningCode,
    /// What the warning is about (field name, measurement label, ...)
    pub subject: String,
    pub message: String,
}

impl DataQualityWarning {
    pub fn new(code: WarningCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = DataQualityWarning {
            code,
            subject: subject.into(),
            message: message.into(),
        };
        tracing::warn!(code = ?warning.code, subject = %warning.subject, "{}", warning.message);
        warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("current_thickness", "2.5", "Thickness must be within (0, 2.0] in");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalcError::block_too_large("Measurements", "Table", 900.0, 648.0).error_code(),
            "BLOCK_TOO_LARGE"
        );
        assert_eq!(CalcError::insufficient_data("settlement", 4, 2).error_code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn test_only_insufficient_data_is_recoverable() {
        assert!(CalcError::insufficient_data("settlement", 4, 2).is_recoverable());
        assert!(!CalcError::block_too_large("A", "B", 1.0, 0.5).is_recoverable());
        assert!(!CalcError::invalid_input("age_years", "-1", "negative").is_recoverable());
    }

    #[test]
    fn test_block_too_large_message() {
        let error = CalcError::block_too_large("Shell", "Course table", 812.5, 648.0);
        assert_eq!(
            error.to_string(),
            "Block too large: 'Course table' in section 'Shell' needs 812.5 pt, page holds 648.0 pt"
        );
    }

    #[test]
    fn test_warning_code_serialization() {
        let warning = DataQualityWarning::new(WarningCode::MissingAge, "corrosion_time_base", "No age");
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"MISSING_AGE\""));
    }
}
