//! # Inspection Equations
//!
//! Every formula the engine applies is registered here with its code
//! reference, so a report can list exactly which equations produced its
//! numbers.
//!
//! ## Modules
//!
//! - [`registry`] - Equation metadata and usage tracking for the report appendix
//!
//! ## References
//!
//! - API 653 (5th Edition): Tank Inspection, Repair, Alteration, and Reconstruction
//! - Ordinary least squares regression for the settlement fit

pub mod registry;

pub use registry::{
    CodeReference, Equation, EquationCategory, EquationMetadata, EquationTracker, EquationUsage, Variable,
    ALL_EQUATIONS,
};
