//! # Equation Registry
//!
//! Central registry of every equation the inspection engine applies. Each
//! equation carries its formula, variable definitions and code reference so a
//! report can close with an auditable "List of Equations" appendix.
//!
//! ## Usage
//!
//! ```rust
//! use tank_core::equations::registry::{Equation, EquationTracker};
//!
//! let mut tracker = EquationTracker::new();
//! tracker.record_for_subject(Equation::LongTermCorrosionRate, "Thickness readings", "CML-01");
//!
//! let meta = Equation::LongTermCorrosionRate.metadata();
//! assert!(meta.formula_plain.contains("t_orig - t_curr"));
//! assert_eq!(tracker.unique_equations(), vec![Equation::LongTermCorrosionRate]);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// Code References
// ============================================================================

/// Source an equation is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CodeReference {
    /// API 653 Tank Inspection, Repair, Alteration, and Reconstruction
    Api653 { edition: u8, section: &'static str },
    /// Ordinary least squares / descriptive statistics
    Statistics,
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Api653 { edition, section } => {
                format!("API 653 {}th Ed., {}", edition, section)
            }
            CodeReference::Statistics => "Least-Squares Regression".to_string(),
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in the appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Corrosion rates and remaining life
    Corrosion,
    /// Shell course evaluation
    ShellEvaluation,
    /// Settlement fit and acceptance
    Settlement,
}

impl EquationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Corrosion => "Corrosion",
            EquationCategory::ShellEvaluation => "Shell Evaluation",
            EquationCategory::Settlement => "Settlement",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::Corrosion => 1,
            EquationCategory::ShellEvaluation => 2,
            EquationCategory::Settlement => 3,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "t_curr", "CR")
    pub symbol: &'static str,
    pub description: &'static str,
    /// Units (e.g., "in", "in/yr")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one equation.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in Typst math notation
    pub formula_typst: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    pub reference: CodeReference,
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    pub category: EquationCategory,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the inspection engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    /// CR = (t_orig - t_curr) / age
    LongTermCorrosionRate,
    /// CR_st = (t_prev - t_curr) / interval
    ShortTermCorrosionRate,
    /// RL = (t_curr - t_min) / CR
    RemainingLife,
    /// t_course = min(t_curr)
    CourseMinimumThickness,
    /// elevation = A cos(θ - φ) + b
    CosineSettlementFit,
    /// R² = 1 - SS_res / SS_tot
    CoefficientOfDetermination,
    /// S_i = |measured - fitted|
    OutOfPlaneDeviation,
    /// S_max = L² Y 11 / (2 E H)
    Api653SettlementLimit,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::LongTermCorrosionRate => EquationMetadata {
                name: "Long-Term Corrosion Rate",
                description: "Average metal loss per year between original and current thickness",
                formula_typst: r#"$C R = (t_("orig") - t_("curr")) / "age"$"#,
                formula_plain: "CR = (t_orig - t_curr) / age",
                reference: CodeReference::Api653 { edition: 5, section: "4.4.5.1" },
                variables: vec![
                    Variable::new("CR", "Corrosion rate", "in/yr"),
                    Variable::new("t_orig", "Original (nominal) thickness", "in"),
                    Variable::new("t_curr", "Current measured thickness", "in"),
                    Variable::new("age", "Corrosion time base", "yr"),
                ],
                assumptions: vec!["CR = 0 when age <= 0", "Negative rates are reported as thickness gain"],
                category: EquationCategory::Corrosion,
            },

            Equation::ShortTermCorrosionRate => EquationMetadata {
                name: "Short-Term Corrosion Rate",
                description: "Metal loss per year since the previous inspection",
                formula_typst: r#"$C R_("st") = (t_("prev") - t_("curr")) / Delta t$"#,
                formula_plain: "CR_st = (t_prev - t_curr) / dt",
                reference: CodeReference::Api653 { edition: 5, section: "4.4.5.1" },
                variables: vec![
                    Variable::new("CR_st", "Short-term corrosion rate", "in/yr"),
                    Variable::new("t_prev", "Thickness at previous inspection", "in"),
                    Variable::new("dt", "Years since previous inspection", "yr"),
                ],
                assumptions: vec!["Informational; remaining life uses the long-term rate"],
                category: EquationCategory::Corrosion,
            },

            Equation::RemainingLife => EquationMetadata {
                name: "Remaining Life",
                description: "Years until the current thickness reaches the minimum required thickness",
                formula_typst: r#"$R L = max(0, (t_("curr") - t_("min")) / (C R))$"#,
                formula_plain: "RL = max(0, (t_curr - t_min) / CR)",
                reference: CodeReference::Api653 { edition: 5, section: "4.4.5.1" },
                variables: vec![
                    Variable::new("RL", "Remaining life", "yr"),
                    Variable::new("t_min", "Minimum required thickness", "in"),
                    Variable::new("CR", "Long-term corrosion rate", "in/yr"),
                ],
                assumptions: vec!["RL = 999 when CR <= 0 (no measurable degradation)"],
                category: EquationCategory::Corrosion,
            },

            Equation::CourseMinimumThickness => EquationMetadata {
                name: "Course Minimum Thickness",
                description: "Shell course evaluated at its thinnest reading",
                formula_typst: r#"$t_("course") = min_i t_("curr",i)$"#,
                formula_plain: "t_course = min(t_curr,i)",
                reference: CodeReference::Api653 { edition: 5, section: "4.3.2" },
                variables: vec![
                    Variable::new("t_course", "Course minimum thickness", "in"),
                    Variable::new("t_curr,i", "Current thickness of course reading i", "in"),
                ],
                assumptions: vec!["Nominal thickness from the first course reading unless a design value is given"],
                category: EquationCategory::ShellEvaluation,
            },

            Equation::CosineSettlementFit => EquationMetadata {
                name: "Cosine Settlement Fit",
                description: "Rigid-body tilt plus uniform settlement fitted to the survey",
                formula_typst: r#"$z(theta) = A cos(theta - phi) + b$"#,
                formula_plain: "z(theta) = A cos(theta - phi) + b",
                reference: CodeReference::Api653 { edition: 5, section: "Annex B.2.2.4" },
                variables: vec![
                    Variable::new("z", "Elevation", "in"),
                    Variable::new("theta", "Station angle", "deg"),
                    Variable::new("A", "Tilt amplitude", "in"),
                    Variable::new("phi", "Tilt phase", "deg"),
                    Variable::new("b", "Uniform settlement", "in"),
                ],
                assumptions: vec![
                    "Least squares on the basis {1, cos theta, sin theta}",
                    "Stations sharing an angle are averaged",
                ],
                category: EquationCategory::Settlement,
            },

            Equation::CoefficientOfDetermination => EquationMetadata {
                name: "Coefficient of Determination",
                description: "Fraction of survey variance explained by the cosine fit",
                formula_typst: r#"$R^2 = 1 - (S S_("res")) / (S S_("tot"))$"#,
                formula_plain: "R^2 = 1 - SS_res / SS_tot",
                reference: CodeReference::Statistics,
                variables: vec![
                    Variable::new("SS_res", "Residual sum of squares", "in^2"),
                    Variable::new("SS_tot", "Total sum of squares", "in^2"),
                ],
                assumptions: vec!["R^2 = 1 when the survey has zero variance"],
                category: EquationCategory::Settlement,
            },

            Equation::OutOfPlaneDeviation => EquationMetadata {
                name: "Out-of-Plane Deviation",
                description: "Departure of each station from the fitted plane",
                formula_typst: r#"$S_i = |z_i - z(theta_i)|$"#,
                formula_plain: "S_i = |z_i - z(theta_i)|",
                reference: CodeReference::Api653 { edition: 5, section: "Annex B.2.2.4" },
                variables: vec![
                    Variable::new("S_i", "Out-of-plane settlement at station i", "in"),
                    Variable::new("z_i", "Measured elevation", "in"),
                ],
                assumptions: vec!["Maximum over every raw station governs acceptance"],
                category: EquationCategory::Settlement,
            },

            Equation::Api653SettlementLimit => EquationMetadata {
                name: "Allowable Out-of-Plane Settlement",
                description: "Permissible out-of-plane settlement from tank geometry",
                formula_typst: r#"$S_("max") = (L^2 Y dot 11) / (2 E H)$"#,
                formula_plain: "S_max = L^2 * Y * 11 / (2 * E * H)",
                reference: CodeReference::Api653 { edition: 5, section: "Annex B.3.2.1" },
                variables: vec![
                    Variable::new("L", "Arc length between stations, pi D / n", "ft"),
                    Variable::new("Y", "Shell yield strength", "psi"),
                    Variable::new("E", "Elastic modulus", "psi"),
                    Variable::new("H", "Tank height", "ft"),
                ],
                assumptions: vec!["Used only when no design limit is supplied", "Result converted to inches"],
                category: EquationCategory::Settlement,
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::LongTermCorrosionRate,
    Equation::ShortTermCorrosionRate,
    Equation::RemainingLife,
    Equation::CourseMinimumThickness,
    Equation::CosineSettlementFit,
    Equation::CoefficientOfDetermination,
    Equation::OutOfPlaneDeviation,
    Equation::Api653SettlementLimit,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used while building a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    pub equation: Equation,
    /// Where it was used (e.g., "Shell Course Analysis")
    pub context: String,
    /// Optional: the reading or course it was applied to
    pub subject: Option<String>,
}

impl EquationUsage {
    pub fn new(equation: Equation, context: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            subject: None,
        }
    }

    pub fn for_subject(equation: Equation, context: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            subject: Some(subject.into()),
        }
    }
}

/// Collector for equation usage during one report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used
    pub fn record(&mut self, equation: Equation, context: impl Into<String>) {
        self.usages.push(EquationUsage::new(equation, context));
    }

    /// Record equation usage for a specific reading or course
    pub fn record_for_subject(&mut self, equation: Equation, context: impl Into<String>, subject: impl Into<String>) {
        self.usages.push(EquationUsage::for_subject(equation, context, subject));
    }

    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Unique equations in first-use order
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Distinct usage contexts for one equation, in first-use order
    pub fn contexts_for(&self, equation: Equation) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| u.equation == equation)
            .map(|u| u.context.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Unique equations grouped by category, categories in appendix order
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let mut by_cat: HashMap<EquationCategory, Vec<Equation>> = HashMap::new();
        for eq in self.unique_equations() {
            by_cat.entry(eq.metadata().category).or_default().push(eq);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: EquationTracker) {
        self.usages.extend(other.usages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equations_have_metadata() {
        assert_eq!(ALL_EQUATIONS.len(), 8);

        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.name.is_empty(), "Equation {:?} has no name", eq);
            assert!(!meta.formula_typst.is_empty(), "Equation {:?} has no formula", eq);
            assert!(!meta.variables.is_empty(), "Equation {:?} has no variables", eq);
        }

        let rl = Equation::RemainingLife.metadata();
        assert!(rl.formula_plain.contains("(t_curr - t_min) / CR"));
    }

    #[test]
    fn test_code_reference_citation() {
        let api = CodeReference::Api653 { edition: 5, section: "4.4.5.1" };
        assert_eq!(api.citation(), "API 653 5th Ed., 4.4.5.1");
    }

    #[test]
    fn test_equation_tracker() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::LongTermCorrosionRate, "Thickness Measurements");
        tracker.record(Equation::RemainingLife, "Thickness Measurements");
        tracker.record(Equation::LongTermCorrosionRate, "Shell Course Analysis");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(tracker.unique_equations().len(), 2);
        assert_eq!(
            tracker.contexts_for(Equation::LongTermCorrosionRate),
            vec!["Thickness Measurements", "Shell Course Analysis"]
        );
    }

    #[test]
    fn test_by_category_sorted() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::CosineSettlementFit, "Settlement Survey");
        tracker.record(Equation::LongTermCorrosionRate, "Thickness Measurements");
        tracker.record(Equation::CourseMinimumThickness, "Shell Course Analysis");

        let categories: Vec<EquationCategory> = tracker.by_category().into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            categories,
            vec![
                EquationCategory::Corrosion,
                EquationCategory::ShellEvaluation,
                EquationCategory::Settlement
            ]
        );
    }

    #[test]
    fn test_in_category() {
        let settlement = Equation::in_category(EquationCategory::Settlement);
        assert_eq!(settlement.len(), 4);
        assert!(settlement.contains(&Equation::Api653SettlementLimit));
    }

    #[test]
    fn test_merge() {
        let mut a = EquationTracker::new();
        a.record(Equation::RemainingLife, "A");
        let mut b = EquationTracker::new();
        b.record(Equation::OutOfPlaneDeviation, "B");
        a.merge(b);
        assert_eq!(a.unique_equations(), vec![Equation::RemainingLife, Equation::OutOfPlaneDeviation]);
    }
}
