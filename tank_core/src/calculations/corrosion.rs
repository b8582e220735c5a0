//! # Thickness Measurement Analysis
//!
//! Per-measurement corrosion rate, remaining life and status classification.
//!
//! ## Formulas
//!
//! - Corrosion rate: `CR = (t_orig - t_curr) / age` (in/yr), `0` when `age <= 0`
//! - Remaining life: `RL = max(0, (t_curr - t_min) / CR)` (yr), sentinel `999` when `CR <= 0`
//! - Status: `RL <= 5` action required, `5 < RL <= 10` monitor, otherwise acceptable
//!
//! A negative corrosion rate (thickness gain) is kept as-is: it yields the
//! remaining-life sentinel and a [`CorrosionTrend::Gain`] classification,
//! which is flagged as a data-quality warning.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::corrosion::{corrosion_rate, remaining_life, classify_status, InspectionStatus};
//! use tank_core::config::StatusThresholds;
//!
//! let rate = corrosion_rate(0.500, 0.450, 10.0);
//! let life = remaining_life(0.450, rate, 0.1);
//! assert!((rate - 0.005).abs() < 1e-12);
//! assert!((life - 70.0).abs() < 1e-9);
//! assert_eq!(classify_status(life, &StatusThresholds::default()), InspectionStatus::Acceptable);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisPolicy, StatusThresholds, MAX_THICKNESS_IN, REMAINING_LIFE_SENTINEL};
use crate::errors::{CalcError, CalcResult, DataQualityWarning, WarningCode};
use crate::units::{Inches, InchesPerYear, Years};

/// Component a thickness reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Shell,
    Bottom,
    Annular,
    Roof,
    Nozzle,
    Other,
}

impl ComponentKind {
    /// Display name for report tables
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Shell => "Shell",
            ComponentKind::Bottom => "Bottom",
            ComponentKind::Annular => "Annular",
            ComponentKind::Roof => "Roof",
            ComponentKind::Nozzle => "Nozzle",
            ComponentKind::Other => "Other",
        }
    }
}

/// Remaining-life status, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Acceptable,
    Monitor,
    ActionRequired,
}

impl InspectionStatus {
    /// Label used in report tables
    pub fn label(&self) -> &'static str {
        match self {
            InspectionStatus::Acceptable => "ACCEPTABLE",
            InspectionStatus::Monitor => "MONITOR",
            InspectionStatus::ActionRequired => "ACTION REQUIRED",
        }
    }

    /// Worst status in a sequence, `None` when empty
    pub fn worst(statuses: impl IntoIterator<Item = InspectionStatus>) -> Option<InspectionStatus> {
        statuses.into_iter().max()
    }
}

/// Direction of thickness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrosionTrend {
    /// Metal loss (rate > 0)
    Loss,
    /// No measurable change, or no time base
    Stable,
    /// Current exceeds original (rate < 0), usually a measurement problem
    Gain,
}

/// A validated thickness reading.
///
/// Thickness fields are `None` when the upstream value was missing, blank or
/// zero; those readings proceed with the sentinel policy and carry a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub cml_id: Option<String>,
    pub component: String,
    pub location: String,
    pub kind: ComponentKind,
    pub original_thickness: Option<Inches>,
    pub current_thickness: Option<Inches>,
    pub previous_thickness: Option<Inches>,
    /// Corrosion time base taken from the report context
    pub age_years: Option<Years>,
    /// Interval since the previous reading (short-term rate)
    pub years_since_previous: Option<Years>,
}

impl Measurement {
    /// Create a complete reading.
    pub fn new(
        component: impl Into<String>,
        location: impl Into<String>,
        kind: ComponentKind,
        original_in: f64,
        current_in: f64,
        age_years: f64,
    ) -> Self {
        Measurement {
            cml_id: None,
            component: component.into(),
            location: location.into(),
            kind,
            original_thickness: Some(Inches(original_in)),
            current_thickness: Some(Inches(current_in)),
            previous_thickness: None,
            age_years: Some(Years(age_years)),
            years_since_previous: None,
        }
    }

    /// Human-readable label: CML id when present, else component and location
    pub fn label(&self) -> String {
        let place = if self.location.is_empty() {
            self.component.clone()
        } else {
            format!("{} {}", self.component, self.location)
        };
        match &self.cml_id {
            Some(cml) => format!("{} ({})", cml, place),
            None => place,
        }
    }

    /// Validate thickness and age invariants.
    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [
            ("original_thickness", self.original_thickness),
            ("current_thickness", self.current_thickness),
            ("previous_thickness", self.previous_thickness),
        ] {
            if let Some(t) = value {
                validate_thickness(field, t.0)?;
            }
        }
        if let Some(age) = self.age_years {
            validate_age("age_years", age.0)?;
        }
        if let Some(interval) = self.years_since_previous {
            validate_age("years_since_previous", interval.0)?;
        }
        Ok(())
    }
}

/// Analysis results for one reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub measurement: Measurement,
    /// Long-term corrosion rate (in/yr)
    pub corrosion_rate: f64,
    /// Short-term rate against the previous reading (in/yr), informational
    pub short_term_rate: Option<f64>,
    /// Remaining life (yr), sentinel 999 when no degradation is measurable
    pub remaining_life: f64,
    pub status: InspectionStatus,
    pub trend: CorrosionTrend,
    /// False when a sentinel replaced a missing input
    pub complete: bool,
    pub warnings: Vec<DataQualityWarning>,
}

// ============================================================================
// Pure formulas
// ============================================================================

/// Corrosion rate in in/yr: `(original - current) / age`, or `0` when `age <= 0`.
///
/// Negative results (thickness gain) are returned unclamped.
pub fn corrosion_rate(original_in: f64, current_in: f64, age_years: f64) -> f64 {
    if age_years > 0.0 {
        let rate: InchesPerYear = (Inches(original_in) - Inches(current_in)) / Years(age_years);
        finite_or(rate.value(), 0.0)
    } else {
        0.0
    }
}

/// Remaining life in years.
///
/// Returns [`REMAINING_LIFE_SENTINEL`] when `rate <= 0`, otherwise
/// `max(0, (current - min_thickness) / rate)`.
pub fn remaining_life(current_in: f64, rate_in_per_yr: f64, min_thickness_in: f64) -> f64 {
    if rate_in_per_yr.is_nan() || rate_in_per_yr <= 0.0 {
        return REMAINING_LIFE_SENTINEL;
    }
    let life = ((current_in - min_thickness_in) / rate_in_per_yr).max(0.0);
    finite_or(life, REMAINING_LIFE_SENTINEL)
}

/// Classify remaining life against the thresholds.
///
/// Both boundaries are inclusive on the critical side: exactly 5 years is
/// action required, exactly 10 years is monitor.
pub fn classify_status(remaining_life_years: f64, thresholds: &StatusThresholds) -> InspectionStatus {
    if remaining_life_years <= thresholds.action_below_years {
        InspectionStatus::ActionRequired
    } else if remaining_life_years <= thresholds.monitor_below_years {
        InspectionStatus::Monitor
    } else {
        InspectionStatus::Acceptable
    }
}

/// Trend implied by a corrosion rate
pub fn trend_for_rate(rate_in_per_yr: f64) -> CorrosionTrend {
    if rate_in_per_yr > 0.0 {
        CorrosionTrend::Loss
    } else if rate_in_per_yr < 0.0 {
        CorrosionTrend::Gain
    } else {
        CorrosionTrend::Stable
    }
}

/// Reject thickness values outside `(0, 2.0]` in.
pub fn validate_thickness(field: &str, thickness_in: f64) -> CalcResult<()> {
    if thickness_in.is_nan() || thickness_in <= 0.0 || thickness_in > MAX_THICKNESS_IN {
        return Err(CalcError::invalid_input(
            field,
            thickness_in.to_string(),
            format!("Thickness must be within (0, {:.1}] in", MAX_THICKNESS_IN),
        ));
    }
    Ok(())
}

/// Reject negative (or non-finite) ages.
pub fn validate_age(field: &str, age_years: f64) -> CalcResult<()> {
    if !age_years.is_finite() || age_years < 0.0 {
        return Err(CalcError::invalid_input(field, age_years.to_string(), "Age cannot be negative"));
    }
    Ok(())
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

// ============================================================================
// Measurement analysis
// ============================================================================

/// Analyze one validated reading.
///
/// # Returns
///
/// * `Ok(MeasurementResult)` - derived values, with warnings for any sentinel used
/// * `Err(CalcError::InvalidInput)` - a thickness outside `(0, 2.0]` or a negative age
pub fn analyze_measurement(measurement: &Measurement, policy: &AnalysisPolicy) -> CalcResult<MeasurementResult> {
    measurement.validate()?;

    let label = measurement.label();
    let mut warnings = Vec::new();

    let original = measurement.original_thickness.map(|t| t.0);
    let current = measurement.current_thickness.map(|t| t.0);

    if original.is_none() {
        warnings.push(DataQualityWarning::new(
            WarningCode::MissingThickness,
            &label,
            "Original thickness missing; corrosion rate set to 0",
        ));
    }
    if current.is_none() {
        warnings.push(DataQualityWarning::new(
            WarningCode::MissingThickness,
            &label,
            "Current thickness missing; remaining life set to 999",
        ));
    }

    let rate = match (original, current, measurement.age_years) {
        (Some(t_orig), Some(t_curr), Some(age)) => corrosion_rate(t_orig, t_curr, age.0),
        _ => 0.0,
    };

    let life = match current {
        Some(t_curr) => remaining_life(t_curr, rate, policy.min_thickness_in),
        None => REMAINING_LIFE_SENTINEL,
    };

    let trend = trend_for_rate(rate);
    if trend == CorrosionTrend::Gain {
        warnings.push(DataQualityWarning::new(
            WarningCode::ThicknessGain,
            &label,
            format!("Current thickness exceeds original (rate {:.4} in/yr); verify reading", rate),
        ));
    }

    let short_term_rate = match (measurement.previous_thickness, current, measurement.years_since_previous) {
        (Some(prev), Some(t_curr), Some(interval)) if interval.0 > 0.0 => {
            Some(corrosion_rate(prev.0, t_curr, interval.0))
        }
        _ => None,
    };

    let complete = original.is_some() && current.is_some() && measurement.age_years.is_some();

    Ok(MeasurementResult {
        measurement: measurement.clone(),
        corrosion_rate: rate,
        short_term_rate,
        remaining_life: life,
        status: classify_status(life, &policy.thresholds),
        trend,
        complete,
        warnings,
    })
}

/// Analyze every reading in input order.
pub fn analyze_measurements(measurements: &[Measurement], policy: &AnalysisPolicy) -> CalcResult<Vec<MeasurementResult>> {
    measurements.iter().map(|m| analyze_measurement(m, policy)).collect()
}
