//! # Engine Configuration
//!
//! The canonical analysis policy and the page layout used for one report.
//! Every threshold the analyzers consult lives here so the same policy is
//! applied uniformly across measurements, courses, and report sections.
//!
//! ## Structure
//!
//! ```text
//! EngineConfig
//! ├── policy: AnalysisPolicy (minimum thickness, status thresholds, settlement limits)
//! └── layout: PageLayout (page geometry, row heights, footer template)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tank_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.policy.min_thickness_in, 0.1);
//! assert!(config.validate().is_ok());
//!
//! let json = serde_json::to_string_pretty(&config).unwrap();
//! let parsed = EngineConfig::from_json_str(&json).unwrap();
//! assert_eq!(parsed.policy.thresholds.action_below_years, 5.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::report::layout::PageLayout;
use crate::units::Psi;

/// Remaining life reported when there is no measurable degradation (years).
///
/// Not literally infinite: any rate ≤ 0 resolves to this value.
pub const REMAINING_LIFE_SENTINEL: f64 = 999.0;

/// Largest thickness accepted at the input boundary (in)
pub const MAX_THICKNESS_IN: f64 = 2.0;

/// Canonical minimum required thickness (in)
pub const DEFAULT_MIN_THICKNESS_IN: f64 = 0.1;

/// Maximum number of shell courses recognized
pub const MAX_SHELL_COURSES: u8 = 12;

/// Fewest distinct survey angles accepted for a cosine fit
pub const MIN_SETTLEMENT_POINTS: usize = 4;

/// Complete configuration for one report-generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Numeric analysis policy
    pub policy: AnalysisPolicy,
    /// Page geometry for the assembler
    pub layout: PageLayout,
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid engine configuration: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both halves of the configuration.
    pub fn validate(&self) -> CalcResult<()> {
        self.policy.validate()?;
        self.layout.validate()
    }
}

/// Canonical numeric policy for corrosion and settlement analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPolicy {
    /// Minimum required thickness used for remaining life (in)
    pub min_thickness_in: f64,

    /// Remaining-life thresholds for status classification
    pub thresholds: StatusThresholds,

    /// Highest shell course number recognized
    pub max_courses: u8,

    /// Settlement analysis policy
    pub settlement: SettlementPolicy,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        AnalysisPolicy {
            min_thickness_in: DEFAULT_MIN_THICKNESS_IN,
            thresholds: StatusThresholds::default(),
            max_courses: MAX_SHELL_COURSES,
            settlement: SettlementPolicy::default(),
        }
    }
}

impl AnalysisPolicy {
    /// Validate policy values.
    pub fn validate(&self) -> CalcResult<()> {
        if self.min_thickness_in.is_nan() || self.min_thickness_in <= 0.0 || self.min_thickness_in > MAX_THICKNESS_IN {
            return Err(CalcError::invalid_input(
                "policy.min_thickness_in",
                self.min_thickness_in.to_string(),
                "Minimum thickness must be within (0, 2.0] in",
            ));
        }
        self.thresholds.validate()?;
        if self.max_courses == 0 || self.max_courses > MAX_SHELL_COURSES {
            return Err(CalcError::invalid_input(
                "policy.max_courses",
                self.max_courses.to_string(),
                format!("Course cap must be between 1 and {}", MAX_SHELL_COURSES),
            ));
        }
        self.settlement.validate()
    }
}

/// Remaining-life thresholds (years).
///
/// `remaining_life <= action_below_years` is action required,
/// `action_below_years < remaining_life <= monitor_below_years` is monitor,
/// anything longer is acceptable. Both bounds are inclusive on the
/// critical side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusThresholds {
    pub action_below_years: f64,
    pub monitor_below_years: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        StatusThresholds {
            action_below_years: 5.0,
            monitor_below_years: 10.0,
        }
    }
}

impl StatusThresholds {
    pub fn validate(&self) -> CalcResult<()> {
        if !self.action_below_years.is_finite() || self.action_below_years < 0.0 {
            return Err(CalcError::invalid_input(
                "policy.thresholds.action_below_years",
                self.action_below_years.to_string(),
                "Threshold must be a non-negative number",
            ));
        }
        if !self.monitor_below_years.is_finite() || self.monitor_below_years <= self.action_below_years {
            return Err(CalcError::invalid_input(
                "policy.thresholds.monitor_below_years",
                self.monitor_below_years.to_string(),
                "Monitor threshold must exceed the action threshold",
            ));
        }
        Ok(())
    }
}

/// Settlement analysis policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    /// Fewest distinct survey angles accepted for a fit
    pub min_points: usize,

    /// Where the allowable limit comes from when no design limit is supplied
    pub limit: SettlementLimitPolicy,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        SettlementPolicy {
            min_points: MIN_SETTLEMENT_POINTS,
            limit: SettlementLimitPolicy::default(),
        }
    }
}

impl SettlementPolicy {
    pub fn validate(&self) -> CalcResult<()> {
        if self.min_points < MIN_SETTLEMENT_POINTS {
            return Err(CalcError::invalid_input(
                "policy.settlement.min_points",
                self.min_points.to_string(),
                format!("A cosine fit needs at least {} points", MIN_SETTLEMENT_POINTS),
            ));
        }
        if let SettlementLimitPolicy::Api653AnnexB { yield_strength, elastic_modulus } = self.limit {
            if yield_strength.0 <= 0.0 || elastic_modulus.0 <= 0.0 {
                return Err(CalcError::invalid_input(
                    "policy.settlement.limit",
                    format!("Y={} E={}", yield_strength.0, elastic_modulus.0),
                    "Yield strength and modulus must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Fallback source for the allowable settlement when no design limit is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SettlementLimitPolicy {
    /// Only a supplied design limit is used; otherwise the result is pending
    DesignOnly,
    /// Out-of-plane limit per API 653 Annex B when tank geometry is known
    Api653AnnexB {
        yield_strength: Psi,
        elastic_modulus: Psi,
    },
}

impl Default for SettlementLimitPolicy {
    fn default() -> Self {
        SettlementLimitPolicy::Api653AnnexB {
            yield_strength: Psi(30_000.0),
            elastic_modulus: Psi(29_000_000.0),
        }
    }
}
