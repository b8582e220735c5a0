//! # Inspection Request Data Structures
//!
//! The `InspectionRequest` is the root container handed over by the data-entry
//! layer. It arrives as JSON with loosely typed fields (numbers may be JSON
//! numbers or free text such as `"0.375 in"`); the [`crate::input`] module is
//! the single boundary that turns it into typed records.
//!
//! ## Structure
//!
//! ```text
//! InspectionRequest
//! ├── schema_version: String
//! ├── tank: RawTankInfo (identity, dates, geometry, time base)
//! ├── measurements: Vec<RawMeasurement> (thickness readings, input order)
//! ├── settlement: Option<RawSettlementSurvey> (radial elevation survey)
//! └── course_design: Vec<CourseDesign> (optional height/nominal per course)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tank_core::inspection::{InspectionRequest, RawMeasurement};
//!
//! let mut request = InspectionRequest::new("T-101");
//! request.measurements.push(
//!     RawMeasurement::new("Shell", "Course 1 @ 0°", "shell")
//!         .with_original("0.500")
//!         .with_current("0.450"),
//! );
//!
//! let json = serde_json::to_string_pretty(&request).unwrap();
//! assert!(json.contains("Course 1"));
//! ```

use serde::{Deserialize, Serialize};

/// Current schema version for inspection request files
pub const SCHEMA_VERSION: &str = "0.1.0";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// A field as entered upstream: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        RawField::Text(value)
    }
}

impl std::fmt::Display for RawField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawField::Number(n) => write!(f, "{}", n),
            RawField::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Root request container for one report-generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionRequest {
    /// Schema version (for migration compatibility)
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Tank identity and report context
    pub tank: RawTankInfo,

    /// Thickness readings in the order they were entered
    #[serde(default)]
    pub measurements: Vec<RawMeasurement>,

    /// Optional radial settlement survey
    #[serde(default)]
    pub settlement: Option<RawSettlementSurvey>,

    /// Optional per-course design data
    #[serde(default)]
    pub course_design: Vec<CourseDesign>,
}

impl InspectionRequest {
    /// Create an empty request for a tank.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tank_core::inspection::InspectionRequest;
    ///
    /// let request = InspectionRequest::new("T-101");
    /// assert_eq!(request.tank.tank_id.as_deref(), Some("T-101"));
    /// assert!(request.measurements.is_empty());
    /// ```
    pub fn new(tank_id: impl Into<String>) -> Self {
        InspectionRequest {
            schema_version: SCHEMA_VERSION.to_string(),
            tank: RawTankInfo {
                tank_id: Some(tank_id.into()),
                ..RawTankInfo::default()
            },
            measurements: Vec::new(),
            settlement: None,
            course_design: Vec::new(),
        }
    }
}

/// Tank identity, geometry and report context as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTankInfo {
    pub tank_id: Option<String>,
    /// Alternate identifiers used when `tank_id` looks like a file name
    pub tank_number: Option<String>,
    pub unit_id: Option<String>,

    pub report_number: Option<String>,
    pub service: Option<String>,
    pub inspector: Option<String>,
    /// `YYYY-MM-DD` (or `MM/DD/YYYY`)
    pub inspection_date: Option<String>,

    pub diameter_ft: Option<RawField>,
    pub height_ft: Option<RawField>,
    /// Capacity; a `bbl`/`barrels` unit (suffix or `capacity_unit`) is converted to gallons
    pub capacity: Option<RawField>,
    pub capacity_unit: Option<String>,
    pub year_built: Option<RawField>,
    pub corrosion_allowance_in: Option<RawField>,

    /// Corrosion time base (years of service)
    pub age_years: Option<RawField>,
    /// Interval used for the short-term corrosion rate
    pub years_since_last_inspection: Option<RawField>,
}

/// One thickness reading as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMeasurement {
    /// Condition monitoring location identifier
    pub cml_id: Option<String>,
    pub component: Option<String>,
    pub location: Option<String>,
    /// Free-text kind: shell, bottom, roof, nozzle, annular, ...
    pub kind: Option<String>,
    pub original_thickness: Option<RawField>,
    pub current_thickness: Option<RawField>,
    pub previous_thickness: Option<RawField>,
}

impl RawMeasurement {
    /// Create a reading with component, location and kind text.
    pub fn new(component: impl Into<String>, location: impl Into<String>, kind: impl Into<String>) -> Self {
        RawMeasurement {
            component: Some(component.into()),
            location: Some(location.into()),
            kind: Some(kind.into()),
            ..RawMeasurement::default()
        }
    }

    /// Set the original (nominal) thickness
    pub fn with_original(mut self, value: impl Into<RawField>) -> Self {
        self.original_thickness = Some(value.into());
        self
    }

    /// Set the current (measured) thickness
    pub fn with_current(mut self, value: impl Into<RawField>) -> Self {
        self.current_thickness = Some(value.into());
        self
    }

    /// Set the thickness recorded at the previous inspection
    pub fn with_previous(mut self, value: impl Into<RawField>) -> Self {
        self.previous_thickness = Some(value.into());
        self
    }

    /// Set the CML identifier
    pub fn with_cml(mut self, cml_id: impl Into<String>) -> Self {
        self.cml_id = Some(cml_id.into());
        self
    }
}

/// Radial elevation survey as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettlementSurvey {
    pub points: Vec<RawSettlementPoint>,
    /// Design limit for out-of-plane settlement (in)
    pub allowable_settlement_in: Option<RawField>,
}

/// One survey station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSettlementPoint {
    /// Angle around the circumference (degrees)
    pub angle: RawField,
    /// Measured elevation (in)
    pub elevation: RawField,
}

impl RawSettlementPoint {
    pub fn new(angle: impl Into<RawField>, elevation: impl Into<RawField>) -> Self {
        RawSettlementPoint {
            angle: angle.into(),
            elevation: elevation.into(),
        }
    }
}

/// Design data for one shell course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDesign {
    pub course_number: u8,
    #[serde(default)]
    pub height_ft: Option<f64>,
    #[serde(default)]
    pub nominal_thickness_in: Option<f64>,
}
