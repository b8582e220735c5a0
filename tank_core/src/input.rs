//! # Input Validation Boundary
//!
//! The one place where an [`InspectionRequest`] with loosely typed fields is
//! turned into typed records. Analyzers never see raw text.
//!
//! ## Rules
//!
//! - Numbers may be JSON numbers or text with surrounding whitespace and an
//!   optional unit suffix (`in`, `"`, `ft`, `'`, `bbl`, `gal`, `deg`, `°`).
//! - Blank or zero thickness is treated as missing; the analyzer attaches a
//!   data-quality warning and applies the sentinel policy.
//! - Non-numeric text, out-of-range thickness and negative ages are fatal
//!   [`CalcError::InvalidInput`] errors.
//! - Metadata gaps (tank id, report number, inspection date) are filled with
//!   documented fallbacks and reported as warnings.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::calculations::corrosion::{validate_age, validate_thickness, ComponentKind, Measurement};
use crate::calculations::settlement::{SettlementPoint, SettlementSurvey};
use crate::config::AnalysisPolicy;
use crate::errors::{CalcError, CalcResult, DataQualityWarning, WarningCode};
use crate::file_io::validate_version;
use crate::inspection::{CourseDesign, InspectionRequest, RawField, RawMeasurement, RawTankInfo};
use crate::units::{Feet, Inches, Years};

static NUMBER_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:e[+-]?\d+)?)\s*(in|inch|inches|"|ft|feet|'|bbls?|barrels?|gal|gallons?|deg|°)?\s*$"#,
    )
    .unwrap()
});

static NOZZLE_LOCATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:n\d{1,3}[a-z]?|nozzle)\b").unwrap());

/// File extensions that show a spreadsheet name leaked into the tank id
const FILE_NAME_SUFFIXES: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// Gallons per US oil barrel
pub const GALLONS_PER_BARREL: f64 = 42.0;

/// Tank identity and context after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tank_id: String,
    pub report_number: String,
    pub service: Option<String>,
    pub inspector: Option<String>,
    pub inspection_date: NaiveDate,
    pub diameter: Option<Feet>,
    pub height: Option<Feet>,
    /// Capacity in US gallons
    pub capacity_gal: Option<f64>,
    pub year_built: Option<i32>,
    pub corrosion_allowance: Option<Inches>,
    /// Corrosion time base applied to every reading
    pub time_base: Option<Years>,
    /// Interval for the short-term rate
    pub years_since_last_inspection: Option<Years>,
}

/// Typed records ready for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedInspection {
    pub metadata: ReportMetadata,
    pub measurements: Vec<Measurement>,
    pub settlement: Option<SettlementSurvey>,
    pub course_design: Vec<CourseDesign>,
    pub warnings: Vec<DataQualityWarning>,
}

// ============================================================================
// Number parsing
// ============================================================================

/// Unit suffix recognized on a numeric text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSuffix {
    None,
    Inches,
    Feet,
    Barrels,
    Gallons,
    Degrees,
}

impl UnitSuffix {
    fn from_text(text: &str) -> Self {
        match text.to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" | "\"" => UnitSuffix::Inches,
            "ft" | "feet" | "'" => UnitSuffix::Feet,
            "bbl" | "bbls" | "barrel" | "barrels" => UnitSuffix::Barrels,
            "gal" | "gallon" | "gallons" => UnitSuffix::Gallons,
            "deg" | "°" => UnitSuffix::Degrees,
            _ => UnitSuffix::None,
        }
    }
}

/// Parse a raw field into a number and unit.
///
/// Absent or blank → `Ok(None)`; unparseable or non-finite → `InvalidInput`.
pub fn parse_number(field: &str, raw: Option<&RawField>) -> CalcResult<Option<(f64, UnitSuffix)>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let (value, unit) = match raw {
        RawField::Number(n) => (*n, UnitSuffix::None),
        RawField::Text(text) => {
            if text.trim().is_empty() {
                return Ok(None);
            }
            let caps = NUMBER_WITH_UNIT
                .captures(text)
                .ok_or_else(|| CalcError::invalid_input(field, text.as_str(), "Not a number"))?;
            let value = caps[1]
                .parse::<f64>()
                .map_err(|e| CalcError::invalid_input(field, text.as_str(), e.to_string()))?;
            let unit = caps.get(2).map_or(UnitSuffix::None, |m| UnitSuffix::from_text(m.as_str()));
            (value, unit)
        }
    };
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, raw.to_string(), "Value must be finite"));
    }
    Ok(Some((value, unit)))
}

/// Parse a length in inches; a `ft` suffix is converted.
fn parse_inches(field: &str, raw: Option<&RawField>) -> CalcResult<Option<Inches>> {
    Ok(parse_number(field, raw)?.map(|(value, unit)| match unit {
        UnitSuffix::Feet => Feet(value).into(),
        _ => Inches(value),
    }))
}

/// Parse a length in feet; an `in` suffix is converted.
fn parse_feet(field: &str, raw: Option<&RawField>) -> CalcResult<Option<Feet>> {
    Ok(parse_number(field, raw)?.map(|(value, unit)| match unit {
        UnitSuffix::Inches => Inches(value).into(),
        _ => Feet(value),
    }))
}

/// Thickness in inches. Blank or zero is missing; anything else must lie in `(0, 2.0]`.
pub fn parse_thickness(field: &str, raw: Option<&RawField>) -> CalcResult<Option<Inches>> {
    match parse_inches(field, raw)? {
        None => Ok(None),
        Some(t) if t.0 == 0.0 => Ok(None),
        Some(t) => {
            validate_thickness(field, t.0)?;
            Ok(Some(t))
        }
    }
}

/// Positive tank dimension; blank or zero is unknown.
fn parse_dimension(field: &str, raw: Option<&RawField>) -> CalcResult<Option<Feet>> {
    match parse_feet(field, raw)? {
        Some(d) if d.0 < 0.0 => Err(CalcError::invalid_input(field, d.0.to_string(), "Dimension cannot be negative")),
        Some(d) if d.0 == 0.0 => Ok(None),
        other => Ok(other),
    }
}

/// Non-negative duration in years.
fn parse_years(field: &str, raw: Option<&RawField>) -> CalcResult<Option<Years>> {
    match parse_number(field, raw)? {
        Some((value, _)) => {
            validate_age(field, value)?;
            Ok(Some(Years(value)))
        }
        None => Ok(None),
    }
}

// ============================================================================
// Text normalization
// ============================================================================

/// Parse a component kind from free text.
///
/// The explicit kind wins; otherwise nozzle locations (`N1`, `Nozzle A`) are
/// recognized, then keywords in the component name. Anything else is `Other`.
pub fn parse_component_kind(kind: Option<&str>, component: &str, location: &str) -> ComponentKind {
    if let Some(kind) = kind.and_then(kind_from_keywords) {
        return kind;
    }
    if NOZZLE_LOCATION.is_match(location) || NOZZLE_LOCATION.is_match(component) {
        return ComponentKind::Nozzle;
    }
    kind_from_keywords(component).unwrap_or(ComponentKind::Other)
}

fn kind_from_keywords(text: &str) -> Option<ComponentKind> {
    let lower = text.to_lowercase();
    if lower.contains("annular") {
        Some(ComponentKind::Annular)
    } else if lower.contains("shell") {
        Some(ComponentKind::Shell)
    } else if lower.contains("bottom") || lower.contains("floor") {
        Some(ComponentKind::Bottom)
    } else if lower.contains("roof") {
        Some(ComponentKind::Roof)
    } else if lower.contains("nozzle") {
        Some(ComponentKind::Nozzle)
    } else {
        None
    }
}

/// Normalize common service names; unknown services pass through trimmed.
pub fn normalize_service(service: &str) -> String {
    let trimmed = service.trim();
    let key = trimmed.to_lowercase().replace('_', " ");
    let mapped = match key.as_str() {
        "crude oil" | "crude" => "Crude Oil",
        "diesel" => "Diesel",
        "gasoline" => "Gasoline",
        "alcohol" => "Alcohol",
        "fish oil and sludge oil" => "Fish Oil and Sludge Oil",
        "water" => "Water",
        "other" => "Other",
        _ => return trimmed.to_string(),
    };
    mapped.to_string()
}

/// Parse `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn parse_inspection_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .ok()
}

fn looks_like_file_name(id: &str) -> bool {
    let lower = id.to_lowercase();
    FILE_NAME_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

fn non_blank(text: Option<&String>) -> Option<String> {
    text.map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

// ============================================================================
// Validation
// ============================================================================

fn resolve_tank_id(tank: &RawTankInfo, warnings: &mut Vec<DataQualityWarning>) -> String {
    let raw = non_blank(tank.tank_id.as_ref());
    if let Some(id) = raw.as_ref().filter(|id| !looks_like_file_name(id)) {
        return id.clone();
    }
    let fallback = non_blank(tank.tank_number.as_ref())
        .or_else(|| non_blank(tank.unit_id.as_ref()))
        .unwrap_or_else(|| "UNKNOWN".to_string());
    let reason = match raw {
        Some(id) => format!("Tank id '{}' looks like a file name; using '{}'", id, fallback),
        None => format!("Tank id missing; using '{}'", fallback),
    };
    warnings.push(DataQualityWarning::new(WarningCode::MetadataFallback, "tank_id", reason));
    fallback
}

fn validate_metadata(tank: &RawTankInfo, warnings: &mut Vec<DataQualityWarning>) -> CalcResult<ReportMetadata> {
    let tank_id = resolve_tank_id(tank, warnings);

    let report_number = match non_blank(tank.report_number.as_ref()) {
        Some(number) => number,
        None => {
            let generated = format!("IMP-{}", Utc::now().timestamp_millis());
            warnings.push(DataQualityWarning::new(
                WarningCode::MetadataFallback,
                "report_number",
                format!("Report number missing; generated '{}'", generated),
            ));
            generated
        }
    };

    let inspection_date = match tank.inspection_date.as_deref().map(|d| (d, parse_inspection_date(d))) {
        Some((_, Some(date))) => date,
        Some((text, None)) => {
            warnings.push(DataQualityWarning::new(
                WarningCode::MetadataFallback,
                "inspection_date",
                format!("Unparseable inspection date '{}'; using today", text),
            ));
            Utc::now().date_naive()
        }
        None => {
            warnings.push(DataQualityWarning::new(
                WarningCode::MetadataFallback,
                "inspection_date",
                "Inspection date missing; using today",
            ));
            Utc::now().date_naive()
        }
    };

    let diameter = parse_dimension("tank.diameter_ft", tank.diameter_ft.as_ref())?;
    let height = parse_dimension("tank.height_ft", tank.height_ft.as_ref())?;

    let barrels_declared = tank
        .capacity_unit
        .as_deref()
        .map(|u| UnitSuffix::from_text(u.trim()) == UnitSuffix::Barrels)
        .unwrap_or(false);
    let capacity_gal = match parse_number("tank.capacity", tank.capacity.as_ref())? {
        Some((value, _)) if value < 0.0 => {
            return Err(CalcError::invalid_input("tank.capacity", value.to_string(), "Capacity cannot be negative"))
        }
        Some((value, _)) if value == 0.0 => None,
        Some((value, UnitSuffix::Barrels)) => Some(value * GALLONS_PER_BARREL),
        Some((value, _)) if barrels_declared => Some(value * GALLONS_PER_BARREL),
        Some((value, _)) => Some(value),
        None => None,
    };

    let year_built = match parse_number("tank.year_built", tank.year_built.as_ref())? {
        Some((value, _)) if value == 0.0 => None,
        Some((value, _)) => {
            if value.fract() != 0.0 || value < 1800.0 {
                return Err(CalcError::invalid_input(
                    "tank.year_built",
                    value.to_string(),
                    "Year built must be a four-digit year",
                ));
            }
            Some(value as i32)
        }
        None => None,
    };

    let corrosion_allowance = match parse_inches("tank.corrosion_allowance_in", tank.corrosion_allowance_in.as_ref())? {
        Some(ca) if ca.0 < 0.0 => {
            return Err(CalcError::invalid_input(
                "tank.corrosion_allowance_in",
                ca.0.to_string(),
                "Corrosion allowance cannot be negative",
            ))
        }
        other => other,
    };

    let time_base = match parse_years("tank.age_years", tank.age_years.as_ref())? {
        Some(age) => Some(age),
        None => match year_built {
            Some(year) => {
                let age = f64::from(inspection_date.year() - year);
                validate_age("tank.year_built", age)?;
                Some(Years(age))
            }
            None => None,
        },
    };
    let time_base = match time_base {
        Some(age) if age.0 > 0.0 => Some(age),
        _ => {
            warnings.push(DataQualityWarning::new(
                WarningCode::MissingAge,
                "corrosion_time_base",
                "No corrosion time base (age or year built); corrosion rates set to 0",
            ));
            None
        }
    };

    let years_since_last_inspection = parse_years(
        "tank.years_since_last_inspection",
        tank.years_since_last_inspection.as_ref(),
    )?
    .filter(|y| y.0 > 0.0);

    Ok(ReportMetadata {
        tank_id,
        report_number,
        service: non_blank(tank.service.as_ref()).map(|s| normalize_service(&s)),
        inspector: non_blank(tank.inspector.as_ref()),
        inspection_date,
        diameter,
        height,
        capacity_gal,
        year_built,
        corrosion_allowance,
        time_base,
        years_since_last_inspection,
    })
}

fn validate_measurement(index: usize, raw: &RawMeasurement, metadata: &ReportMetadata) -> CalcResult<Measurement> {
    let prefix = format!("measurements[{}]", index);
    let field = |name: &str| format!("{}.{}", prefix, name);

    let location = raw.location.as_deref().map(str::trim).unwrap_or_default().to_string();
    let component_text = raw.component.as_deref().map(str::trim).unwrap_or_default();
    let kind = parse_component_kind(raw.kind.as_deref(), component_text, &location);
    let component = if component_text.is_empty() {
        kind.display_name().to_string()
    } else {
        component_text.to_string()
    };

    Ok(Measurement {
        cml_id: non_blank(raw.cml_id.as_ref()),
        component,
        location,
        kind,
        original_thickness: parse_thickness(&field("original_thickness"), raw.original_thickness.as_ref())?,
        current_thickness: parse_thickness(&field("current_thickness"), raw.current_thickness.as_ref())?,
        previous_thickness: parse_thickness(&field("previous_thickness"), raw.previous_thickness.as_ref())?,
        age_years: metadata.time_base,
        years_since_previous: metadata.years_since_last_inspection,
    })
}

fn validate_survey(
    request: &InspectionRequest,
    warnings: &mut Vec<DataQualityWarning>,
) -> CalcResult<Option<SettlementSurvey>> {
    let Some(raw) = &request.settlement else {
        return Ok(None);
    };

    let mut points = Vec::with_capacity(raw.points.len());
    for (i, point) in raw.points.iter().enumerate() {
        let angle = parse_number(&format!("settlement.points[{}].angle", i), Some(&point.angle))?;
        let elevation = parse_inches(&format!("settlement.points[{}].elevation", i), Some(&point.elevation))?;
        match (angle, elevation) {
            (Some((angle, _)), Some(elevation)) => points.push(SettlementPoint::new(angle, elevation.0)),
            _ => warnings.push(DataQualityWarning::new(
                WarningCode::SettlementInsufficient,
                format!("settlement.points[{}]", i),
                "Station has a blank angle or elevation and was skipped",
            )),
        }
    }

    let design_limit_in = match parse_inches("settlement.allowable_settlement_in", raw.allowable_settlement_in.as_ref())? {
        Some(limit) if limit.0 < 0.0 => {
            return Err(CalcError::invalid_input(
                "settlement.allowable_settlement_in",
                limit.0.to_string(),
                "Allowable settlement cannot be negative",
            ))
        }
        Some(limit) if limit.0 == 0.0 => None,
        other => other.map(|l| l.0),
    };

    Ok(Some(SettlementSurvey { points, design_limit_in }))
}

fn validate_course_design(design: &[CourseDesign], policy: &AnalysisPolicy) -> CalcResult<Vec<CourseDesign>> {
    for (i, row) in design.iter().enumerate() {
        if row.course_number == 0 || row.course_number > policy.max_courses {
            return Err(CalcError::invalid_input(
                format!("course_design[{}].course_number", i),
                row.course_number.to_string(),
                format!("Course number must be between 1 and {}", policy.max_courses),
            ));
        }
        if let Some(nominal) = row.nominal_thickness_in {
            validate_thickness(&format!("course_design[{}].nominal_thickness_in", i), nominal)?;
        }
        if let Some(height) = row.height_ft {
            if !height.is_finite() || height <= 0.0 {
                return Err(CalcError::invalid_input(
                    format!("course_design[{}].height_ft", i),
                    height.to_string(),
                    "Course height must be positive",
                ));
            }
        }
    }
    Ok(design.to_vec())
}

/// Validate a request into typed records.
///
/// # Returns
///
/// * `Ok(ValidatedInspection)` - typed records plus fallback warnings
/// * `Err(CalcError::InvalidInput)` - non-numeric text, out-of-range
///   thickness, negative age
/// * `Err(CalcError::VersionMismatch)` - request from an incompatible schema
pub fn validate_request(request: &InspectionRequest, policy: &AnalysisPolicy) -> CalcResult<ValidatedInspection> {
    validate_version(&request.schema_version)?;

    let mut warnings = Vec::new();
    let metadata = validate_metadata(&request.tank, &mut warnings)?;

    let measurements = request
        .measurements
        .iter()
        .enumerate()
        .map(|(i, raw)| validate_measurement(i, raw, &metadata))
        .collect::<CalcResult<Vec<_>>>()?;

    let settlement = validate_survey(request, &mut warnings)?;
    let course_design = validate_course_design(&request.course_design, policy)?;

    tracing::debug!(
        tank_id = %metadata.tank_id,
        measurements = measurements.len(),
        stations = settlement.as_ref().map_or(0, |s| s.points.len()),
        "request validated"
    );

    Ok(ValidatedInspection {
        metadata,
        measurements,
        settlement,
        course_design,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::{RawSettlementPoint, RawSettlementSurvey};

    fn base_request() -> InspectionRequest {
        let mut request = InspectionRequest::new("T-101");
        request.tank.report_number = Some("RPT-1".to_string());
        request.tank.inspection_date = Some("2024-06-01".to_string());
        request.tank.age_years = Some(RawField::Number(10.0));
        request
    }

    fn codes(warnings: &[DataQualityWarning]) -> Vec<WarningCode> {
        warnings.iter().map(|w| w.code).collect()
    }

    #[test]
    fn test_parse_number_with_units() {
        let text = RawField::from(" 0.375 in ");
        assert_eq!(parse_number("t", Some(&text)).unwrap(), Some((0.375, UnitSuffix::Inches)));
        let quote = RawField::from("0.5\"");
        assert_eq!(parse_number("t", Some(&quote)).unwrap(), Some((0.5, UnitSuffix::Inches)));
        let feet = RawField::from("120 ft");
        assert_eq!(parse_number("d", Some(&feet)).unwrap(), Some((120.0, UnitSuffix::Feet)));
        let bare = RawField::from(".25");
        assert_eq!(parse_number("t", Some(&bare)).unwrap(), Some((0.25, UnitSuffix::None)));
    }

    #[test]
    fn test_parse_number_blank_and_garbage() {
        assert_eq!(parse_number("t", None).unwrap(), None);
        assert_eq!(parse_number("t", Some(&RawField::from("   "))).unwrap(), None);
        let err = parse_number("t", Some(&RawField::from("about half"))).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(parse_number("t", Some(&RawField::Number(f64::INFINITY))).is_err());
    }

    #[test]
    fn test_zero_thickness_is_missing() {
        assert_eq!(parse_thickness("t", Some(&RawField::Number(0.0))).unwrap(), None);
        assert_eq!(parse_thickness("t", Some(&RawField::from("0.000"))).unwrap(), None);
        assert!(parse_thickness("t", Some(&RawField::from("2.5"))).is_err());
        assert!(parse_thickness("t", Some(&RawField::from("-0.2"))).is_err());
    }

    #[test]
    fn test_component_kind_parsing() {
        assert_eq!(parse_component_kind(Some("shell"), "Shell", "Course 1"), ComponentKind::Shell);
        assert_eq!(parse_component_kind(Some("Floor"), "", ""), ComponentKind::Bottom);
        assert_eq!(parse_component_kind(Some("annular ring"), "", ""), ComponentKind::Annular);
        assert_eq!(parse_component_kind(None, "Shell", "N1"), ComponentKind::Nozzle);
        assert_eq!(parse_component_kind(None, "Pipe", "Nozzle A"), ComponentKind::Nozzle);
        assert_eq!(parse_component_kind(None, "Roof plate", "Center"), ComponentKind::Roof);
        assert_eq!(parse_component_kind(Some("misc"), "Stairway", "Landing"), ComponentKind::Other);
    }

    #[test]
    fn test_service_map() {
        assert_eq!(normalize_service("crude_oil"), "Crude Oil");
        assert_eq!(normalize_service(" DIESEL "), "Diesel");
        assert_eq!(normalize_service("Jet A"), "Jet A");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_inspection_date("2024-06-01"), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(parse_inspection_date("06/01/2024"), NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(parse_inspection_date("June 1st"), None);
    }

    #[test]
    fn test_file_name_tank_id_falls_back() {
        let mut request = base_request();
        request.tank.tank_id = Some("Tank_Data_2024.xlsx".to_string());
        request.tank.tank_number = Some("TK-7".to_string());
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.tank_id, "TK-7");
        assert_eq!(codes(&validated.warnings), vec![WarningCode::MetadataFallback]);

        request.tank.tank_number = None;
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.tank_id, "UNKNOWN");
    }

    #[test]
    fn test_missing_report_number_generated() {
        let mut request = base_request();
        request.tank.report_number = None;
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert!(validated.metadata.report_number.starts_with("IMP-"));
    }

    #[test]
    fn test_bad_date_uses_today() {
        let mut request = base_request();
        request.tank.inspection_date = Some("sometime".to_string());
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.inspection_date, Utc::now().date_naive());
        assert!(codes(&validated.warnings).contains(&WarningCode::MetadataFallback));
    }

    #[test]
    fn test_capacity_barrels_to_gallons() {
        let mut request = base_request();
        request.tank.capacity = Some(RawField::from("10000 bbl"));
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.capacity_gal, Some(420_000.0));

        request.tank.capacity = Some(RawField::Number(5000.0));
        request.tank.capacity_unit = Some("barrels".to_string());
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.capacity_gal, Some(210_000.0));
    }

    #[test]
    fn test_time_base_from_year_built() {
        let mut request = base_request();
        request.tank.age_years = None;
        request.tank.year_built = Some(RawField::from("1994"));
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.time_base, Some(Years(30.0)));
    }

    #[test]
    fn test_year_built_after_inspection_rejected() {
        let mut request = base_request();
        request.tank.age_years = None;
        request.tank.year_built = Some(RawField::Number(2030.0));
        let err = validate_request(&request, &AnalysisPolicy::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_negative_age_rejected() {
        let mut request = base_request();
        request.tank.age_years = Some(RawField::from("-3"));
        assert!(validate_request(&request, &AnalysisPolicy::default()).is_err());
    }

    #[test]
    fn test_missing_age_warns() {
        let mut request = base_request();
        request.tank.age_years = None;
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        assert_eq!(validated.metadata.time_base, None);
        assert_eq!(codes(&validated.warnings), vec![WarningCode::MissingAge]);
    }

    #[test]
    fn test_measurements_typed() {
        let mut request = base_request();
        request.measurements.push(
            RawMeasurement::new("Shell", " Course 2 ", "shell")
                .with_original("0.500 in")
                .with_current(0.45)
                .with_cml("CML-9"),
        );
        request.measurements.push(RawMeasurement::new("", "N1", "").with_current("0.300"));
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        let m = &validated.measurements[0];
        assert_eq!(m.location, "Course 2");
        assert_eq!(m.kind, ComponentKind::Shell);
        assert_eq!(m.original_thickness, Some(Inches(0.5)));
        assert_eq!(m.age_years, Some(Years(10.0)));
        let nozzle = &validated.measurements[1];
        assert_eq!(nozzle.kind, ComponentKind::Nozzle);
        assert_eq!(nozzle.component, "Nozzle");
        assert_eq!(nozzle.original_thickness, None);
    }

    #[test]
    fn test_non_numeric_thickness_is_fatal() {
        let mut request = base_request();
        request
            .measurements
            .push(RawMeasurement::new("Shell", "Course 1", "shell").with_current("n/a"));
        let err = validate_request(&request, &AnalysisPolicy::default()).unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "measurements[0].current_thickness"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_survey_parsing() {
        let mut request = base_request();
        request.settlement = Some(RawSettlementSurvey {
            points: vec![
                RawSettlementPoint::new(0.0, "0.24 in"),
                RawSettlementPoint::new("90°", 0.0),
                RawSettlementPoint::new("", 0.1),
            ],
            allowable_settlement_in: Some(RawField::from("1.13")),
        });
        let validated = validate_request(&request, &AnalysisPolicy::default()).unwrap();
        let survey = validated.settlement.unwrap();
        assert_eq!(survey.points.len(), 2);
        assert_eq!(survey.points[1], SettlementPoint::new(90.0, 0.0));
        assert_eq!(survey.design_limit_in, Some(1.13));
        assert_eq!(codes(&validated.warnings), vec![WarningCode::SettlementInsufficient]);
    }

    #[test]
    fn test_course_design_rejected_out_of_range() {
        let mut request = base_request();
        request.course_design.push(CourseDesign {
            course_number: 13,
            height_ft: Some(8.0),
            nominal_thickness_in: Some(0.5),
        });
        assert!(validate_request(&request, &AnalysisPolicy::default()).is_err());
    }

    #[test]
    fn test_schema_version_checked() {
        let mut request = base_request();
        request.schema_version = "1.0.0".to_string();
        let err = validate_request(&request, &AnalysisPolicy::default()).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }
}
