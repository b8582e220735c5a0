//! # Report Pipeline
//!
//! One call from raw request to finished document:
//!
//! ```text
//! InspectionRequest
//!   → validate_request          (typed records + fallback warnings)
//!   → analyze_measurements      (rate, remaining life, status per reading)
//!   → aggregate_courses         (shell courses, governing course)
//!   → analyze_settlement        (cosine fit, acceptance)
//!   → build_sections            (fixed section order)
//!   → ReportAssembler::assemble (pages, footers)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tank_core::config::EngineConfig;
//! use tank_core::inspection::{InspectionRequest, RawField, RawMeasurement};
//! use tank_core::pipeline::generate_report;
//!
//! let mut request = InspectionRequest::new("T-101");
//! request.tank.age_years = Some(RawField::Number(10.0));
//! request.measurements.push(
//!     RawMeasurement::new("Shell", "Course 1", "shell")
//!         .with_original(0.500)
//!         .with_current(0.450),
//! );
//!
//! let output = generate_report(&request, &EngineConfig::default()).unwrap();
//! assert_eq!(output.summary.governing_course, Some(1));
//! assert_eq!(output.document.pages[0].footer.text, format!("Page 1 of {}", output.summary.total_pages));
//! ```

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::calculations::corrosion::{analyze_measurements, InspectionStatus, MeasurementResult};
use crate::calculations::settlement::{analyze_settlement, LimitSource, SettlementAcceptance, SettlementProfile};
use crate::calculations::shell_course::{aggregate_courses, governing_remaining_life, ShellCourseAnalysis};
use crate::config::{AnalysisPolicy, EngineConfig};
use crate::equations::registry::{Equation, EquationTracker};
use crate::errors::{CalcResult, DataQualityWarning};
use crate::input::{validate_request, ReportMetadata};
use crate::inspection::InspectionRequest;
use crate::report::layout::PageLayout;
use crate::report::model::{DocumentModel, ReportSection};
use crate::report::sections::{self, SummaryFigures};
use crate::report::ReportAssembler;

/// Everything computed for one inspection, before layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionAnalysis {
    pub metadata: ReportMetadata,
    pub measurements: Vec<MeasurementResult>,
    pub shell: ShellCourseAnalysis,
    pub settlement: Option<SettlementProfile>,
    /// Minimum distinct survey angles the fit required
    pub settlement_min_points: usize,
    pub equations: EquationTracker,
    /// Every data-quality warning, in pipeline order
    pub warnings: Vec<DataQualityWarning>,
}

impl InspectionAnalysis {
    /// Worst status across readings and shell courses
    pub fn overall_status(&self) -> Option<InspectionStatus> {
        InspectionStatus::worst(
            self.measurements
                .iter()
                .map(|r| r.status)
                .chain(self.shell.shell_status),
        )
    }
}

/// Machine-readable headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub tank_id: String,
    pub report_number: String,
    pub governing_course: Option<u8>,
    /// Remaining life of the governing course, sentinel when there is none
    pub governing_remaining_life: f64,
    pub shell_status: Option<InspectionStatus>,
    pub overall_status: Option<InspectionStatus>,
    pub settlement_acceptance: Option<SettlementAcceptance>,
    pub measurement_count: usize,
    pub action_required_count: usize,
    pub warning_count: usize,
    pub total_pages: usize,
}

impl AnalyticsSummary {
    pub fn from_analysis(analysis: &InspectionAnalysis, total_pages: usize) -> Self {
        AnalyticsSummary {
            tank_id: analysis.metadata.tank_id.clone(),
            report_number: analysis.metadata.report_number.clone(),
            governing_course: analysis.shell.governing_course,
            governing_remaining_life: governing_remaining_life(&analysis.shell),
            shell_status: analysis.shell.shell_status,
            overall_status: analysis.overall_status(),
            settlement_acceptance: analysis.settlement.as_ref().map(|p| p.acceptance),
            measurement_count: analysis.measurements.len(),
            action_required_count: analysis
                .measurements
                .iter()
                .filter(|r| r.status == InspectionStatus::ActionRequired)
                .count(),
            warning_count: analysis.warnings.len(),
            total_pages,
        }
    }
}

/// Result of [`generate_report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub document: DocumentModel,
    pub summary: AnalyticsSummary,
    pub warnings: Vec<DataQualityWarning>,
    pub analysis: InspectionAnalysis,
}

fn record_equations(analysis: &mut InspectionAnalysis) {
    let tracker = &mut analysis.equations;

    if !analysis.measurements.is_empty() {
        tracker.record(Equation::LongTermCorrosionRate, sections::THICKNESS_MEASUREMENTS);
        tracker.record(Equation::RemainingLife, sections::THICKNESS_MEASUREMENTS);
    }
    for result in analysis.measurements.iter().filter(|r| r.short_term_rate.is_some()) {
        tracker.record_for_subject(
            Equation::ShortTermCorrosionRate,
            sections::THICKNESS_MEASUREMENTS,
            result.measurement.label(),
        );
    }

    for course in &analysis.shell.courses {
        tracker.record_for_subject(
            Equation::CourseMinimumThickness,
            sections::SHELL_COURSE_ANALYSIS,
            format!("Course {}", course.course_number),
        );
    }
    if !analysis.shell.is_empty() {
        tracker.record(Equation::LongTermCorrosionRate, sections::SHELL_COURSE_ANALYSIS);
        tracker.record(Equation::RemainingLife, sections::SHELL_COURSE_ANALYSIS);
    }

    if let Some(profile) = &analysis.settlement {
        if profile.fit.is_some() {
            tracker.record(Equation::CosineSettlementFit, sections::SETTLEMENT_SURVEY);
            tracker.record(Equation::CoefficientOfDetermination, sections::SETTLEMENT_SURVEY);
            tracker.record(Equation::OutOfPlaneDeviation, sections::SETTLEMENT_SURVEY);
        }
        if profile.limit_source == LimitSource::Api653AnnexB {
            tracker.record(Equation::Api653SettlementLimit, sections::SETTLEMENT_SURVEY);
        }
    }
}

/// Validate and analyze a request without laying anything out.
#[instrument(skip_all, fields(measurements = request.measurements.len()))]
pub fn analyze_inspection(request: &InspectionRequest, policy: &AnalysisPolicy) -> CalcResult<InspectionAnalysis> {
    policy.validate()?;
    let validated = validate_request(request, policy)?;
    let mut warnings = validated.warnings;

    let measurements = analyze_measurements(&validated.measurements, policy)?;
    warnings.extend(measurements.iter().flat_map(|r| r.warnings.iter().cloned()));

    let shell = aggregate_courses(&measurements, &validated.course_design, policy);
    warnings.extend(shell.warnings.iter().cloned());

    let settlement = validated.settlement.as_ref().map(|survey| {
        let (profile, settlement_warnings) = analyze_settlement(
            survey,
            validated.metadata.diameter,
            validated.metadata.height,
            &policy.settlement,
        );
        warnings.extend(settlement_warnings);
        profile
    });

    let mut analysis = InspectionAnalysis {
        metadata: validated.metadata,
        measurements,
        shell,
        settlement,
        settlement_min_points: policy.settlement.min_points,
        equations: EquationTracker::new(),
        warnings,
    };
    record_equations(&mut analysis);

    tracing::info!(
        tank_id = %analysis.metadata.tank_id,
        governing_course = ?analysis.shell.governing_course,
        overall_status = ?analysis.overall_status(),
        warnings = analysis.warnings.len(),
        "inspection analyzed"
    );
    Ok(analysis)
}

/// Report sections in fixed order.
pub fn build_sections(analysis: &InspectionAnalysis, layout: &PageLayout) -> Vec<ReportSection> {
    let figures = SummaryFigures {
        results: &analysis.measurements,
        shell: &analysis.shell,
        settlement: analysis.settlement.as_ref(),
        overall_status: analysis.overall_status(),
        warning_count: analysis.warnings.len(),
    };

    vec![
        sections::tank_information(&analysis.metadata),
        sections::executive_summary(&figures, layout),
        sections::thickness_measurements(&analysis.measurements, layout),
        sections::shell_course_analysis(&analysis.shell, layout),
        sections::settlement_survey(analysis.settlement.as_ref(), analysis.settlement_min_points, layout),
        sections::data_quality_warnings(&analysis.warnings, layout),
        sections::equation_appendix(&analysis.equations),
    ]
}

/// Validate, analyze, and paginate one inspection request.
///
/// # Returns
///
/// * `Ok(ReportOutput)` - document, summary, warnings, and the full analysis
/// * `Err(CalcError::InvalidInput)` - the request failed validation
/// * `Err(CalcError::BlockTooLarge)` - a block cannot fit on one page
#[instrument(skip_all, fields(tank = request.tank.tank_id.as_deref().unwrap_or("")))]
pub fn generate_report(request: &InspectionRequest, config: &EngineConfig) -> CalcResult<ReportOutput> {
    config.validate()?;
    let analysis = analyze_inspection(request, &config.policy)?;
    let report_sections = build_sections(&analysis, &config.layout);

    let document = ReportAssembler::new(config.layout.clone())?
        .with_title(format!("API 653 Inspection Report - {}", analysis.metadata.tank_id))
        .assemble(&report_sections)?;

    let summary = AnalyticsSummary::from_analysis(&analysis, document.total_pages);
    tracing::info!(
        document_id = %document.document_id,
        pages = document.total_pages,
        "report generated"
    );

    Ok(ReportOutput {
        document,
        summary,
        warnings: analysis.warnings.clone(),
        analysis,
    })
}
