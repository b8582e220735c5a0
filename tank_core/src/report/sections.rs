//! # Section Builders
//!
//! Turn analysis results into [`ReportSection`]s. Builders only resolve text;
//! they never paginate. Anything whose size follows the input is cut here so
//! the assembler never meets a block taller than a page: tables into blocks
//! of at most [`PageLayout::max_table_rows`] rows, text carrying caller data
//! into paragraphs of at most [`PageLayout::max_text_lines`] wrapped lines.

use crate::calculations::corrosion::{InspectionStatus, MeasurementResult};
use crate::calculations::settlement::{LimitSource, SettlementAcceptance, SettlementProfile};
use crate::calculations::shell_course::ShellCourseAnalysis;
use crate::equations::registry::EquationTracker;
use crate::errors::DataQualityWarning;
use crate::input::ReportMetadata;
use crate::report::format;
use crate::report::layout::PageLayout;
use crate::report::model::{wrap_lines, ContentBlock, EquationVariable, ReportSection};

pub const TANK_INFORMATION: &str = "Tank Information";
pub const EXECUTIVE_SUMMARY: &str = "Executive Summary";
pub const THICKNESS_MEASUREMENTS: &str = "Thickness Measurements";
pub const SHELL_COURSE_ANALYSIS: &str = "Shell Course Analysis";
pub const SETTLEMENT_SURVEY: &str = "Settlement Survey";
pub const DATA_QUALITY_WARNINGS: &str = "Data Quality Warnings";
pub const APPENDIX: &str = "Appendix: List of Equations";

/// Split rows into table blocks no taller than one page.
///
/// Continuation blocks repeat the column header and mark the caption.
pub fn chunk_table(caption: &str, columns: &[&str], rows: Vec<Vec<String>>, layout: &PageLayout) -> Vec<ContentBlock> {
    let max_rows = layout.max_table_rows();
    if rows.len() <= max_rows {
        return vec![ContentBlock::table(Some(caption.to_string()), columns, rows)];
    }
    let total = rows.len();
    let mut blocks = Vec::with_capacity(total.div_ceil(max_rows));
    let mut rest = rows;
    let mut start = 1;
    while !rest.is_empty() {
        let tail = rest.split_off(rest.len().min(max_rows));
        let end = start + rest.len() - 1;
        blocks.push(ContentBlock::table(
            Some(format!("{} (rows {}-{} of {})", caption, start, end, total)),
            columns,
            rest,
        ));
        start = end + 1;
        rest = tail;
    }
    blocks
}

/// Split text into paragraph blocks no taller than one page.
pub fn chunk_paragraph(text: &str, layout: &PageLayout) -> Vec<ContentBlock> {
    let lines = wrap_lines(text, layout.chars_per_line);
    let max_lines = layout.max_text_lines();
    if lines.len() <= max_lines {
        return vec![ContentBlock::paragraph(text)];
    }
    lines
        .chunks(max_lines)
        .map(|chunk| ContentBlock::paragraph(chunk.join("\n")))
        .collect()
}

fn status_label(status: Option<InspectionStatus>) -> &'static str {
    status.map_or(format::NOT_AVAILABLE, |s| s.label())
}

// ============================================================================
// Sections
// ============================================================================

pub fn tank_information(metadata: &ReportMetadata) -> ReportSection {
    let rows = vec![
        ("Tank ID", metadata.tank_id.clone()),
        ("Report Number", metadata.report_number.clone()),
        ("Inspection Date", format::date(metadata.inspection_date)),
        ("Inspector", format::text_opt(metadata.inspector.as_deref())),
        ("Service", format::text_opt(metadata.service.as_deref())),
        ("Diameter", format::feet_opt(metadata.diameter)),
        ("Height", format::feet_opt(metadata.height)),
        (
            "Capacity",
            metadata
                .capacity_gal
                .map_or_else(|| format::NOT_AVAILABLE.to_string(), format::gallons),
        ),
        (
            "Year Built",
            metadata
                .year_built
                .map_or_else(|| format::NOT_AVAILABLE.to_string(), |y| y.to_string()),
        ),
        (
            "Corrosion Allowance",
            metadata
                .corrosion_allowance
                .map_or_else(|| "Not specified".to_string(), |ca| format!("{} in", format::thickness(ca.0))),
        ),
        (
            "Corrosion Time Base",
            metadata
                .time_base
                .map_or_else(|| format::NOT_AVAILABLE.to_string(), |y| format!("{:.1} yr", y.0)),
        ),
    ];
    ReportSection::new(TANK_INFORMATION).with_block(ContentBlock::key_value(rows))
}

/// Headline figures for the executive summary.
#[derive(Debug, Clone, Copy)]
pub struct SummaryFigures<'a> {
    pub results: &'a [MeasurementResult],
    pub shell: &'a ShellCourseAnalysis,
    pub settlement: Option<&'a SettlementProfile>,
    pub overall_status: Option<InspectionStatus>,
    pub warning_count: usize,
}

pub fn executive_summary(figures: &SummaryFigures<'_>, layout: &PageLayout) -> ReportSection {
    let mut section = ReportSection::new(EXECUTIVE_SUMMARY);
    section.push(ContentBlock::banner("Overall Status", status_label(figures.overall_status)));

    let action = figures
        .results
        .iter()
        .filter(|r| r.status == InspectionStatus::ActionRequired)
        .count();
    let monitor = figures
        .results
        .iter()
        .filter(|r| r.status == InspectionStatus::Monitor)
        .count();
    let governing = figures.shell.governing();

    section.push(ContentBlock::key_value(vec![
        ("Thickness Readings", figures.results.len().to_string()),
        ("Action Required", action.to_string()),
        ("Monitor", monitor.to_string()),
        (
            "Governing Shell Course",
            governing.map_or_else(|| "None".to_string(), |c| format!("Course {}", c.course_number)),
        ),
        (
            "Governing Remaining Life",
            governing.map_or_else(|| format::NOT_AVAILABLE.to_string(), |c| {
                format!("{} yr", format::remaining_life(c.remaining_life))
            }),
        ),
        ("Shell Status", status_label(figures.shell.shell_status).to_string()),
        (
            "Settlement",
            figures
                .settlement
                .map_or_else(|| "Not surveyed".to_string(), |p| p.acceptance.label().to_string()),
        ),
        ("Data Quality Warnings", figures.warning_count.to_string()),
    ]));

    let narrative = match (figures.overall_status, governing) {
        (None, _) => "No thickness readings were supplied; corrosion status could not be assessed.".to_string(),
        (Some(status), Some(course)) => format!(
            "Overall condition is {}. Shell course {} governs with a remaining life of {} years at {}.",
            status.label(),
            course.course_number,
            format::remaining_life(course.remaining_life),
            course.min_location
        ),
        (Some(status), None) => format!("Overall condition is {}. No shell course could be evaluated.", status.label()),
    };
    section.extend(chunk_paragraph(&narrative, layout));
    section
}

pub fn thickness_measurements(results: &[MeasurementResult], layout: &PageLayout) -> ReportSection {
    let mut section = ReportSection::new(THICKNESS_MEASUREMENTS);
    if results.is_empty() {
        return section;
    }

    let with_short_term = results.iter().any(|r| r.short_term_rate.is_some());
    let mut columns = vec!["Location", "Component", "t orig (in)", "t curr (in)", "CR (in/yr)"];
    if with_short_term {
        columns.push("CR st (in/yr)");
    }
    columns.extend(["RL (yr)", "Status"]);

    let rows = results
        .iter()
        .map(|r| {
            let m = &r.measurement;
            let location = match &m.cml_id {
                Some(cml) if m.location.is_empty() => cml.clone(),
                Some(cml) => format!("{} {}", cml, m.location),
                None => m.location.clone(),
            };
            let mut row = vec![
                location,
                m.kind.display_name().to_string(),
                format::thickness_opt(m.original_thickness),
                format::thickness_opt(m.current_thickness),
                format::rate(r.corrosion_rate),
            ];
            if with_short_term {
                row.push(format::rate_opt(r.short_term_rate));
            }
            row.push(format::remaining_life(r.remaining_life));
            row.push(r.status.label().to_string());
            row
        })
        .collect();

    section.extend(chunk_table("Thickness readings", &columns, rows, layout));
    section
}

pub fn shell_course_analysis(shell: &ShellCourseAnalysis, layout: &PageLayout) -> ReportSection {
    let mut section = ReportSection::new(SHELL_COURSE_ANALYSIS);
    if shell.is_empty() {
        section.push(ContentBlock::placeholder(
            "No shell data: no shell reading matched a course pattern",
        ));
    } else {
        let rows = shell
            .courses
            .iter()
            .map(|c| {
                vec![
                    c.course_number.to_string(),
                    format::feet_opt(c.height_ft),
                    format::thickness_opt(c.nominal_thickness),
                    format::thickness(c.measured_min_thickness.0),
                    format::rate(c.corrosion_rate),
                    format::remaining_life(c.remaining_life),
                    c.status.label().to_string(),
                    c.min_location.clone(),
                ]
            })
            .collect();
        section.extend(chunk_table(
            "Shell courses",
            &["Course", "Height", "t nom (in)", "t min (in)", "CR (in/yr)", "RL (yr)", "Status", "Minimum at"],
            rows,
            layout,
        ));
    }

    if let Some(course) = shell.governing() {
        section.push(ContentBlock::banner(
            "Governing Course",
            format!(
                "Course {} ({} yr, {})",
                course.course_number,
                format::remaining_life(course.remaining_life),
                course.status.label()
            ),
        ));
    }
    if !shell.unmatched.is_empty() {
        let rows = shell.unmatched.iter().map(|location| vec![location.clone()]).collect();
        section.extend(chunk_table(
            "Shell readings not assigned to a course",
            &["Location"],
            rows,
            layout,
        ));
    }
    section
}

pub fn settlement_survey(profile: Option<&SettlementProfile>, min_points: usize, layout: &PageLayout) -> ReportSection {
    let mut section = ReportSection::new(SETTLEMENT_SURVEY);
    let Some(profile) = profile else {
        return section;
    };

    let Some(fit) = profile.fit else {
        section.push(ContentBlock::banner("Acceptance", SettlementAcceptance::InsufficientData.label()));
        section.push(ContentBlock::paragraph(format!(
            "The survey has {} distinct station angle(s); at least {} are required for a cosine fit. \
             No fitted parameters are reported.",
            profile.distinct_points, min_points
        )));
        return section;
    };

    let limit_source = match profile.limit_source {
        LimitSource::Design => "Design limit",
        LimitSource::Api653AnnexB => "API 653 Annex B",
        LimitSource::Unavailable => "Not available",
    };
    section.push(ContentBlock::key_value(vec![
        ("Stations", format!("{} ({} distinct)", profile.points.len(), profile.distinct_points)),
        ("Tilt Amplitude A", format!("{} in", format::settlement(fit.amplitude))),
        ("Tilt Phase", format::degrees(fit.phase_deg)),
        ("Uniform Settlement", format!("{} in", format::settlement(fit.baseline))),
        ("R²", format!("{:.4}", fit.r_squared)),
        ("Max Out-of-Plane", format!("{} in", format::settlement_opt(profile.max_settlement))),
        ("Allowable", format!("{} in", format::settlement_opt(profile.allowable_settlement))),
        ("Limit Source", limit_source.to_string()),
    ]));

    let rows = profile
        .deviations
        .iter()
        .map(|d| {
            vec![
                format::degrees(d.angle.0),
                format::settlement(d.measured),
                format::settlement(d.fitted),
                format::settlement(d.deviation),
            ]
        })
        .collect();
    section.extend(chunk_table(
        "Survey stations",
        &["Angle", "Measured (in)", "Fitted (in)", "Deviation (in)"],
        rows,
        layout,
    ));
    section.push(ContentBlock::banner("Acceptance", profile.acceptance.label()));
    section
}

pub fn data_quality_warnings(warnings: &[DataQualityWarning], layout: &PageLayout) -> ReportSection {
    let mut section = ReportSection::new(DATA_QUALITY_WARNINGS);
    if warnings.is_empty() {
        section.push(ContentBlock::paragraph("No data quality issues were found."));
        return section;
    }
    let rows = warnings
        .iter()
        .map(|w| vec![w.code.label().to_string(), w.subject.clone(), w.message.clone()])
        .collect();
    section.extend(chunk_table("Warnings", &["Category", "Subject", "Detail"], rows, layout));
    section
}

pub fn equation_appendix(tracker: &EquationTracker) -> ReportSection {
    let mut section = ReportSection::new(APPENDIX).starting_new_page();
    if tracker.is_empty() {
        return section;
    }
    section.push(ContentBlock::paragraph(
        "This appendix lists every equation applied in this report, with its formula, \
         reference, and the sections where it was used.",
    ));
    for (category, equations) in tracker.by_category() {
        section.push(ContentBlock::subheading(category.display_name()));
        for equation in equations {
            let meta = equation.metadata();
            section.push(ContentBlock::Equation {
                name: meta.name.to_string(),
                formula_plain: meta.formula_plain.to_string(),
                formula_typst: meta.formula_typst.to_string(),
                reference: meta.reference.citation(),
                variables: meta
                    .variables
                    .iter()
                    .map(|v| EquationVariable {
                        symbol: v.symbol.to_string(),
                        description: v.description.to_string(),
                        units: v.units.to_string(),
                    })
                    .collect(),
                applied_in: tracker.contexts_for(equation).into_iter().map(str::to_string).collect(),
            });
        }
    }
    section
}
