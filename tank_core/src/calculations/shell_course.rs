//! # Shell Course Aggregation
//!
//! Groups shell readings into courses by matching their free-text location
//! (falling back to the component name) against course patterns such as
//! `Course 1`, `CRS-2`, `c3`, `Ring #4` or `Strake_5`.
//!
//! Each course is evaluated at its worst point: the minimum current thickness
//! among its members, with the course nominal thickness taken from the first
//! matching member (or the course design table when it supplies one).
//!
//! ## Governing Course
//!
//! The governing course is the one with the lowest remaining life. Courses are
//! visited in ascending course number and only a strictly lower remaining life
//! replaces the current candidate, so ties resolve to the lowest course number.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::calculations::shell_course::parse_course_number;
//!
//! assert_eq!(parse_course_number("Course 1 @ 90°", 12), Some(1));
//! assert_eq!(parse_course_number("CRS-3", 12), Some(3));
//! assert_eq!(parse_course_number("ring #12", 12), Some(12));
//! assert_eq!(parse_course_number("Course 13", 12), None);
//! assert_eq!(parse_course_number("Sketch B-4", 12), None);
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::calculations::corrosion::{
    classify_status, corrosion_rate, remaining_life, ComponentKind, InspectionStatus, MeasurementResult,
};
use crate::config::{AnalysisPolicy, REMAINING_LIFE_SENTINEL};
use crate::errors::{DataQualityWarning, WarningCode};
use crate::inspection::CourseDesign;
use crate::units::{Feet, Inches};

static COURSE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:course|crs|shell|ring|strake|tier|c)[\s#._-]*(\d{1,2})\b").unwrap());

/// Extract a course number in `1..=max_courses` from free text.
///
/// The first pattern occurrence that yields a number in range wins.
pub fn parse_course_number(text: &str, max_courses: u8) -> Option<u8> {
    COURSE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u8>().ok())
        .find(|n| (1..=max_courses).contains(n))
}

/// One shell course evaluated at its thinnest reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellCourse {
    /// Course number, 1 at the bottom
    pub course_number: u8,
    /// Course height from the design table, when known
    pub height_ft: Option<Feet>,
    /// Nominal thickness: design table, else first member's original
    pub nominal_thickness: Option<Inches>,
    /// Minimum current thickness among members
    pub measured_min_thickness: Inches,
    /// Label of the reading that set the minimum
    pub min_location: String,
    /// Readings that contributed to the course
    pub member_count: usize,
    /// Corrosion rate at the course minimum (in/yr)
    pub corrosion_rate: f64,
    /// Remaining life at the course minimum (yr)
    pub remaining_life: f64,
    pub status: InspectionStatus,
}

/// Result of grouping shell readings into courses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellCourseAnalysis {
    /// Matched courses in ascending course number; unmatched courses are omitted
    pub courses: Vec<ShellCourse>,
    /// Course with the lowest remaining life
    pub governing_course: Option<u8>,
    /// Worst course status
    pub shell_status: Option<InspectionStatus>,
    /// Shell readings whose text matched no course pattern
    pub unmatched: Vec<String>,
    pub warnings: Vec<DataQualityWarning>,
}

impl ShellCourseAnalysis {
    /// The governing course record, if any
    pub fn governing(&self) -> Option<&ShellCourse> {
        let number = self.governing_course?;
        self.courses.iter().find(|c| c.course_number == number)
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Working state for one course while members are collected
struct CourseAccumulator<'a> {
    first_original: Option<Inches>,
    min_member: &'a MeasurementResult,
    min_current: Inches,
    member_count: usize,
}

/// Group analyzed readings into shell courses.
///
/// Only [`ComponentKind::Shell`] readings with a usable current thickness
/// take part; readings missing a current thickness already carry a warning.
pub fn aggregate_courses(
    results: &[MeasurementResult],
    design: &[CourseDesign],
    policy: &AnalysisPolicy,
) -> ShellCourseAnalysis {
    let mut groups: BTreeMap<u8, CourseAccumulator<'_>> = BTreeMap::new();
    let mut unmatched = Vec::new();

    for result in results {
        let m = &result.measurement;
        if m.kind != ComponentKind::Shell {
            continue;
        }
        let Some(current) = m.current_thickness else {
            continue;
        };

        let course = parse_course_number(&m.location, policy.max_courses)
            .or_else(|| parse_course_number(&m.component, policy.max_courses));
        let Some(course) = course else {
            unmatched.push(m.label());
            continue;
        };

        match groups.get_mut(&course) {
            Some(acc) => {
                acc.member_count += 1;
                if acc.first_original.is_none() {
                    acc.first_original = m.original_thickness;
                }
                if current < acc.min_current {
                    acc.min_current = current;
                    acc.min_member = result;
                }
            }
            None => {
                groups.insert(
                    course,
                    CourseAccumulator {
                        first_original: m.original_thickness,
                        min_member: result,
                        min_current: current,
                        member_count: 1,
                    },
                );
            }
        }
    }

    let courses: Vec<ShellCourse> = groups
        .into_iter()
        .map(|(course_number, acc)| {
            let row = design.iter().find(|d| d.course_number == course_number);
            let nominal = row
                .and_then(|d| d.nominal_thickness_in)
                .map(Inches)
                .or(acc.first_original);
            let height_ft = row.and_then(|d| d.height_ft).map(Feet);

            let rate = match (nominal, acc.min_member.measurement.age_years) {
                (Some(nominal), Some(age)) => corrosion_rate(nominal.0, acc.min_current.0, age.0),
                _ => 0.0,
            };
            let life = remaining_life(acc.min_current.0, rate, policy.min_thickness_in);

            ShellCourse {
                course_number,
                height_ft,
                nominal_thickness: nominal,
                measured_min_thickness: acc.min_current,
                min_location: acc.min_member.measurement.label(),
                member_count: acc.member_count,
                corrosion_rate: rate,
                remaining_life: life,
                status: classify_status(life, &policy.thresholds),
            }
        })
        .collect();

    let mut warnings = Vec::new();
    if courses.is_empty() {
        warnings.push(DataQualityWarning::new(
            WarningCode::NoShellData,
            "shell",
            "No shell reading matched a course pattern",
        ));
    } else if !unmatched.is_empty() {
        warnings.push(DataQualityWarning::new(
            WarningCode::NoShellData,
            "shell",
            format!("{} shell reading(s) matched no course: {}", unmatched.len(), unmatched.join(", ")),
        ));
    }

    tracing::debug!(courses = courses.len(), unmatched = unmatched.len(), "shell courses aggregated");

    ShellCourseAnalysis {
        governing_course: governing_course(&courses).map(|c| c.course_number),
        shell_status: InspectionStatus::worst(courses.iter().map(|c| c.status)),
        courses,
        unmatched,
        warnings,
    }
}

/// Course with the lowest remaining life; ties resolve to the first course in
/// slice order (ascending course number for aggregated output).
pub fn governing_course(courses: &[ShellCourse]) -> Option<&ShellCourse> {
    let mut best: Option<&ShellCourse> = None;
    for course in courses {
        let lower = match best {
            Some(current) => course.remaining_life < current.remaining_life,
            None => true,
        };
        if lower {
            best = Some(course);
        }
    }
    best
}

/// Remaining life shown for a course list with no governing course
pub fn governing_remaining_life(analysis: &ShellCourseAnalysis) -> f64 {
    analysis
        .governing()
        .map(|c| c.remaining_life)
        .unwrap_or(REMAINING_LIFE_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::corrosion::{analyze_measurements, Measurement};

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn shell(location: &str, orig: f64, curr: f64) -> Measurement {
        Measurement::new("Shell", location, ComponentKind::Shell, orig, curr, 10.0)
    }

    fn aggregate(measurements: &[Measurement]) -> ShellCourseAnalysis {
        let policy = AnalysisPolicy::default();
        let results = analyze_measurements(measurements, &policy).unwrap();
        aggregate_courses(&results, &[], &policy)
    }

    #[test]
    fn test_course_patterns() {
        assert_eq!(parse_course_number("Course 1", 12), Some(1));
        assert_eq!(parse_course_number("course#2", 12), Some(2));
        assert_eq!(parse_course_number("CRS 4", 12), Some(4));
        assert_eq!(parse_course_number("C5", 12), Some(5));
        assert_eq!(parse_course_number("c-6 north", 12), Some(6));
        assert_eq!(parse_course_number("Shell 7", 12), Some(7));
        assert_eq!(parse_course_number("Ring_8", 12), Some(8));
        assert_eq!(parse_course_number("Strake.9", 12), Some(9));
        assert_eq!(parse_course_number("TIER 10", 12), Some(10));
    }

    #[test]
    fn test_course_pattern_rejections() {
        assert_eq!(parse_course_number("CML-04", 12), None);
        assert_eq!(parse_course_number("Course 0", 12), None);
        assert_eq!(parse_course_number("Course 7", 6), None);
        assert_eq!(parse_course_number("Bottom plate", 12), None);
        assert_eq!(parse_course_number("", 12), None);
    }

    #[test]
    fn test_shell_text_then_course() {
        // "Shell" is followed by a word, so the explicit course wins
        assert_eq!(parse_course_number("Shell course 3", 12), Some(3));
    }

    #[test]
    fn test_minimum_and_first_nominal() {
        let analysis = aggregate(&[
            shell("Course 1 @ 0°", 0.500, 0.460),
            shell("Course 1 @ 90°", 0.520, 0.440),
            shell("Course 1 @ 180°", 0.500, 0.470),
        ]);
        assert_eq!(analysis.courses.len(), 1);
        let c1 = &analysis.courses[0];
        assert_eq!(c1.member_count, 3);
        assert_eq!(c1.measured_min_thickness, Inches(0.440));
        // Nominal from the first member, not averaged
        assert_eq!(c1.nominal_thickness, Some(Inches(0.500)));
        assert!(approx_eq(c1.corrosion_rate, 0.006, 1e-12));
        assert!(c1.min_location.contains("90°"));
    }

    #[test]
    fn test_unmatched_courses_omitted() {
        let analysis = aggregate(&[shell("Course 1", 0.5, 0.45), shell("Course 3", 0.5, 0.45)]);
        let numbers: Vec<u8> = analysis.courses.iter().map(|c| c.course_number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_falls_back_to_component() {
        let m = Measurement::new("Course 2", "North", ComponentKind::Shell, 0.5, 0.45, 10.0);
        let analysis = aggregate(&[m]);
        assert_eq!(analysis.courses[0].course_number, 2);
    }

    #[test]
    fn test_non_shell_ignored() {
        let bottom = Measurement::new("Bottom", "C1", ComponentKind::Bottom, 0.25, 0.2, 10.0);
        let analysis = aggregate(&[bottom]);
        assert!(analysis.is_empty());
        assert_eq!(analysis.governing_course, None);
        assert_eq!(analysis.shell_status, None);
        assert_eq!(analysis.warnings[0].code, WarningCode::NoShellData);
    }

    #[test]
    fn test_missing_current_excluded() {
        let mut missing = shell("Course 1", 0.5, 0.2);
        missing.current_thickness = None;
        let analysis = aggregate(&[missing, shell("Course 1", 0.5, 0.45)]);
        assert_eq!(analysis.courses[0].member_count, 1);
        assert_eq!(analysis.courses[0].measured_min_thickness, Inches(0.45));
    }

    #[test]
    fn test_governing_course_lowest_life() {
        let analysis = aggregate(&[
            shell("Course 1", 0.500, 0.450),
            shell("Course 2", 0.400, 0.300),
            shell("Course 3", 0.375, 0.350),
        ]);
        assert_eq!(analysis.governing_course, Some(2));
    }

    #[test]
    fn test_governing_tie_goes_to_lowest_number() {
        let analysis = aggregate(&[shell("Course 4", 0.5, 0.45), shell("Course 2", 0.5, 0.45)]);
        assert_eq!(analysis.governing_course, Some(2));
    }

    #[test]
    fn test_shell_status_is_worst() {
        let analysis = aggregate(&[
            shell("Course 1", 0.500, 0.450),
            // rate 0.0125, life (0.150 - 0.1) / 0.0125 = 4.0
            shell("Course 2", 0.275, 0.150),
        ]);
        assert_eq!(analysis.shell_status, Some(InspectionStatus::ActionRequired));
    }

    #[test]
    fn test_design_table_overrides_nominal() {
        let policy = AnalysisPolicy::default();
        let results = analyze_measurements(&[shell("Course 1", 0.500, 0.450)], &policy).unwrap();
        let design = vec![CourseDesign {
            course_number: 1,
            height_ft: Some(8.0),
            nominal_thickness_in: Some(0.550),
        }];
        let analysis = aggregate_courses(&results, &design, &policy);
        let c1 = &analysis.courses[0];
        assert_eq!(c1.nominal_thickness, Some(Inches(0.550)));
        assert_eq!(c1.height_ft, Some(Feet(8.0)));
        assert!(approx_eq(c1.corrosion_rate, 0.010, 1e-12));
    }

    #[test]
    fn test_unmatched_shell_reported() {
        let analysis = aggregate(&[shell("Course 1", 0.5, 0.45), shell("Manway", 0.5, 0.45)]);
        assert_eq!(analysis.unmatched, vec!["Shell Manway".to_string()]);
        assert_eq!(analysis.warnings.len(), 1);
    }
}
