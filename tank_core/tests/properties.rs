//! Property-based tests for analyzer and pagination invariants.

use proptest::prelude::*;
use tank_core::calculations::corrosion::{classify_status, corrosion_rate, remaining_life, InspectionStatus};
use tank_core::calculations::settlement::{fit_cosine, CosineFit, SettlementPoint};
use tank_core::calculations::shell_course::{governing_course, ShellCourse};
use tank_core::config::{AnalysisPolicy, StatusThresholds};
use tank_core::inspection::{InspectionRequest, RawField, RawMeasurement, RawSettlementPoint, RawSettlementSurvey};
use tank_core::pipeline::{analyze_inspection, build_sections};
use tank_core::report::{ContentBlock, PageLayout, ReportAssembler, ReportSection};
use tank_core::units::{Degrees, Inches};

const MIN_THICKNESS: f64 = 0.1;

fn circular_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

fn course(number: u8, remaining_life: f64) -> ShellCourse {
    ShellCourse {
        course_number: number,
        height_ft: None,
        nominal_thickness: None,
        measured_min_thickness: Inches(0.3),
        min_location: format!("Course {}", number),
        member_count: 1,
        corrosion_rate: 0.01,
        remaining_life,
        status: classify_status(remaining_life, &StatusThresholds::default()),
    }
}

// ============================================================================
// Corrosion
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Loss of wall over a positive service time never gives a negative rate.
    #[test]
    fn rate_non_negative_when_thinning(
        original in 0.01..2.0f64,
        loss_fraction in 0.0..1.0f64,
        age in 0.01..100.0f64,
    ) {
        let current = original * (1.0 - loss_fraction);
        let rate = corrosion_rate(original, current, age);
        prop_assert!(rate >= 0.0, "rate({}, {}, {}) = {}", original, current, age, rate);
        prop_assert!(rate.is_finite());
    }

    /// Remaining life never increases as the rate grows.
    #[test]
    fn remaining_life_non_increasing(
        current in 0.01..2.0f64,
        r1 in 1e-6..1.0f64,
        delta in 0.0..1.0f64,
    ) {
        let r2 = r1 + delta;
        let life_1 = remaining_life(current, r1, MIN_THICKNESS);
        let life_2 = remaining_life(current, r2, MIN_THICKNESS);
        prop_assert!(life_1 >= life_2, "RL({})={} < RL({})={}", r1, life_1, r2, life_2);
        prop_assert!(life_2 >= 0.0);
    }

    /// Non-positive rates always resolve to the sentinel.
    #[test]
    fn remaining_life_sentinel_for_no_loss(current in 0.01..2.0f64, rate in -1.0..=0.0f64) {
        prop_assert_eq!(remaining_life(current, rate, MIN_THICKNESS), 999.0);
    }

    /// Status is monotone in remaining life.
    #[test]
    fn status_monotone(a in 0.0..50.0f64, b in 0.0..50.0f64) {
        let thresholds = StatusThresholds::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify_status(low, &thresholds) >= classify_status(high, &thresholds));
    }
}

#[test]
fn status_boundaries_inclusive() {
    let thresholds = StatusThresholds::default();
    assert_eq!(classify_status(5.0, &thresholds), InspectionStatus::ActionRequired);
    assert_eq!(classify_status(10.0, &thresholds), InspectionStatus::Monitor);
    assert_eq!(classify_status(10.000_001, &thresholds), InspectionStatus::Acceptable);
}

// ============================================================================
// Shell courses
// ============================================================================

proptest! {
    /// Governing course is the argmin of remaining life, ties to the lowest number.
    #[test]
    fn governing_is_argmin_lowest_number(lives in prop::collection::vec(prop::sample::select(vec![2.0, 4.5, 12.0, 30.0, 999.0]), 1..12)) {
        let courses: Vec<ShellCourse> = lives
            .iter()
            .enumerate()
            .map(|(i, life)| course(i as u8 + 1, *life))
            .collect();

        let governing = governing_course(&courses).unwrap();
        let min_life = lives.iter().cloned().fold(f64::INFINITY, f64::min);
        let expected = lives.iter().position(|l| *l == min_life).unwrap() as u8 + 1;
        prop_assert_eq!(governing.remaining_life, min_life);
        prop_assert_eq!(governing.course_number, expected);
    }
}

// ============================================================================
// Settlement
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A pure cosine survey is recovered exactly.
    #[test]
    fn cosine_fit_round_trip(
        amplitude in 0.01..2.0f64,
        phase in 0.0..360.0f64,
        baseline in -5.0..5.0f64,
        stations in 4usize..24,
        offset in 0.0..30.0f64,
    ) {
        let truth = CosineFit { amplitude, phase_deg: phase, baseline, r_squared: 1.0 };
        let points: Vec<SettlementPoint> = (0..stations)
            .map(|i| {
                let angle = offset + 360.0 * i as f64 / stations as f64;
                SettlementPoint::new(angle, truth.evaluate(Degrees(angle)))
            })
            .collect();

        let fit = fit_cosine(&points, 4).unwrap();
        prop_assert!((fit.amplitude - amplitude).abs() < 1e-7, "A {} vs {}", fit.amplitude, amplitude);
        prop_assert!(circular_difference(fit.phase_deg, phase) < 1e-5, "φ {} vs {}", fit.phase_deg, phase);
        prop_assert!((fit.baseline - baseline).abs() < 1e-7);
        prop_assert!((fit.r_squared - 1.0).abs() < 1e-7);
    }
}

// ============================================================================
// Pagination
// ============================================================================

fn block_strategy() -> impl Strategy<Value = ContentBlock> {
    prop_oneof![
        (0usize..45).prop_map(|n| ContentBlock::table(None, &["n"], (0..n).map(|i| vec![i.to_string()]).collect())),
        (1usize..12).prop_map(|n| ContentBlock::key_value((0..n).map(|i| (format!("k{}", i), "v")))),
        "[a-z ]{0,400}".prop_map(ContentBlock::paragraph),
        Just(ContentBlock::banner("Status", "MONITOR")),
    ]
}

fn section_strategy() -> impl Strategy<Value = ReportSection> {
    (prop::collection::vec(block_strategy(), 0..6), any::<bool>()).prop_map(|(blocks, new_page)| {
        let mut section = ReportSection::new("Section");
        section.extend(blocks);
        if new_page {
            section.starting_new_page()
        } else {
            section
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Pages match an independent first-fit-in-order packing with headings
    /// kept on the page of their first block.
    #[test]
    fn pagination_is_first_fit(sections in prop::collection::vec(section_strategy(), 0..8)) {
        let layout = PageLayout::letter();
        let limit = layout.page_height_pt - layout.bottom_margin_pt;

        let mut expected: Vec<(usize, f64)> = Vec::new();
        let mut page = 1;
        let mut offset = layout.top_margin_pt;
        for section in &sections {
            if section.starts_new_page && offset > layout.top_margin_pt {
                page += 1;
                offset = layout.top_margin_pt;
            }
            let heights: Vec<f64> = section.layout_blocks().iter().map(|b| b.height(&layout)).collect();
            for (i, height) in heights.iter().copied().enumerate() {
                // the heading is always the first block of a section
                let needed = match heights.get(i + 1) {
                    Some(next) if i == 0 && height + next <= layout.usable_height() => height + next,
                    _ => height,
                };
                if offset + needed > limit && offset > layout.top_margin_pt {
                    page += 1;
                    offset = layout.top_margin_pt;
                }
                expected.push((page, offset));
                offset += height;
            }
        }

        let document = ReportAssembler::new(layout.clone()).unwrap().assemble(&sections).unwrap();
        let actual: Vec<(usize, f64)> = document
            .pages
            .iter()
            .flat_map(|p| p.blocks.iter().map(move |b| (p.number, b.y_offset_pt)))
            .collect();

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(document.total_pages, page);
        for p in &document.pages {
            prop_assert_eq!(&p.footer.text, &format!("Page {} of {}", p.number, page));
        }
    }
}

// ============================================================================
// Reports built from unbounded input
// ============================================================================

fn sized_request(unassigned: usize, location_words: Vec<String>, bottom: usize, stations: usize) -> InspectionRequest {
    let mut request = InspectionRequest::new("T-PROP");
    request.tank.age_years = Some(RawField::Number(12.0));
    request.tank.inspector = Some(location_words.join(" "));
    request.measurements.push(
        RawMeasurement::new("Shell", format!("Course 1 {}", location_words.join(" ")), "shell")
            .with_original(0.500)
            .with_current(0.440),
    );
    for i in 0..unassigned {
        request.measurements.push(
            RawMeasurement::new("Shell", format!("Nozzle N{} {}", i, location_words.join(" ")), "shell")
                .with_original(0.500)
                .with_current(0.480),
        );
    }
    for i in 0..bottom {
        request.measurements.push(
            RawMeasurement::new("Bottom", format!("Grid {}", i), "bottom")
                .with_original(0.250)
                .with_current(0.235),
        );
    }
    if stations > 0 {
        let points = (0..stations)
            .map(|i| {
                let angle = 360.0 * i as f64 / stations as f64;
                RawSettlementPoint::new(angle, 0.3 * angle.to_radians().cos())
            })
            .collect();
        request.settlement = Some(RawSettlementSurvey {
            points,
            allowable_settlement_in: None,
        });
    }
    request
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Every block built from caller data fits a page under each preset.
    #[test]
    fn sections_always_fit_a_page(
        unassigned in 0usize..400,
        location_words in prop::collection::vec("[a-z]{1,120}", 0..200),
        bottom in 0usize..300,
        stations in 0usize..200,
    ) {
        let request = sized_request(unassigned, location_words, bottom, stations);
        let analysis = analyze_inspection(&request, &AnalysisPolicy::default()).unwrap();

        for layout in [PageLayout::letter(), PageLayout::a4(), PageLayout::compact()] {
            let sections = build_sections(&analysis, &layout);
            let document = ReportAssembler::new(layout.clone()).unwrap().assemble(&sections);
            prop_assert!(document.is_ok(), "{}: {:?}", layout.name, document.as_ref().err());

            let limit = layout.page_height_pt - layout.bottom_margin_pt;
            if let Ok(document) = document {
                for block in document.blocks() {
                    prop_assert!(block.y_offset_pt + block.height_pt <= limit + 1e-9);
                }
            }
        }
    }
}
