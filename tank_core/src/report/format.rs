//! Numeric display rules shared by every report section.
//!
//! Thickness 3 dp, corrosion rate 4 dp, remaining life 1 dp. Remaining life at
//! or above the sentinel shows as `999`. Non-finite values never reach output.

use chrono::NaiveDate;

use crate::config::REMAINING_LIFE_SENTINEL;
use crate::units::{Feet, Inches};

/// Shown for absent values
pub const NOT_AVAILABLE: &str = "N/A";

fn fixed(value: f64, places: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", places, value)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Thickness in inches, 3 dp
pub fn thickness(value: f64) -> String {
    fixed(value, 3)
}

pub fn thickness_opt(value: Option<Inches>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |t| thickness(t.0))
}

/// Corrosion rate in in/yr, 4 dp
pub fn rate(value: f64) -> String {
    fixed(value, 4)
}

pub fn rate_opt(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), rate)
}

/// Remaining life in years, 1 dp; the sentinel and anything above it shows as `999`
pub fn remaining_life(value: f64) -> String {
    if !value.is_finite() || value >= REMAINING_LIFE_SENTINEL {
        format!("{}", REMAINING_LIFE_SENTINEL as i64)
    } else {
        fixed(value, 1)
    }
}

/// Settlement or elevation in inches, 3 dp
pub fn settlement(value: f64) -> String {
    fixed(value, 3)
}

pub fn settlement_opt(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), settlement)
}

pub fn feet_opt(value: Option<Feet>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |f| format!("{} ft", fixed(f.0, 1)))
}

/// Angle in degrees, 1 dp
pub fn degrees(value: f64) -> String {
    format!("{}°", fixed(value, 1))
}

/// Whole gallons with thousands separators
pub fn gallons(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let whole = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{} gal", sign, grouped)
}

pub fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn text_opt(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}
