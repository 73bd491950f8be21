//! Static %1RM lookup by perceived exertion and repetitions.
//!
//! Each row covers reps 1..=10 for one integer exertion level (6..=10).
//! Within a row the fraction falls as reps rise; for a fixed rep count the
//! fraction falls as exertion falls.

/// Percentages of 1RM for one exertion level, indexed by `reps - 1`
pub type ExertionLoadRow = [f64; 10];

pub const MIN_EXERTION: i32 = 6;
pub const MAX_EXERTION: i32 = 10;
pub const MAX_TABLE_REPS: u32 = 10;

/// Row used when a level has no entry
pub const FALLBACK_EXERTION: i32 = 8;

/// Rows in ascending exertion order; inverse lookup relies on this order
static RPE_TABLE: [(i32, ExertionLoadRow); 5] = [
    (6, [0.863, 0.837, 0.811, 0.786, 0.762, 0.739, 0.707, 0.680, 0.653, 0.626]),
    (7, [0.892, 0.863, 0.837, 0.811, 0.786, 0.762, 0.739, 0.707, 0.680, 0.653]),
    (8, [0.922, 0.892, 0.863, 0.837, 0.811, 0.786, 0.762, 0.739, 0.707, 0.680]),
    (9, [0.955, 0.922, 0.892, 0.863, 0.837, 0.811, 0.786, 0.762, 0.739, 0.707]),
    (10, [1.000, 0.955, 0.922, 0.892, 0.863, 0.837, 0.811, 0.786, 0.762, 0.739]),
];

/// All canonical rows, lowest exertion first
pub fn rows() -> impl Iterator<Item = (i32, &'static ExertionLoadRow)> {
    RPE_TABLE.iter().map(|(level, row)| (*level, row))
}

/// Row for an integer exertion level, falling back to the RPE 8 row
pub fn row_for(level: i32) -> &'static ExertionLoadRow {
    RPE_TABLE
        .iter()
        .find(|(l, _)| *l == level)
        .or_else(|| RPE_TABLE.iter().find(|(l, _)| *l == FALLBACK_EXERTION))
        .map(|(_, row)| row)
        .unwrap_or(&RPE_TABLE[2].1)
}

/// Round a caller-supplied exertion to the nearest table level
///
/// Non-finite input maps to the fallback level.
pub fn exertion_level(exertion: f64) -> i32 {
    if !exertion.is_finite() {
        return FALLBACK_EXERTION;
    }
    exertion
        .clamp(MIN_EXERTION as f64, MAX_EXERTION as f64)
        .round() as i32
}

/// Clamp a fractional exertion into 6..=10 without rounding it
///
/// Non-finite input maps to the fallback level.
pub fn clamp_exertion(exertion: f64) -> f64 {
    if !exertion.is_finite() {
        return FALLBACK_EXERTION as f64;
    }
    exertion.clamp(MIN_EXERTION as f64, MAX_EXERTION as f64)
}

/// Clamp reps into the table's 1..=10 range
pub fn table_reps(reps: u32) -> u32 {
    reps.clamp(1, MAX_TABLE_REPS)
}

/// Fraction of 1RM for an exertion level and rep count
///
/// Levels outside the table use the RPE 8 row; reps are clamped to 1..=10.
pub fn percentage_for(exertion_level: i32, reps: u32) -> f64 {
    let row = row_for(exertion_level);
    row[(table_reps(reps) - 1) as usize]
}
