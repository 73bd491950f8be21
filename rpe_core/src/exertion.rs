//! Exertion estimation from performed sets.
//!
//! This module covers the reverse direction of load prediction:
//! - 1RM estimation from a load/rep pair
//! - Implied exertion from load, reps and a known 1RM (inverse table lookup)
//! - Two independent deviation policies used by set feedback
//! - The set edit reducer that keeps implied exertion live while typing

use crate::rpe_table::{self, ExertionLoadRow};
use crate::{ExerciseTarget, PerformedSet};
use serde::{Deserialize, Serialize};

/// Per-rep coefficient of the linear 1RM extrapolation
const E1RM_REP_COEFFICIENT: f64 = 0.0333;

/// Gap between target and actual exertion that raises the underperformance flag
pub const UNDERPERFORMANCE_GAP: f64 = 2.0;

/// Three-way classification of actual vs. target exertion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExertionDeviation {
    /// Within 0.5 of target
    OnTarget,
    /// Within 1.5 of target
    ModerateDeviation,
    /// More than 1.5 away
    LargeDeviation,
}

/// Estimate a one-rep max from a performed set
///
/// A single rep is its own estimate. Otherwise the estimate is
/// `round(load * (1 + reps * 0.0333))`. Returns `None` for a missing or
/// non-positive load or zero reps.
pub fn estimate_one_rep_max(load: f64, reps: u32) -> Option<f64> {
    if !load.is_finite() || load <= 0.0 || reps < 1 {
        return None;
    }
    if reps == 1 {
        return Some(load);
    }
    Some((load * (1.0 + reps as f64 * E1RM_REP_COEFFICIENT)).round())
}

/// Exertion level whose table fraction is closest to `load / one_rep_max`
///
/// Only the five table levels can come back. Rows are searched lowest
/// exertion first and the first minimal difference wins, so an exact tie
/// resolves to the lower level.
pub fn infer_exertion(load: f64, reps: u32, one_rep_max: f64) -> Option<u8> {
    if !one_rep_max.is_finite() || one_rep_max <= 0.0 {
        return None;
    }
    if !load.is_finite() || load <= 0.0 || reps < 1 {
        return None;
    }

    let fraction = load / one_rep_max;
    let rep_index = (rpe_table::table_reps(reps) - 1) as usize;

    nearest_level(rpe_table::rows(), fraction, rep_index).map(|level| level as u8)
}

fn nearest_level<'a>(
    rows: impl IntoIterator<Item = (i32, &'a ExertionLoadRow)>,
    fraction: f64,
    rep_index: usize,
) -> Option<i32> {
    let mut best: Option<(i32, f64)> = None;
    for (level, row) in rows {
        let diff = (row[rep_index] - fraction).abs();
        let closer = match best {
            Some((_, best_diff)) => diff < best_diff,
            None => true,
        };
        if closer {
            best = Some((level, diff));
        }
    }
    best.map(|(level, _)| level)
}

/// Classify how far an actual exertion landed from its target
///
/// Returns `None` if either value is missing or zero.
pub fn classify_exertion_deviation(
    actual: Option<f64>,
    target: Option<f64>,
) -> Option<ExertionDeviation> {
    let actual = actual.filter(|a| *a != 0.0)?;
    let target = target.filter(|t| *t != 0.0)?;

    let diff = (actual - target).abs();
    if diff <= 0.5 {
        Some(ExertionDeviation::OnTarget)
    } else if diff <= 1.5 {
        Some(ExertionDeviation::ModerateDeviation)
    } else {
        Some(ExertionDeviation::LargeDeviation)
    }
}

/// Per-set warning: the set felt at least two points easier than prescribed
///
/// This is one-directional and separate from [`classify_exertion_deviation`].
pub fn is_underperforming(actual: Option<f64>, target: f64) -> bool {
    match actual {
        Some(actual) if actual.is_finite() => target - actual >= UNDERPERFORMANCE_GAP,
        _ => false,
    }
}

/// Largest shortfall below target across the flagged sets, rounded
///
/// `None` when no set trips [`is_underperforming`].
pub fn exertion_shortfall(sets: &[PerformedSet], target: f64) -> Option<u32> {
    sets.iter()
        .filter(|s| is_underperforming(s.reported_exertion, target))
        .filter_map(|s| s.reported_exertion)
        .map(|actual| target - actual)
        .fold(None, |max: Option<f64>, gap| Some(max.map_or(gap, |m| m.max(gap))))
        .map(|gap| gap.round() as u32)
}

/// A single field edit on a performed set
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SetEdit {
    Load(Option<f64>),
    Reps(Option<u32>),
    Exertion(Option<f64>),
    Completed(bool),
}

/// Apply an edit and return the updated set
///
/// Changing load or reps re-infers exertion when the 1RM is known and both
/// values are entered. If inference has no answer the old exertion stays.
pub fn apply_set_edit(set: &PerformedSet, edit: SetEdit, target: &ExerciseTarget) -> PerformedSet {
    let mut next = set.clone();
    match edit {
        SetEdit::Load(load) => next.load = load,
        SetEdit::Reps(reps) => next.reps = reps,
        SetEdit::Exertion(exertion) => {
            next.reported_exertion = exertion;
            return next;
        }
        SetEdit::Completed(done) => {
            next.completed = done;
            return next;
        }
    }

    if target.one_rep_max > 0.0 {
        if let (Some(load), Some(reps)) = (next.entered_load(), next.entered_reps()) {
            if let Some(implied) = infer_exertion(load, reps, target.one_rep_max) {
                tracing::debug!(
                    "Re-inferred exertion {} from {} x {} @ 1RM {}",
                    implied,
                    load,
                    reps,
                    target.one_rep_max
                );
                next.reported_exertion = Some(f64::from(implied));
            }
        }
    }

    next
}
