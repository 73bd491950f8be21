//! Week progression for training blocks.
//!
//! This module computes the effective exertion and set count for one week
//! of a block:
//! - Maintenance: flat, every week equals the baseline
//! - Peaking: +0.5 exertion per build week (capped at 9), then a deload
//!   week at baseline with 70% of the sets, then a peak week at 9.5 with
//!   half the sets
//!
//! The planner holds no week state. Callers pass the week they want.

use crate::load::predict_load;
use crate::rpe_table::clamp_exertion;
use crate::{BlockGoal, ExerciseTarget, TrainingBlock, WeeklyTargets};
use serde::{Deserialize, Serialize};

/// Exertion step per build week
const BUILD_STEP: f64 = 0.5;

/// Highest exertion a build week may reach
const BUILD_CAP: f64 = 9.0;

/// Fixed exertion of the peak week
pub const PEAK_EXERTION: f64 = 9.5;

const DELOAD_SET_FACTOR: f64 = 0.7;
const PEAK_SET_FACTOR: f64 = 0.5;

/// Round to the nearest half point
fn round_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

fn scaled_sets(sets: u32, factor: f64) -> u32 {
    ((sets as f64 * factor).round() as u32).max(1)
}

/// Effective targets for `week` of a block
///
/// `week` is clamped into `1..=total_weeks` and the baseline into 6..=10.
/// With two weeks or fewer a peaking block has no deload week.
pub fn weekly_targets(
    target: &ExerciseTarget,
    week: u32,
    total_weeks: u32,
    goal: BlockGoal,
) -> WeeklyTargets {
    let baseline = clamp_exertion(target.baseline_exertion);
    let base_sets = target.set_count.max(1);

    if goal == BlockGoal::Maintenance {
        return WeeklyTargets {
            effective_exertion: baseline,
            effective_set_count: base_sets,
            is_deload_week: false,
            is_peak_week: false,
        };
    }

    let total_weeks = total_weeks.max(1);
    let w = week.clamp(1, total_weeks);

    if total_weeks > 2 && w == total_weeks - 1 {
        return WeeklyTargets {
            effective_exertion: baseline,
            effective_set_count: scaled_sets(base_sets, DELOAD_SET_FACTOR),
            is_deload_week: true,
            is_peak_week: false,
        };
    }

    if w == total_weeks {
        return WeeklyTargets {
            effective_exertion: PEAK_EXERTION,
            effective_set_count: scaled_sets(base_sets, PEAK_SET_FACTOR),
            is_deload_week: false,
            is_peak_week: true,
        };
    }

    let ramped = baseline + (w - 1) as f64 * BUILD_STEP;
    WeeklyTargets {
        effective_exertion: round_half(ramped).min(BUILD_CAP),
        effective_set_count: base_sets,
        is_deload_week: false,
        is_peak_week: false,
    }
}

/// Targets for every week of a block, week 1 first
pub fn block_outline(
    target: &ExerciseTarget,
    total_weeks: u32,
    goal: BlockGoal,
) -> Vec<(u32, WeeklyTargets)> {
    (1..=total_weeks.max(1))
        .map(|week| (week, weekly_targets(target, week, total_weeks, goal)))
        .collect()
}

/// Summary of the week after the block's current week
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekPreview {
    pub week: u32,
    pub effective_exertion: f64,
    pub is_deload_week: bool,
    pub is_peak_week: bool,
    /// Suggested load for the representative exercise, if its 1RM is known
    pub example_load: Option<f64>,
}

/// Preview next week using the block's first exercise as representative
///
/// Returns `None` when the block has no exercises or next week would run
/// past the end of the block.
pub fn next_week_preview(block: &TrainingBlock) -> Option<WeekPreview> {
    let next_week = block.current_week.max(1) + 1;
    if next_week > block.total_weeks {
        return None;
    }

    let first = block.sessions.first()?.exercises.first()?;
    let targets = weekly_targets(&first.target, next_week, block.total_weeks, block.goal);

    Some(WeekPreview {
        week: next_week,
        effective_exertion: targets.effective_exertion,
        is_deload_week: targets.is_deload_week,
        is_peak_week: targets.is_peak_week,
        example_load: predict_load(
            first.target.one_rep_max,
            first.target.target_reps,
            targets.effective_exertion,
        ),
    })
}
