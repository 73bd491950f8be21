//! Core domain types for the RPE planner.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise targets and their per-week derivations
//! - Performed sets and session records
//! - Training blocks (the multi-week program a lifter follows)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Prescription Types
// ============================================================================

/// Goal of a training block; selects the week progression formula
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockGoal {
    /// Ramp exertion toward a deload and a final peak week
    #[default]
    Peaking,
    /// Flat prescription every week
    Maintenance,
}

impl BlockGoal {
    /// Parse a goal name, accepting the lowercase serialized form
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "peaking" | "peak" => Some(BlockGoal::Peaking),
            "maintenance" | "maintain" => Some(BlockGoal::Maintenance),
            _ => None,
        }
    }
}

/// Steady-state prescription for one exercise
///
/// `baseline_exertion` is the week-1 anchor for progression, not the
/// exertion prescribed for the current week.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTarget {
    /// Kilograms; 0 means unknown
    pub one_rep_max: f64,
    pub target_reps: u32,
    pub baseline_exertion: f64,
    pub set_count: u32,
}

/// This week's effective prescription for one exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyTargets {
    pub effective_exertion: f64,
    pub effective_set_count: u32,
    pub is_deload_week: bool,
    pub is_peak_week: bool,
}

// ============================================================================
// Session Types
// ============================================================================

/// One set as entered during a session
///
/// `None` and zero are both treated as "not entered".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PerformedSet {
    pub id: Uuid,
    pub load: Option<f64>,
    pub reps: Option<u32>,
    pub reported_exertion: Option<f64>,
    #[serde(default)]
    pub completed: bool,
}

impl PerformedSet {
    pub fn new(load: Option<f64>, reps: Option<u32>, reported_exertion: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            load,
            reps,
            reported_exertion,
            completed: false,
        }
    }

    /// Load if entered and positive
    pub fn entered_load(&self) -> Option<f64> {
        self.load.filter(|l| l.is_finite() && *l > 0.0)
    }

    /// Reps if entered and at least one
    pub fn entered_reps(&self) -> Option<u32> {
        self.reps.filter(|r| *r >= 1)
    }

    /// Reported exertion if entered and non-zero
    pub fn entered_exertion(&self) -> Option<f64> {
        self.reported_exertion.filter(|e| e.is_finite() && *e != 0.0)
    }
}

/// Lifecycle status of a session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// One exercise inside a session: the target snapshot plus logged sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedExercise {
    pub exercise_id: Uuid,
    pub name: String,
    /// Snapshot of the block's target when the session started
    pub target: ExerciseTarget,
    /// Effective exertion for the session's week
    pub target_exertion: f64,
    /// Added for this session only, not part of the block
    #[serde(default)]
    pub temporary: bool,
    pub sets: Vec<PerformedSet>,
}

/// A training session, from start through completion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub program_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub session_name: String,
    pub session_index: usize,
    pub week_number: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub status: SessionStatus,
    pub exercises: Vec<LoggedExercise>,
}

// ============================================================================
// Training Block Types
// ============================================================================

/// An exercise as planned in a block's session template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub id: Uuid,
    pub name: String,
    pub target: ExerciseTarget,
}

/// A named session in the block's rotation (e.g. "Training A")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionTemplate {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

/// A multi-week periodized program with a single goal
///
/// `current_week` and `current_index` are owned here and only advanced by
/// session completion; the planner never touches them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingBlock {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub goal: BlockGoal,
    pub total_weeks: u32,
    pub start_exertion: f64,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default = "default_current_week")]
    pub current_week: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub sessions: Vec<SessionTemplate>,
}

fn default_current_week() -> u32 {
    1
}

/// Result of completing a session against its block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationOutcome {
    /// True when this completion finished every session of the week
    pub rotation_completed: bool,
    pub previous_week: u32,
    pub new_week: u32,
}
