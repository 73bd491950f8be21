//! Post-session feedback.
//!
//! Reduces a completed session to an adherence category and total volume,
//! and optionally a message about the week that follows.

use crate::progression::weekly_targets;
use crate::{SessionRecord, TrainingBlock};
use serde::{Deserialize, Serialize};

/// Exertion gap at which a set counts as pushed or underperformed
const OUTCOME_GAP: f64 = 2.0;

/// Share of underperformed sets that makes the session severe
const SEVERE_RATIO: f64 = 0.5;

/// Most underperformed sets still treated as a mild miss
const MILD_MAX_SETS: usize = 2;

/// How a single set compared to its target exertion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOutcome {
    Pushed,
    Underperformed,
    OnTarget,
}

/// Outcome of one set from its reported and target exertion
pub fn set_outcome(reported: f64, target: f64) -> SetOutcome {
    let deviation = reported - target;
    if deviation >= OUTCOME_GAP {
        SetOutcome::Pushed
    } else if deviation <= -OUTCOME_GAP {
        SetOutcome::Underperformed
    } else {
        SetOutcome::OnTarget
    }
}

/// Overall verdict for a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    SevereUnderperformance,
    MildUnderperformance,
    Overreach,
    AdherenceSuccess,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
    Good,
    Warn,
    Bad,
}

impl FeedbackCategory {
    pub fn tone(&self) -> FeedbackTone {
        match self {
            FeedbackCategory::SevereUnderperformance => FeedbackTone::Bad,
            FeedbackCategory::MildUnderperformance | FeedbackCategory::Overreach => {
                FeedbackTone::Warn
            }
            FeedbackCategory::AdherenceSuccess => FeedbackTone::Good,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            FeedbackCategory::SevereUnderperformance => "UNDERPOWERED SESSION",
            FeedbackCategory::MildUnderperformance => "Almost there",
            FeedbackCategory::Overreach => "You pushed it",
            FeedbackCategory::AdherenceSuccess => "Strong session",
        }
    }
}

/// Set counts that fed the classification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub counted: usize,
    pub pushed: usize,
    pub underperformed: usize,
    pub on_target: usize,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: SetOutcome) {
        self.counted += 1;
        match outcome {
            SetOutcome::Pushed => self.pushed += 1,
            SetOutcome::Underperformed => self.underperformed += 1,
            SetOutcome::OnTarget => self.on_target += 1,
        }
    }

    /// Share of counted sets that were underperformed; 0 with no sets
    pub fn underperformed_ratio(&self) -> f64 {
        if self.counted == 0 {
            return 0.0;
        }
        self.underperformed as f64 / self.counted as f64
    }

    /// Category in priority order: severe, mild, overreach, success
    pub fn category(&self) -> FeedbackCategory {
        if self.underperformed_ratio() >= SEVERE_RATIO {
            FeedbackCategory::SevereUnderperformance
        } else if (1..=MILD_MAX_SETS).contains(&self.underperformed) {
            FeedbackCategory::MildUnderperformance
        } else if self.pushed > self.on_target && self.pushed > 0 {
            FeedbackCategory::Overreach
        } else {
            FeedbackCategory::AdherenceSuccess
        }
    }
}

/// Everything shown to the lifter after completing a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionFeedback {
    pub category: FeedbackCategory,
    pub tone: FeedbackTone,
    pub headline: String,
    pub body: String,
    pub counts: OutcomeCounts,
    /// Sum of load x reps, rounded to a whole number
    pub volume: f64,
    pub week_message: Option<String>,
}

/// Count set outcomes across a session
///
/// Sets without a reported exertion, or in an exercise without a target
/// exertion, are skipped rather than counted as misses.
pub fn count_outcomes(session: &SessionRecord) -> OutcomeCounts {
    let mut counts = OutcomeCounts::default();
    for exercise in &session.exercises {
        if exercise.target_exertion == 0.0 || !exercise.target_exertion.is_finite() {
            continue;
        }
        for set in &exercise.sets {
            if let Some(reported) = set.entered_exertion() {
                counts.record(set_outcome(reported, exercise.target_exertion));
            }
        }
    }
    counts
}

/// Total volume over every set with both load and reps entered
///
/// Completion and exertion are ignored.
pub fn session_volume(session: &SessionRecord) -> f64 {
    session
        .exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter_map(|s| Some(s.entered_load()? * s.entered_reps()? as f64))
        .sum()
}

fn body_for(category: FeedbackCategory, counts: &OutcomeCounts) -> String {
    match category {
        FeedbackCategory::SevereUnderperformance => "You trained too light across the board. \
            Add weight or be honest about your RPE. Strength is not built by sparing yourself."
            .to_string(),
        FeedbackCategory::MildUnderperformance => {
            if counts.underperformed == 1 {
                "1 set was too light. Stick to the plan next time.".to_string()
            } else {
                format!(
                    "{} sets were too light. Stick to the plan next time.",
                    counts.underperformed
                )
            }
        }
        FeedbackCategory::Overreach => "You trained harder than planned. Fine if it was deliberate, \
            but watch out for overtraining in the long run."
            .to_string(),
        FeedbackCategory::AdherenceSuccess => {
            "You stuck to the plan. Consistency is the foundation of strength.".to_string()
        }
    }
}

/// Message about the week after `completed_week`
///
/// Uses the block's first exercise as representative. `None` when that
/// exercise does not exist and the block is not finished.
pub fn week_transition_message(block: &TrainingBlock, completed_week: u32) -> Option<String> {
    let next_week = completed_week + 1;
    if next_week > block.total_weeks {
        return Some(format!(
            "Block finished after {} weeks. Time for a test or a new block.",
            block.total_weeks
        ));
    }

    let first = block.sessions.first()?.exercises.first()?;
    let next = weekly_targets(&first.target, next_week, block.total_weeks, block.goal);

    let message = if next.is_deload_week {
        format!(
            "Week {} done. Next week: DELOAD, RPE {}, {} sets.",
            completed_week, next.effective_exertion, next.effective_set_count
        )
    } else if next.is_peak_week {
        format!(
            "Week {} done. Next week: PEAK WEEK, leave nothing in the tank.",
            completed_week
        )
    } else {
        format!(
            "Week {} done. Next week: RPE {}.",
            completed_week, next.effective_exertion
        )
    };
    Some(message)
}

/// Classify a session and build its feedback
///
/// `rotation_completed` comes from the caller's rotation bookkeeping; only
/// then, and only with a block, is a week message produced.
pub fn classify_session(
    session: &SessionRecord,
    rotation_completed: bool,
    block: Option<&TrainingBlock>,
) -> SessionFeedback {
    let counts = count_outcomes(session);
    let category = counts.category();

    let week_message = match block {
        Some(block) if rotation_completed => {
            week_transition_message(block, session.week_number)
        }
        _ => None,
    };

    tracing::debug!(
        "Session {} classified as {:?} ({:?})",
        session.id,
        category,
        counts
    );

    SessionFeedback {
        category,
        tone: category.tone(),
        headline: category.headline().to_string(),
        body: body_for(category, &counts),
        counts,
        volume: session_volume(session).round(),
        week_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockGoal, ExerciseTarget, LoggedExercise, PerformedSet, SessionStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn target() -> ExerciseTarget {
        ExerciseTarget {
            one_rep_max: 140.0,
            target_reps: 3,
            baseline_exertion: 7.5,
            set_count: 4,
        }
    }

    fn session_with(target_exertion: f64, sets: Vec<PerformedSet>) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            program_id: None,
            template_id: None,
            session_name: "Training A".into(),
            session_index: 0,
            week_number: 4,
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            status: SessionStatus::Completed,
            exercises: vec![LoggedExercise {
                exercise_id: Uuid::new_v4(),
                name: "Back Squat".into(),
                target: target(),
                target_exertion,
                temporary: false,
                sets,
            }],
        }
    }

    fn rated(exertions: &[f64]) -> Vec<PerformedSet> {
        exertions
            .iter()
            .map(|e| PerformedSet::new(Some(100.0), Some(3), Some(*e)))
            .collect()
    }

    fn block(total_weeks: u32) -> TrainingBlock {
        let mut block = TrainingBlock::new("Peak", BlockGoal::Peaking, total_weeks, 7.5);
        let a = block.add_session("Training A");
        block.add_exercise(a, "Back Squat", target()).unwrap();
        block
    }

    #[test]
    fn test_set_outcome_thresholds() {
        assert_eq!(set_outcome(10.0, 8.0), SetOutcome::Pushed);
        assert_eq!(set_outcome(9.5, 8.0), SetOutcome::OnTarget);
        assert_eq!(set_outcome(6.0, 8.0), SetOutcome::Underperformed);
        assert_eq!(set_outcome(6.5, 8.0), SetOutcome::OnTarget);
    }

    #[test]
    fn test_severe_wins_over_pushed() {
        // 3 of 6 underperformed, 3 pushed
        let session = session_with(8.0, rated(&[6.0, 6.0, 5.5, 10.0, 10.0, 10.0]));
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.category, FeedbackCategory::SevereUnderperformance);
        assert_eq!(feedback.tone, FeedbackTone::Bad);
        assert_eq!(feedback.counts.counted, 6);
        assert_eq!(feedback.counts.pushed, 3);
    }

    #[test]
    fn test_mild_underperformance() {
        let session = session_with(8.0, rated(&[6.0, 8.0, 8.0, 8.5]));
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.category, FeedbackCategory::MildUnderperformance);
        assert!(feedback.body.starts_with("1 set was"));

        let session = session_with(8.0, rated(&[6.0, 6.0, 8.0, 8.0, 8.0]));
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.category, FeedbackCategory::MildUnderperformance);
        assert!(feedback.body.starts_with("2 sets were"));
    }

    #[test]
    fn test_three_light_sets_below_ratio_are_not_mild() {
        // 3 of 7 underperformed: ratio < 0.5 and count > 2
        let session = session_with(8.0, rated(&[6.0, 6.0, 6.0, 8.0, 8.0, 8.0, 8.0]));
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.category, FeedbackCategory::AdherenceSuccess);
    }

    #[test]
    fn test_overreach() {
        let session = session_with(7.0, rated(&[9.0, 9.5, 7.0]));
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.category, FeedbackCategory::Overreach);
        assert_eq!(feedback.tone, FeedbackTone::Warn);
    }

    #[test]
    fn test_pushed_tie_is_success() {
        let session = session_with(7.0, rated(&[9.0, 7.0]));
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.category, FeedbackCategory::AdherenceSuccess);
    }

    #[test]
    fn test_sets_without_exertion_are_skipped() {
        let mut sets = rated(&[8.0]);
        sets.push(PerformedSet::new(Some(100.0), Some(3), None));
        sets.push(PerformedSet::new(Some(100.0), Some(3), Some(0.0)));
        let session = session_with(8.0, sets);
        let counts = count_outcomes(&session);
        assert_eq!(counts.counted, 1);

        let no_target = session_with(0.0, rated(&[5.0, 5.0]));
        let feedback = classify_session(&no_target, false, None);
        assert_eq!(feedback.counts.counted, 0);
        assert_eq!(feedback.category, FeedbackCategory::AdherenceSuccess);
    }

    #[test]
    fn test_volume_ignores_missing_values() {
        let sets = vec![
            PerformedSet::new(Some(100.0), Some(5), None),
            PerformedSet::new(Some(0.0), Some(5), None),
            PerformedSet::new(None, Some(5), Some(8.0)),
        ];
        let session = session_with(8.0, sets);
        let feedback = classify_session(&session, false, None);
        assert_eq!(feedback.volume, 500.0);
    }

    #[test]
    fn test_volume_counts_incomplete_sets() {
        let mut sets = rated(&[8.0, 8.0]);
        sets[0].completed = true;
        let session = session_with(8.0, sets);
        assert_eq!(session_volume(&session), 600.0);
    }

    #[test]
    fn test_no_week_message_without_rotation() {
        let session = session_with(8.0, rated(&[8.0]));
        let b = block(6);
        assert!(classify_session(&session, false, Some(&b)).week_message.is_none());
        assert!(classify_session(&session, true, None).week_message.is_none());
    }

    #[test]
    fn test_week_message_deload() {
        // Week 4 of 6 done, week 5 is the deload
        let session = session_with(9.0, rated(&[9.0]));
        let feedback = classify_session(&session, true, Some(&block(6)));
        assert_eq!(
            feedback.week_message.as_deref(),
            Some("Week 4 done. Next week: DELOAD, RPE 7.5, 3 sets.")
        );
    }

    #[test]
    fn test_week_message_peak_and_build() {
        let mut session = session_with(9.0, rated(&[9.0]));
        session.week_number = 5;
        let msg = classify_session(&session, true, Some(&block(6))).week_message.unwrap();
        assert!(msg.contains("PEAK WEEK"));

        session.week_number = 1;
        let msg = classify_session(&session, true, Some(&block(6))).week_message.unwrap();
        assert_eq!(msg, "Week 1 done. Next week: RPE 8.");
    }

    #[test]
    fn test_week_message_block_finished() {
        let mut session = session_with(9.5, rated(&[9.5]));
        session.week_number = 6;
        let msg = classify_session(&session, true, Some(&block(6))).week_message.unwrap();
        assert_eq!(msg, "Block finished after 6 weeks. Time for a test or a new block.");
    }

    #[test]
    fn test_week_message_without_exercises() {
        let empty = TrainingBlock::new("Empty", BlockGoal::Peaking, 6, 7.5);
        assert!(week_transition_message(&empty, 2).is_none());
        assert!(week_transition_message(&empty, 6).is_some());
    }
}
