//! Training block and session lifecycle.
//!
//! A session is materialized from the block's rotation: the planner gives
//! this week's targets, the load predictor a suggested load per set. Sets
//! are then edited one field at a time until the session is completed,
//! which advances the block's rotation and, at the end of a rotation, its
//! week.

use crate::exertion::{apply_set_edit, infer_exertion, SetEdit};
use crate::load::predict_load;
use crate::progression::weekly_targets;
use crate::rpe_table::{clamp_exertion, MAX_EXERTION, MIN_EXERTION};
use crate::{
    BlockGoal, Error, ExerciseTarget, LoggedExercise, PerformedSet, PlannedExercise, Result,
    RotationOutcome, SessionRecord, SessionStatus, SessionTemplate, TrainingBlock,
};
use chrono::NaiveDate;
use uuid::Uuid;

impl TrainingBlock {
    /// Create an empty block starting at week 1
    pub fn new(name: &str, goal: BlockGoal, total_weeks: u32, start_exertion: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            goal,
            total_weeks: total_weeks.max(1),
            start_exertion: start_exertion.clamp(MIN_EXERTION as f64, MAX_EXERTION as f64),
            current_index: 0,
            current_week: 1,
            active: false,
            sessions: Vec::new(),
        }
    }

    /// Append a session template to the rotation and return its id
    pub fn add_session(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.push(SessionTemplate {
            id,
            name: name.to_string(),
            exercises: Vec::new(),
        });
        id
    }

    /// Add an exercise to one of the block's sessions
    pub fn add_exercise(
        &mut self,
        session_id: Uuid,
        name: &str,
        target: ExerciseTarget,
    ) -> Result<Uuid> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| Error::Program(format!("No session {} in block", session_id)))?;

        let id = Uuid::new_v4();
        session.exercises.push(PlannedExercise {
            id,
            name: name.to_string(),
            target,
        });
        Ok(id)
    }

    /// Exercise target prescribed at the block's start exertion
    pub fn exercise_target(&self, one_rep_max: f64, target_reps: u32, set_count: u32) -> ExerciseTarget {
        ExerciseTarget {
            one_rep_max: one_rep_max.max(0.0),
            target_reps: target_reps.max(1),
            baseline_exertion: self.start_exertion,
            set_count: set_count.max(1),
        }
    }

    /// Find a session template by name, case-insensitively
    pub fn session_named(&self, name: &str) -> Option<&SessionTemplate> {
        self.sessions
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Check the block for problems that would make sessions meaningless
    ///
    /// Returns a list of human-readable problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Block has empty name".to_string());
        }
        if self.total_weeks == 0 {
            errors.push(format!("Block '{}' has zero weeks", self.name));
        }
        if self.sessions.is_empty() {
            errors.push(format!("Block '{}' has no sessions", self.name));
        }

        for session in &self.sessions {
            if session.exercises.is_empty() {
                errors.push(format!("Session '{}' has no exercises", session.name));
            }
            for exercise in &session.exercises {
                let t = &exercise.target;
                if t.target_reps < 1 {
                    errors.push(format!("Exercise '{}' has zero target reps", exercise.name));
                }
                if t.set_count < 1 {
                    errors.push(format!("Exercise '{}' has zero sets", exercise.name));
                }
                if !(MIN_EXERTION as f64..=MAX_EXERTION as f64).contains(&t.baseline_exertion) {
                    errors.push(format!(
                        "Exercise '{}': baseline exertion {} outside {}..={}",
                        exercise.name, t.baseline_exertion, MIN_EXERTION, MAX_EXERTION
                    ));
                }
                if t.one_rep_max < 0.0 {
                    errors.push(format!("Exercise '{}' has negative 1RM", exercise.name));
                }
            }
        }

        errors
    }

    /// Materialize the next session in the rotation for the current week
    ///
    /// Returns `None` when the block has no sessions. Callers must check
    /// [`active_session`] first; this does not enforce a single active
    /// session.
    pub fn start_session(&self, date: NaiveDate) -> Option<SessionRecord> {
        if self.sessions.is_empty() {
            return None;
        }

        let session_index = self.current_index % self.sessions.len();
        let template = &self.sessions[session_index];
        let week = self.current_week.max(1);

        let exercises = template
            .exercises
            .iter()
            .map(|planned| self.logged_exercise(planned, week))
            .collect();

        tracing::info!(
            "Starting '{}' (week {} of {}) in block '{}'",
            template.name,
            week,
            self.total_weeks,
            self.name
        );

        Some(SessionRecord {
            id: Uuid::new_v4(),
            program_id: Some(self.id),
            template_id: Some(template.id),
            session_name: template.name.clone(),
            session_index,
            week_number: week,
            date,
            status: SessionStatus::Active,
            exercises,
        })
    }

    fn logged_exercise(&self, planned: &PlannedExercise, week: u32) -> LoggedExercise {
        let targets = weekly_targets(&planned.target, week, self.total_weeks, self.goal);
        let sets = prefilled_sets(
            &planned.target,
            targets.effective_exertion,
            targets.effective_set_count,
        );

        LoggedExercise {
            exercise_id: planned.id,
            name: planned.name.clone(),
            target: planned.target,
            target_exertion: targets.effective_exertion,
            temporary: false,
            sets,
        }
    }
}

/// Sets pre-filled with the suggested load and an initial exertion
///
/// The initial exertion is inferred from the suggested load when the 1RM is
/// known, otherwise it is the target exertion.
fn prefilled_sets(target: &ExerciseTarget, target_exertion: f64, count: u32) -> Vec<PerformedSet> {
    let load = predict_load(target.one_rep_max, target.target_reps, target_exertion);
    let reps = Some(target.target_reps).filter(|r| *r >= 1);

    let exertion = match (load, reps) {
        (Some(load), Some(reps)) => {
            infer_exertion(load, reps, target.one_rep_max).map(f64::from)
        }
        _ => Some(target_exertion),
    };

    (0..count.max(1))
        .map(|_| PerformedSet::new(load, reps, exertion))
        .collect()
}

/// The session currently in progress, if any
pub fn active_session(sessions: &[SessionRecord]) -> Option<&SessionRecord> {
    sessions.iter().find(|s| s.status == SessionStatus::Active)
}

/// The block sessions are started from, if one is marked active
pub fn active_block(blocks: &[TrainingBlock]) -> Option<&TrainingBlock> {
    blocks.iter().find(|b| b.active)
}

/// Mark one block active and every other block inactive
pub fn set_active_block(blocks: &mut [TrainingBlock], id: Uuid) -> Result<()> {
    if !blocks.iter().any(|b| b.id == id) {
        return Err(Error::Program(format!("No block {}", id)));
    }
    for block in blocks.iter_mut() {
        block.active = block.id == id;
    }
    tracing::info!("Active block is now {}", id);
    Ok(())
}

impl SessionRecord {
    fn ensure_active(&self) -> Result<()> {
        if self.status != SessionStatus::Active {
            return Err(Error::Session(format!(
                "Session {} is already completed",
                self.id
            )));
        }
        Ok(())
    }

    fn exercise_mut(&mut self, exercise_idx: usize) -> Result<&mut LoggedExercise> {
        self.ensure_active()?;
        self.exercises
            .get_mut(exercise_idx)
            .ok_or_else(|| Error::Session(format!("No exercise at index {}", exercise_idx)))
    }

    /// Apply a single field edit to one set
    pub fn edit_set(&mut self, exercise_idx: usize, set_idx: usize, edit: SetEdit) -> Result<()> {
        let exercise = self.exercise_mut(exercise_idx)?;
        let target = exercise.target;
        let set = exercise
            .sets
            .get_mut(set_idx)
            .ok_or_else(|| Error::Session(format!("No set at index {}", set_idx)))?;

        let updated = apply_set_edit(set, edit, &target);
        *set = updated;
        Ok(())
    }

    /// Append a set copying the previous set's load and reps
    pub fn add_set(&mut self, exercise_idx: usize) -> Result<()> {
        let exercise = self.exercise_mut(exercise_idx)?;
        let (load, reps) = exercise
            .sets
            .last()
            .map(|s| (s.load, s.reps))
            .unwrap_or((None, None));

        exercise.sets.push(PerformedSet::new(load, reps, None));
        Ok(())
    }

    /// Remove a set; the last remaining set is kept
    ///
    /// Returns whether a set was removed.
    pub fn remove_set(&mut self, exercise_idx: usize, set_idx: usize) -> Result<bool> {
        let exercise = self.exercise_mut(exercise_idx)?;
        if exercise.sets.len() <= 1 {
            return Ok(false);
        }
        if set_idx >= exercise.sets.len() {
            return Err(Error::Session(format!("No set at index {}", set_idx)));
        }

        exercise.sets.remove(set_idx);
        Ok(true)
    }

    /// Add an exercise to this session only
    ///
    /// The exercise is prescribed at its own baseline exertion and is not
    /// carried into later sessions.
    pub fn add_exercise(&mut self, name: &str, target: ExerciseTarget) -> Result<()> {
        self.ensure_active()?;
        self.push_exercise(Uuid::new_v4(), name, target, true);
        Ok(())
    }

    /// Add an exercise to this session and to its template in `block`
    ///
    /// Later sessions started from the same template include it. Returns
    /// the id of the planned exercise.
    pub fn add_permanent_exercise(
        &mut self,
        block: &mut TrainingBlock,
        name: &str,
        target: ExerciseTarget,
    ) -> Result<Uuid> {
        self.ensure_active()?;
        if self.program_id != Some(block.id) {
            return Err(Error::Session(format!(
                "Session {} does not belong to block '{}'",
                self.id, block.name
            )));
        }
        let template_id = self.template_id.ok_or_else(|| {
            Error::Session(format!("Session {} has no template to extend", self.id))
        })?;

        let id = block.add_exercise(template_id, name, target)?;
        self.push_exercise(id, name, target, false);
        tracing::info!("Added '{}' to '{}' in block '{}'", name, self.session_name, block.name);
        Ok(id)
    }

    fn push_exercise(&mut self, exercise_id: Uuid, name: &str, target: ExerciseTarget, temporary: bool) {
        let exertion = clamp_exertion(target.baseline_exertion);
        let sets = prefilled_sets(&target, exertion, target.set_count);

        self.exercises.push(LoggedExercise {
            exercise_id,
            name: name.to_string(),
            target,
            target_exertion: exertion,
            temporary,
            sets,
        });
    }

    /// Complete the session and advance the block's rotation
    ///
    /// The week only advances once every session of the rotation is done.
    pub fn complete(&mut self, block: &mut TrainingBlock) -> Result<RotationOutcome> {
        self.ensure_active()?;
        if self.program_id != Some(block.id) {
            return Err(Error::Session(format!(
                "Session {} does not belong to block '{}'",
                self.id, block.name
            )));
        }

        self.status = SessionStatus::Completed;

        let previous_week = block.current_week.max(1);
        let next_index = self.session_index + 1;
        let rotation_completed = next_index >= block.sessions.len();

        block.current_index = if rotation_completed { 0 } else { next_index };
        block.current_week = if rotation_completed {
            previous_week + 1
        } else {
            previous_week
        };

        tracing::info!(
            "Completed '{}' (week {}); rotation completed: {}",
            self.session_name,
            previous_week,
            rotation_completed
        );

        Ok(RotationOutcome {
            rotation_completed,
            previous_week,
            new_week: block.current_week,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn target(one_rep_max: f64, sets: u32) -> ExerciseTarget {
        ExerciseTarget {
            one_rep_max,
            target_reps: 3,
            baseline_exertion: 7.5,
            set_count: sets,
        }
    }

    fn two_session_block() -> TrainingBlock {
        let mut block = TrainingBlock::new("Test Peak", BlockGoal::Peaking, 6, 7.5);
        let a = block.add_session("Training A");
        let b = block.add_session("Training B");
        block.add_exercise(a, "Back Squat", target(140.0, 4)).unwrap();
        block.add_exercise(a, "Bench Press", target(100.0, 4)).unwrap();
        block.add_exercise(b, "Deadlift", target(180.0, 3)).unwrap();
        block
    }

    #[test]
    fn test_start_session_prefills_sets() {
        crate::logging::init_test();
        let block = two_session_block();
        let session = block.start_session(date()).unwrap();

        assert_eq!(session.session_name, "Training A");
        assert_eq!(session.week_number, 1);
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.exercises.len(), 2);

        let squat = &session.exercises[0];
        assert_eq!(squat.target_exertion, 7.5);
        assert_eq!(squat.sets.len(), 4);
        for set in &squat.sets {
            assert_eq!(set.load, Some(120.0));
            assert_eq!(set.reps, Some(3));
            assert_eq!(set.reported_exertion, Some(8.0));
            assert!(!set.completed);
        }
    }

    #[test]
    fn test_start_session_without_one_rep_max() {
        let mut block = TrainingBlock::new("No max", BlockGoal::Peaking, 6, 7.0);
        let a = block.add_session("A");
        block.add_exercise(a, "Pull-Up", target(0.0, 3)).unwrap();

        let session = block.start_session(date()).unwrap();
        let set = &session.exercises[0].sets[0];
        assert_eq!(set.load, None);
        assert_eq!(set.reported_exertion, Some(7.5));
    }

    #[test]
    fn test_start_session_uses_weekly_targets() {
        let mut block = two_session_block();
        block.current_week = 6;
        let session = block.start_session(date()).unwrap();

        let squat = &session.exercises[0];
        assert_eq!(squat.target_exertion, 9.5);
        assert_eq!(squat.sets.len(), 2);
    }

    #[test]
    fn test_start_session_empty_block() {
        let block = TrainingBlock::new("Empty", BlockGoal::Maintenance, 4, 7.0);
        assert!(block.start_session(date()).is_none());
    }

    #[test]
    fn test_rotation_advances_week() {
        let mut block = two_session_block();

        let mut first = block.start_session(date()).unwrap();
        let outcome = first.complete(&mut block).unwrap();
        assert!(!outcome.rotation_completed);
        assert_eq!(outcome.new_week, 1);
        assert_eq!(block.current_index, 1);

        let mut second = block.start_session(date()).unwrap();
        assert_eq!(second.session_name, "Training B");
        let outcome = second.complete(&mut block).unwrap();
        assert!(outcome.rotation_completed);
        assert_eq!(outcome.previous_week, 1);
        assert_eq!(outcome.new_week, 2);
        assert_eq!(block.current_index, 0);
    }

    #[test]
    fn test_complete_twice_fails() {
        let mut block = two_session_block();
        let mut session = block.start_session(date()).unwrap();
        session.complete(&mut block).unwrap();

        assert!(matches!(session.complete(&mut block), Err(Error::Session(_))));
        assert!(session.add_set(0).is_err());
    }

    #[test]
    fn test_complete_against_other_block_fails() {
        let block = two_session_block();
        let mut other = two_session_block();
        let mut session = block.start_session(date()).unwrap();
        assert!(session.complete(&mut other).is_err());
        assert_eq!(session.status, SessionStatus::Active);
    }

    #[test]
    fn test_active_session_lookup() {
        let mut block = two_session_block();
        let mut done = block.start_session(date()).unwrap();
        done.complete(&mut block).unwrap();
        let active = block.start_session(date()).unwrap();

        let sessions = vec![done, active.clone()];
        assert_eq!(active_session(&sessions).map(|s| s.id), Some(active.id));
        assert!(active_session(&sessions[..1]).is_none());
    }

    #[test]
    fn test_edit_set_reinfers_exertion() {
        let block = two_session_block();
        let mut session = block.start_session(date()).unwrap();

        session.edit_set(0, 1, SetEdit::Load(Some(130.0))).unwrap();
        assert_eq!(session.exercises[0].sets[1].reported_exertion, Some(10.0));
        assert_eq!(session.exercises[0].sets[0].reported_exertion, Some(8.0));

        assert!(session.edit_set(0, 9, SetEdit::Completed(true)).is_err());
        assert!(session.edit_set(5, 0, SetEdit::Completed(true)).is_err());
    }

    #[test]
    fn test_add_and_remove_sets() {
        let block = two_session_block();
        let mut session = block.start_session(date()).unwrap();

        session.add_set(0).unwrap();
        let sets = &session.exercises[0].sets;
        assert_eq!(sets.len(), 5);
        assert_eq!(sets[4].load, Some(120.0));
        assert_eq!(sets[4].reported_exertion, None);

        for _ in 0..10 {
            session.remove_set(0, 0).unwrap();
        }
        assert_eq!(session.exercises[0].sets.len(), 1);
        assert!(!session.remove_set(0, 0).unwrap());
    }

    #[test]
    fn test_add_temporary_exercise() {
        let block = two_session_block();
        let mut session = block.start_session(date()).unwrap();

        session.add_exercise("Face Pull", target(0.0, 2)).unwrap();
        let added = session.exercises.last().unwrap();
        assert!(added.temporary);
        assert_eq!(added.sets.len(), 2);
        assert_eq!(added.target_exertion, 7.5);
        assert_eq!(block.sessions[0].exercises.len(), 2);
    }

    #[test]
    fn test_add_permanent_exercise_extends_template() {
        let mut block = two_session_block();
        let mut session = block.start_session(date()).unwrap();

        let id = session
            .add_permanent_exercise(&mut block, "Barbell Row", target(100.0, 3))
            .unwrap();
        let added = session.exercises.last().unwrap();
        assert!(!added.temporary);
        assert_eq!(added.exercise_id, id);

        let template = &block.sessions[0];
        assert_eq!(template.exercises.len(), 3);
        assert_eq!(template.exercises[2].name, "Barbell Row");
        assert_eq!(block.sessions[1].exercises.len(), 1);

        // The next rotation through Training A includes the new exercise
        session.complete(&mut block).unwrap();
        let mut b = block.start_session(date()).unwrap();
        b.complete(&mut block).unwrap();
        let next_a = block.start_session(date()).unwrap();
        assert_eq!(next_a.session_name, "Training A");
        assert!(next_a.exercises.iter().any(|e| e.exercise_id == id));
    }

    #[test]
    fn test_add_permanent_exercise_rejects_other_block() {
        let block = two_session_block();
        let mut other = two_session_block();
        let mut session = block.start_session(date()).unwrap();

        assert!(session
            .add_permanent_exercise(&mut other, "Barbell Row", target(100.0, 3))
            .is_err());
        assert_eq!(other.sessions[0].exercises.len(), 2);
        assert_eq!(session.exercises.len(), 2);
    }

    #[test]
    fn test_added_exercise_exertion_is_clamped() {
        let block = two_session_block();
        let mut session = block.start_session(date()).unwrap();
        let mut t = target(0.0, 2);
        t.baseline_exertion = 12.0;

        session.add_exercise("Curl", t).unwrap();
        assert_eq!(session.exercises.last().unwrap().target_exertion, 10.0);
    }

    #[test]
    fn test_exercise_target_uses_start_exertion() {
        let block = TrainingBlock::new("Peak", BlockGoal::Peaking, 6, 8.5);
        let t = block.exercise_target(150.0, 5, 0);
        assert_eq!(t.baseline_exertion, 8.5);
        assert_eq!(t.target_reps, 5);
        assert_eq!(t.set_count, 1);

        let clamped = TrainingBlock::new("Hot", BlockGoal::Peaking, 6, 11.0);
        assert_eq!(clamped.exercise_target(150.0, 5, 3).baseline_exertion, 10.0);
    }

    #[test]
    fn test_session_named() {
        let block = two_session_block();
        assert_eq!(block.session_named("training b").map(|s| s.name.as_str()), Some("Training B"));
        assert!(block.session_named("Training C").is_none());
    }

    #[test]
    fn test_set_active_block() {
        let mut blocks = vec![two_session_block(), two_session_block()];
        assert!(active_block(&blocks).is_none());

        let second = blocks[1].id;
        set_active_block(&mut blocks, second).unwrap();
        assert_eq!(active_block(&blocks).map(|b| b.id), Some(second));

        let first = blocks[0].id;
        set_active_block(&mut blocks, first).unwrap();
        assert!(!blocks[1].active);
        assert_eq!(active_block(&blocks).map(|b| b.id), Some(first));

        assert!(matches!(
            set_active_block(&mut blocks, Uuid::new_v4()),
            Err(Error::Program(_))
        ));
    }

    #[test]
    fn test_validate_block() {
        assert!(two_session_block().validate().is_empty());

        let mut block = TrainingBlock::new("Bad", BlockGoal::Peaking, 4, 7.0);
        let errors = block.validate();
        assert!(errors.iter().any(|e| e.contains("no sessions")));

        let a = block.add_session("A");
        block
            .add_exercise(
                a,
                "Squat",
                ExerciseTarget {
                    one_rep_max: 100.0,
                    target_reps: 0,
                    baseline_exertion: 11.0,
                    set_count: 3,
                },
            )
            .unwrap();
        let errors = block.validate();
        assert!(errors.iter().any(|e| e.contains("zero target reps")));
        assert!(errors.iter().any(|e| e.contains("baseline exertion")));
    }

    #[test]
    fn test_add_exercise_unknown_session() {
        let mut block = two_session_block();
        assert!(matches!(
            block.add_exercise(Uuid::new_v4(), "Row", target(80.0, 3)),
            Err(Error::Program(_))
        ));
    }
}
