#![forbid(unsafe_code)]

//! Core domain model and prescription engine for the RPE planner.
//!
//! This crate provides:
//! - Domain types (exercise targets, sets, sessions, training blocks)
//! - RPE table and load prediction
//! - Exertion estimation and set feedback
//! - Week progression for peaking and maintenance blocks
//! - Session lifecycle and post-session feedback
//! - Progress history and the exercise catalog

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod rpe_table;
pub mod load;
pub mod exertion;
pub mod progression;
pub mod session;
pub mod feedback;
pub mod history;
pub mod catalog;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use rpe_table::percentage_for;
pub use load::predict_load;
pub use exertion::{
    apply_set_edit, classify_exertion_deviation, estimate_one_rep_max, infer_exertion,
    is_underperforming, ExertionDeviation, SetEdit,
};
pub use progression::{next_week_preview, weekly_targets, WeekPreview};
pub use session::{active_block, active_session, set_active_block};
pub use feedback::{classify_session, FeedbackCategory, FeedbackTone, SessionFeedback};
pub use history::{exercise_history, load_blocks, load_sessions, save_blocks, save_sessions, HistoryPoint};
pub use catalog::search_exercises;
