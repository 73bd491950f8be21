//! Progress history over completed sessions.
//!
//! This module turns logged sessions into per-exercise progress points
//! (best estimated 1RM and heaviest load per day) for charting, and reads
//! and writes the JSON session and block files the CLI works with.

use crate::exertion::estimate_one_rep_max;
use crate::{Result, SessionRecord, SessionStatus, TrainingBlock};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One day's best effort for an exercise
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub e1rm: f64,
    pub best_load: f64,
}

/// Progress points for an exercise, oldest first
///
/// Only completed sessions count and names match case-insensitively. When
/// several sessions share a date the highest e1RM is kept. Only the last
/// `limit` points are returned.
pub fn exercise_history(
    sessions: &[SessionRecord],
    exercise_name: &str,
    limit: usize,
) -> Vec<HistoryPoint> {
    let wanted = exercise_name.to_lowercase();
    let mut by_date: BTreeMap<NaiveDate, HistoryPoint> = BTreeMap::new();

    for session in sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
    {
        let Some(exercise) = session
            .exercises
            .iter()
            .find(|e| e.name.to_lowercase() == wanted)
        else {
            continue;
        };

        let mut best_e1rm: f64 = 0.0;
        let mut best_load: f64 = 0.0;
        for set in &exercise.sets {
            let (Some(load), Some(reps)) = (set.entered_load(), set.entered_reps()) else {
                continue;
            };
            if let Some(e1rm) = estimate_one_rep_max(load, reps) {
                best_e1rm = best_e1rm.max(e1rm);
            }
            best_load = best_load.max(load);
        }

        if best_e1rm <= 0.0 {
            continue;
        }

        let point = HistoryPoint {
            date: session.date,
            e1rm: best_e1rm,
            best_load,
        };
        match by_date.get(&session.date) {
            Some(existing) if existing.e1rm >= point.e1rm => {}
            _ => {
                by_date.insert(session.date, point);
            }
        }
    }

    let points: Vec<HistoryPoint> = by_date.into_values().collect();
    let skip = points.len().saturating_sub(limit);
    points.into_iter().skip(skip).collect()
}

/// Change in e1RM from the first to the last point
pub fn progress_delta(points: &[HistoryPoint]) -> Option<f64> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => Some(last.e1rm - first.e1rm),
        _ => None,
    }
}

/// Sorted unique exercise names across completed sessions
pub fn exercise_names(sessions: &[SessionRecord]) -> Vec<String> {
    sessions
        .iter()
        .filter(|s| s.status == SessionStatus::Completed)
        .flat_map(|s| s.exercises.iter())
        .map(|e| e.name.clone())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        tracing::debug!("No file found at {:?}", path);
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_json_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(items)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Load sessions from a JSON array file
///
/// A missing file is an empty history.
pub fn load_sessions(path: &Path) -> Result<Vec<SessionRecord>> {
    let sessions: Vec<SessionRecord> = read_json_list(path)?;
    tracing::info!("Loaded {} sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

/// Save sessions as a pretty-printed JSON array
pub fn save_sessions(path: &Path, sessions: &[SessionRecord]) -> Result<()> {
    write_json_list(path, sessions)?;
    tracing::debug!("Saved {} sessions to {:?}", sessions.len(), path);
    Ok(())
}

/// Load training blocks from a JSON array file; a missing file is empty
pub fn load_blocks(path: &Path) -> Result<Vec<TrainingBlock>> {
    let blocks: Vec<TrainingBlock> = read_json_list(path)?;
    tracing::info!("Loaded {} blocks from {:?}", blocks.len(), path);
    Ok(blocks)
}

pub fn save_blocks(path: &Path, blocks: &[TrainingBlock]) -> Result<()> {
    write_json_list(path, blocks)?;
    tracing::debug!("Saved {} blocks to {:?}", blocks.len(), path);
    Ok(())
}

#[derive(Debug, Serialize)]
struct CsvRow {
    date: String,
    e1rm: f64,
    best_load: f64,
}

impl From<&HistoryPoint> for CsvRow {
    fn from(point: &HistoryPoint) -> Self {
        CsvRow {
            date: point.date.format("%Y-%m-%d").to_string(),
            e1rm: point.e1rm,
            best_load: point.best_load,
        }
    }
}

/// Write progress points as `date,e1rm,best_load` CSV, replacing the file
pub fn write_history_csv(path: &Path, points: &[HistoryPoint]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for point in points {
        writer.serialize(CsvRow::from(point))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} history points to {:?}", points.len(), path);
    Ok(())
}
