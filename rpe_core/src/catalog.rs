//! Built-in catalog of strength exercises.
//!
//! Used for name suggestions when adding exercises to a block.

use once_cell::sync::Lazy;

/// Maximum number of suggestions returned by [`search_exercises`]
pub const MAX_SUGGESTIONS: usize = 6;

/// Curated strength and gym movements, grouped by pattern
pub const EXERCISES: &[&str] = &[
    // Squat
    "Back Squat",
    "Front Squat",
    "Box Squat",
    "Safety Bar Squat",
    "Pause Squat",
    "High Bar Squat",
    "Low Bar Squat",
    "Bulgarian Split Squat",
    "Goblet Squat",
    // Deadlift
    "Deadlift",
    "Sumo Deadlift",
    "Romanian Deadlift",
    "Trap Bar Deadlift",
    "Stiff Leg Deadlift",
    "Deficit Deadlift",
    "Block Pull",
    "Rack Pull",
    // Bench press
    "Bench Press",
    "Close Grip Bench Press",
    "Incline Bench Press",
    "Decline Bench Press",
    "Pause Bench Press",
    "Floor Press",
    "DB Bench Press",
    "DB Incline Press",
    // Overhead
    "Overhead Press",
    "Push Press",
    "Seated Overhead Press",
    "Seated DB Press",
    "Arnold Press",
    "Z Press",
    // Horizontal pull
    "Barbell Row",
    "Pendlay Row",
    "Seal Row",
    "Cable Row",
    "DB Row",
    "Chest Supported Row",
    "T-Bar Row",
    // Vertical pull
    "Pull-Up",
    "Chin-Up",
    "Lat Pulldown",
    "Close Grip Pulldown",
    "Neutral Grip Pull-Up",
    // Hinge
    "Good Morning",
    "Hip Thrust",
    "Glute Bridge",
    "Leg Curl",
    "Nordic Curl",
    // Legs
    "Leg Press",
    "Hack Squat",
    "Lunge",
    "Step Up",
    "Leg Extension",
    // Arms and shoulders
    "Tricep Pushdown",
    "Skull Crusher",
    "Tricep Dips",
    "Barbell Curl",
    "DB Curl",
    "Hammer Curl",
    "Face Pull",
    "Lateral Raise",
    "Rear Delt Fly",
    // Olympic
    "Power Clean",
    "Hang Clean",
    "Power Snatch",
    "Hang Snatch",
    "Clean and Jerk",
];

/// Lowercased names paired with their display form, built once
static SEARCH_INDEX: Lazy<Vec<(String, &'static str)>> = Lazy::new(|| {
    EXERCISES
        .iter()
        .map(|name| (name.to_lowercase(), *name))
        .collect()
});

/// Exercises whose name contains `query`, case-insensitively
///
/// A blank query returns nothing. At most [`MAX_SUGGESTIONS`] names, in
/// catalog order.
pub fn search_exercises(query: &str) -> Vec<&'static str> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    SEARCH_INDEX
        .iter()
        .filter(|(lower, _)| lower.contains(&q))
        .map(|(_, name)| *name)
        .take(MAX_SUGGESTIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_is_case_insensitive() {
        let results = search_exercises("BENCH");
        assert_eq!(results[0], "Bench Press");
        assert!(results.iter().all(|r| r.to_lowercase().contains("bench")));
    }

    #[test]
    fn test_search_limits_results() {
        assert_eq!(search_exercises("squat").len(), MAX_SUGGESTIONS);
        assert_eq!(search_exercises("squat")[0], "Back Squat");
    }

    #[test]
    fn test_blank_query() {
        assert!(search_exercises("").is_empty());
        assert!(search_exercises("   ").is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(search_exercises("zumba").is_empty());
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        let mut names: Vec<&str> = EXERCISES.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), EXERCISES.len());
    }
}
