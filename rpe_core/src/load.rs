//! Load prediction from 1RM, reps and target exertion.

use crate::rpe_table::{exertion_level, percentage_for, table_reps};

/// Smallest practical plate increment in kilograms
pub const PLATE_INCREMENT: f64 = 2.5;

/// Round a load to the nearest plate increment
pub fn round_to_plate(load: f64) -> f64 {
    (load / PLATE_INCREMENT).round() * PLATE_INCREMENT
}

/// Prescribed load for a target rep count at a target exertion
///
/// Returns `None` when the 1RM is unknown (zero, negative or not finite).
/// Exertion is clamped to 6..=10 and rounded to a table level; reps are
/// clamped to 1..=10. The result is rounded to the nearest 2.5 kg.
pub fn predict_load(one_rep_max: f64, target_reps: u32, target_exertion: f64) -> Option<f64> {
    if !one_rep_max.is_finite() || one_rep_max <= 0.0 {
        return None;
    }

    let level = exertion_level(target_exertion);
    let raw = one_rep_max * percentage_for(level, table_reps(target_reps));
    Some(round_to_plate(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_load_matches_table() {
        // 100 * 0.811 = 81.1 -> 80.0
        assert_eq!(predict_load(100.0, 5, 8.0), Some(80.0));
    }

    #[test]
    fn test_predict_load_rounds_exertion() {
        // 7.5 rounds to 8: 140 * 0.863 = 120.82 -> 120.0
        assert_eq!(predict_load(140.0, 3, 7.5), Some(120.0));
        assert_eq!(predict_load(140.0, 3, 7.5), predict_load(140.0, 3, 8.0));
    }

    #[test]
    fn test_predict_load_unknown_one_rep_max() {
        assert_eq!(predict_load(0.0, 5, 8.0), None);
        assert_eq!(predict_load(-20.0, 5, 8.0), None);
        assert_eq!(predict_load(f64::NAN, 5, 8.0), None);
    }

    #[test]
    fn test_predict_load_clamps_inputs() {
        assert_eq!(predict_load(200.0, 1, 11.0), Some(200.0));
        assert_eq!(predict_load(200.0, 0, 10.0), Some(200.0));
        assert_eq!(predict_load(100.0, 20, 3.0), predict_load(100.0, 10, 6.0));
    }

    #[test]
    fn test_result_is_plate_multiple() {
        for orm in [57.0, 92.5, 133.0, 181.0] {
            for reps in 1..=10 {
                let load = predict_load(orm, reps, 8.5).unwrap();
                let plates = load / PLATE_INCREMENT;
                assert!((plates - plates.round()).abs() < 1e-9, "{} not a plate multiple", load);
            }
        }
    }

    #[test]
    fn test_round_to_plate() {
        assert_eq!(round_to_plate(81.1), 80.0);
        assert_eq!(round_to_plate(81.3), 82.5);
        assert_eq!(round_to_plate(0.0), 0.0);
    }
}
