//! Outcome Validation
//!
//! Measurements come from the input layer and feed straight into the
//! activation equations. A NaN or negative response time would poison every
//! later decision, so outcomes are checked before they are recorded.

use crate::error::{TeacherError, TeacherResult};
use crate::types::{CalibrationOutcome, TrialOutcome};

/// Check an array for NaN or infinite values
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

fn check_measurements(
    response_time: f64,
    avg_velocity: f64,
    distance_traveled: f64,
    shortest_path: f64,
    timestamp: f64,
) -> TeacherResult<()> {
    if has_invalid_values(&[
        response_time,
        avg_velocity,
        distance_traveled,
        shortest_path,
        timestamp,
    ]) {
        return Err(TeacherError::InvalidOutcome(
            "measurements must be finite".to_string(),
        ));
    }
    if response_time < 0.0 {
        return Err(TeacherError::InvalidOutcome(format!(
            "response time must be >= 0, got {response_time}"
        )));
    }
    if distance_traveled < 0.0 || shortest_path < 0.0 {
        return Err(TeacherError::InvalidOutcome(
            "distances must be >= 0".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_trial_outcome(outcome: &TrialOutcome) -> TeacherResult<()> {
    check_measurements(
        outcome.response_time,
        outcome.avg_velocity,
        outcome.distance_traveled,
        outcome.shortest_path,
        outcome.timestamp,
    )
}

pub fn validate_calibration_outcome(outcome: &CalibrationOutcome) -> TeacherResult<()> {
    check_measurements(
        outcome.response_time,
        outcome.avg_velocity,
        outcome.distance_traveled,
        outcome.shortest_path,
        outcome.timestamp,
    )
}
