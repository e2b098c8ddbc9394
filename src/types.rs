//! Common Types and Constants
//!
//! Shared data structures used across the scheduling modules: the roster
//! (places and calibration points), trial descriptors handed to the
//! presentation layer, and the outcome events it reports back.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Minimum roster size (16 spacing + 16 flashcard slots)
pub const MIN_ROSTER_SIZE: usize = 32;

/// Items per flashcard batch
pub const FLASHCARD_BATCH_SIZE: usize = 4;

/// Number of flashcard batches
pub const FLASHCARD_BATCHES: usize = 4;

/// Items below this index may show a hint
pub const HINT_LOWER_BOUND: usize = 8;

/// Items above this index may show a hint
pub const HINT_UPPER_BOUND: usize = 23;

/// Average speed recorded for a trial with zero response time
pub const ZERO_RT_SPEED_SENTINEL: f64 = 1000.0;

// ==================== Roster ====================

/// A named location on the map together with its memory trace.
///
/// The static part (`x`, `y`, `name`, `size`) comes from the roster loader.
/// The trace is owned by [`crate::memory::PlaceMemoryModel`] and only changes
/// through it. `decays` and `alpha` lag `times`: they are appended when the
/// item is revisited, never at its first presentation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub x: i32,
    pub y: i32,
    pub name: String,
    /// Marker size used by the hit test of the presentation layer
    pub size: f64,
    /// Presentation timestamps (session seconds)
    #[serde(default)]
    pub times: Vec<f64>,
    /// Decay exponent per rehearsed presentation
    #[serde(default)]
    pub decays: Vec<f64>,
    /// Alpha history, one entry per decay
    #[serde(default)]
    pub alpha: Vec<f64>,
    /// Cached activation (0 until first computed)
    #[serde(default)]
    pub act: f64,
    #[serde(default)]
    pub num_shows: u32,
    #[serde(default)]
    pub shown_before: bool,
}

impl Place {
    pub fn new(x: i32, y: i32, name: impl Into<String>, size: f64) -> Self {
        Self {
            x,
            y,
            name: name.into(),
            size,
            times: Vec::new(),
            decays: Vec::new(),
            alpha: Vec::new(),
            act: 0.0,
            num_shows: 0,
            shown_before: false,
        }
    }

    pub fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Euclidean distance from this place to a point
    pub fn distance_to(&self, x: i32, y: i32) -> f64 {
        let dx = f64::from(self.x - x);
        let dy = f64::from(self.y - y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// A synthetic target used only while calibrating pointer speed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: i32,
    pub y: i32,
}

impl CalibrationPoint {
    pub fn distance_to(&self, x: i32, y: i32) -> f64 {
        let dx = f64::from(self.x - x);
        let dy = f64::from(self.y - y);
        (dx * dx + dy * dy).sqrt()
    }
}

// ==================== Trial Classification ====================

/// Whether the item is taught (first presentation) or tested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialKind {
    /// First presentation, the target is pointed out
    Learning,
    /// Unaided recall
    Quiz,
}

/// Scheduling regime that produced a trial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Spacing,
    Flashcard,
}

// ==================== Descriptors ====================

/// Next trial handed to the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialDescriptor {
    pub item_index: usize,
    pub trial_kind: TrialKind,
    pub hint_eligible: bool,
    pub condition: Condition,
}

/// Next calibration point handed to the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationDescriptor {
    pub calib_index: usize,
}

// ==================== Outcome Events ====================

/// Measurements reported when a trial completes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialOutcome {
    pub item_index: usize,
    pub correct: bool,
    pub hint_used: bool,
    /// Response time (seconds, >= 0)
    pub response_time: f64,
    pub avg_velocity: f64,
    /// City-block distance the pointer traveled
    pub distance_traveled: f64,
    /// City-block distance from the start position to the target
    pub shortest_path: f64,
    /// Session time at completion (seconds)
    pub timestamp: f64,
}

/// Measurements reported when a calibration point is hit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationOutcome {
    pub response_time: f64,
    pub avg_velocity: f64,
    pub distance_traveled: f64,
    pub shortest_path: f64,
    pub timestamp: f64,
}

// ==================== Recorded Results ====================

/// Immutable record of one completed trial
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub trial_kind: TrialKind,
    pub condition: Condition,
    pub place_index: usize,
    pub place_name: String,
    pub correct: bool,
    pub hint_used: bool,
    pub response_time: f64,
    pub avg_velocity: f64,
    pub distance_traveled: f64,
    pub shortest_path: f64,
    pub timestamp: f64,
    /// `distance_traveled / response_time`, or 1000 when the response time is 0
    pub avg_speed: f64,
}

impl TrialResult {
    pub fn new(
        trial_kind: TrialKind,
        condition: Condition,
        place_index: usize,
        place_name: impl Into<String>,
        outcome: &TrialOutcome,
    ) -> Self {
        Self {
            trial_kind,
            condition,
            place_index,
            place_name: place_name.into(),
            correct: outcome.correct,
            hint_used: outcome.hint_used,
            response_time: outcome.response_time,
            avg_velocity: outcome.avg_velocity,
            distance_traveled: outcome.distance_traveled,
            shortest_path: outcome.shortest_path,
            timestamp: outcome.timestamp,
            avg_speed: average_speed(outcome.distance_traveled, outcome.response_time),
        }
    }
}

/// Immutable record of one calibration trial (always scored as a hit)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    pub calib_index: usize,
    pub response_time: f64,
    pub avg_velocity: f64,
    pub distance_traveled: f64,
    pub shortest_path: f64,
    pub timestamp: f64,
    pub avg_speed: f64,
}

impl CalibrationResult {
    pub fn new(calib_index: usize, outcome: &CalibrationOutcome) -> Self {
        Self {
            calib_index,
            response_time: outcome.response_time,
            avg_velocity: outcome.avg_velocity,
            distance_traveled: outcome.distance_traveled,
            shortest_path: outcome.shortest_path,
            timestamp: outcome.timestamp,
            avg_speed: average_speed(outcome.distance_traveled, outcome.response_time),
        }
    }
}

fn average_speed(distance: f64, response_time: f64) -> f64 {
    if response_time > 0.0 {
        distance / response_time
    } else {
        ZERO_RT_SPEED_SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn outcome(distance: f64, rt: f64) -> TrialOutcome {
        TrialOutcome {
            item_index: 3,
            correct: true,
            hint_used: false,
            response_time: rt,
            avg_velocity: 4.0,
            distance_traveled: distance,
            shortest_path: 80.0,
            timestamp: 12.0,
        }
    }

    #[test]
    fn test_avg_speed_divides_distance_by_rt() {
        let result = TrialResult::new(
            TrialKind::Quiz,
            Condition::Spacing,
            3,
            "Utrecht",
            &outcome(300.0, 2.0),
        );
        assert!((result.avg_speed - 150.0).abs() < EPSILON);
    }

    #[test]
    fn test_zero_rt_uses_sentinel_speed() {
        let result = TrialResult::new(
            TrialKind::Learning,
            Condition::Flashcard,
            3,
            "Utrecht",
            &outcome(300.0, 0.0),
        );
        assert_eq!(result.avg_speed, ZERO_RT_SPEED_SENTINEL);
    }

    #[test]
    fn test_place_distance() {
        let place = Place::new(0, 0, "Origin", 0.8);
        assert!((place.distance_to(3, 4) - 5.0).abs() < EPSILON);
        assert_eq!(place.coords(), (0, 0));
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let descriptor = TrialDescriptor {
            item_index: 0,
            trial_kind: TrialKind::Learning,
            hint_eligible: true,
            condition: Condition::Spacing,
        };
        let json = serde_json::to_value(descriptor).unwrap();
        assert_eq!(json["itemIndex"], 0);
        assert_eq!(json["trialKind"], "learning");
        assert_eq!(json["hintEligible"], true);
    }
}
