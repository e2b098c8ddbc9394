//! Error types for the scheduler.
//!
//! Every variant is a precondition or configuration violation reported to the
//! caller. Degenerate numeric inputs with a defined fallback (too few samples
//! for alpha, zero response time, empty score history) are not errors.

use thiserror::Error;

pub type TeacherResult<T> = Result<T, TeacherError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeacherError {
    #[error("roster has {actual} places, at least {required} are required")]
    RosterTooSmall { required: usize, actual: usize },

    #[error("spacing trial requested before calibration estimated the pointer speed")]
    CalibrationIncomplete,

    #[error("no trial is pending")]
    NoPendingTrial,

    #[error("no calibration trial is pending")]
    NoPendingCalibration,

    #[error("trial for item {item_index} is still pending")]
    TrialAlreadyPending { item_index: usize },

    #[error("calibration point {calib_index} is still pending")]
    CalibrationAlreadyPending { calib_index: usize },

    #[error("outcome reported for item {actual}, pending trial is item {expected}")]
    ItemMismatch { expected: usize, actual: usize },

    #[error("outcome timestamp {submitted} precedes last accepted timestamp {previous}")]
    OutOfOrderResult { previous: f64, submitted: f64 },

    #[error("invalid outcome: {0}")]
    InvalidOutcome(String),

    #[error("calibration cannot estimate speed from distance {distance} over {response_time}s")]
    DegenerateCalibration { distance: f64, response_time: f64 },

    #[error("calibration needs {required} results, got {actual}")]
    InsufficientCalibrationData { required: usize, actual: usize },

    #[error("session time must be a finite, non-negative number of seconds, got {0}")]
    InvalidTime(f64),

    #[error("session time {requested} is earlier than last accepted time {previous}")]
    ClockWentBackwards { previous: f64, requested: f64 },

    #[error("session already finalized")]
    SessionFinalized,

    #[error("config error: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}
