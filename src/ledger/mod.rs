//! Trial Ledger
//!
//! Append-only history of trial and calibration results, the running score
//! and the export views handed to the persistence layer.

use serde::{Deserialize, Serialize};

use crate::error::{TeacherError, TeacherResult};
use crate::memory::PlaceMemoryModel;
use crate::types::{CalibrationResult, Condition, TrialResult};

/// Percentage reported before any trial completed
const EMPTY_SCORE_PERCENTAGE: u32 = 100;

// ==================== Export Views ====================

/// One row of the tabular view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRow {
    pub subject: String,
    #[serde(flatten)]
    pub trial: TrialResult,
}

/// Memory history of one place for the hierarchical view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceHistory {
    pub index: usize,
    pub name: String,
    /// Scheduler that owns the slot, if any
    pub condition: Option<Condition>,
    pub total_presentations: u32,
    pub times: Vec<f64>,
    pub decays: Vec<f64>,
    pub alpha: Vec<f64>,
}

// ==================== Ledger ====================

#[derive(Clone, Debug, Default)]
pub struct TrialLedger {
    trials: Vec<TrialResult>,
    calibrations: Vec<CalibrationResult>,
    /// 1 for correct, 0 for wrong, in completion order
    score_history: Vec<u8>,
}

impl TrialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trial result.
    ///
    /// Results must arrive in completion order: a result stamped earlier
    /// than the last accepted one is rejected and nothing is recorded.
    pub fn record_trial(&mut self, result: TrialResult) -> TeacherResult<()> {
        if let Some(last) = self.trials.last() {
            if result.timestamp < last.timestamp {
                return Err(TeacherError::OutOfOrderResult {
                    previous: last.timestamp,
                    submitted: result.timestamp,
                });
            }
        }
        self.score_history.push(u8::from(result.correct));
        self.trials.push(result);
        Ok(())
    }

    pub fn record_calibration(&mut self, result: CalibrationResult) -> TeacherResult<()> {
        if let Some(last) = self.calibrations.last() {
            if result.timestamp < last.timestamp {
                return Err(TeacherError::OutOfOrderResult {
                    previous: last.timestamp,
                    submitted: result.timestamp,
                });
            }
        }
        self.calibrations.push(result);
        Ok(())
    }

    pub fn trials(&self) -> &[TrialResult] {
        &self.trials
    }

    pub fn calibrations(&self) -> &[CalibrationResult] {
        &self.calibrations
    }

    pub fn score_history(&self) -> &[u8] {
        &self.score_history
    }

    pub fn last_trial(&self) -> Option<&TrialResult> {
        self.trials.last()
    }

    /// The two most recently completed trials, oldest first
    pub fn last_two_trials(&self) -> Option<(&TrialResult, &TrialResult)> {
        match self.trials.as_slice() {
            [.., previous, last] => Some((previous, last)),
            _ => None,
        }
    }

    /// Percentage of correct answers over the last `n` trials, truncated.
    ///
    /// Returns 100 when there is no history yet.
    pub fn percentage_correct(&self, n: usize) -> u32 {
        let start = self.score_history.len().saturating_sub(n);
        let window = &self.score_history[start..];
        if window.is_empty() {
            return EMPTY_SCORE_PERCENTAGE;
        }
        let correct: u32 = window.iter().map(|&s| u32::from(s)).sum();
        correct * 100 / window.len() as u32
    }

    /// Flat view: one row per trial
    pub fn rows(&self, subject: &str) -> Vec<TrialRow> {
        self.trials
            .iter()
            .map(|trial| TrialRow {
                subject: subject.to_string(),
                trial: trial.clone(),
            })
            .collect()
    }

    /// Flat view restricted to one condition
    pub fn rows_for(&self, subject: &str, condition: Condition) -> Vec<TrialRow> {
        self.rows(subject)
            .into_iter()
            .filter(|row| row.trial.condition == condition)
            .collect()
    }

    /// Hierarchical view: memory history per roster slot
    pub fn place_histories(
        &self,
        memory: &PlaceMemoryModel,
        spacing_pool: usize,
        flashcard_slots: std::ops::Range<usize>,
    ) -> Vec<PlaceHistory> {
        memory
            .places()
            .iter()
            .enumerate()
            .map(|(index, place)| {
                let condition = if index < spacing_pool {
                    Some(Condition::Spacing)
                } else if flashcard_slots.contains(&index) {
                    Some(Condition::Flashcard)
                } else {
                    None
                };
                PlaceHistory {
                    index,
                    name: place.name.clone(),
                    condition,
                    total_presentations: place.num_shows,
                    times: place.times.clone(),
                    decays: place.decays.clone(),
                    alpha: place.alpha.clone(),
                }
            })
            .collect()
    }
}
