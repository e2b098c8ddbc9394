//! Teacher - session facade
//!
//! Owns the roster, both schedulers, calibration and the ledger, and enforces
//! the session protocol:
//!
//! - calibration runs first, one point at a time
//! - exactly one trial is in flight; its outcome must be submitted before the
//!   next trial is requested
//! - outcomes arrive in completion order
//! - the export is flushed once when the session ends
//!
//! Which scheduler serves a trial depends only on elapsed session time: the
//! spacing half comes first or second depending on `spacing_first`.

mod export;

pub use export::{ExportSink, SessionExport};

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::calibration::CalibrationSession;
use crate::config::TeacherConfig;
use crate::error::{TeacherError, TeacherResult};
use crate::flashcard::FlashcardScheduler;
use crate::ledger::TrialLedger;
use crate::memory::{MemoryParams, PlaceMemoryModel};
use crate::sanitize::{validate_calibration_outcome, validate_trial_outcome};
use crate::spacing::{RecallSignal, SpacingScheduler};
use crate::types::{
    CalibrationDescriptor, CalibrationOutcome, CalibrationPoint, CalibrationResult, Condition,
    Place, TrialDescriptor, TrialKind, TrialOutcome, TrialResult, HINT_LOWER_BOUND,
    HINT_UPPER_BOUND, MIN_ROSTER_SIZE,
};

// ==================== Phase & Hint Rules ====================

/// Scheduler responsible for a trial requested at `elapsed` seconds
pub fn select_phase(elapsed: f64, total_length: f64, spacing_first: bool) -> Condition {
    let first_half = elapsed < 0.5 * total_length;
    if first_half == spacing_first {
        Condition::Spacing
    } else {
        Condition::Flashcard
    }
}

/// Hints are offered on the outer slots only: the middle 16 of the 32
/// scheduled slots (8..=23) never get one, whichever scheduler owns them.
pub fn hint_eligible(item_index: usize) -> bool {
    item_index < HINT_LOWER_BOUND || item_index > HINT_UPPER_BOUND
}

// ==================== Teacher ====================

#[derive(Clone, Copy, Debug)]
struct PendingTrial {
    item_index: usize,
    trial_kind: TrialKind,
    condition: Condition,
}

#[derive(Debug)]
pub struct Teacher {
    config: TeacherConfig,
    memory: PlaceMemoryModel,
    spacing: SpacingScheduler,
    flashcard: FlashcardScheduler,
    calibration: CalibrationSession,
    ledger: TrialLedger,
    pending: Option<PendingTrial>,
    pending_calibration: Option<usize>,
    current_place: Option<usize>,
    phase: Option<Condition>,
    /// Latest session time seen: trial requests and accepted result timestamps
    clock: f64,
    started_at: DateTime<Utc>,
    finalized: bool,
}

impl Teacher {
    /// Build a session. The roster is shuffled once with `rng` and the
    /// calibration points are drawn from it.
    pub fn new<R: Rng + ?Sized>(
        mut roster: Vec<Place>,
        config: TeacherConfig,
        rng: &mut R,
    ) -> TeacherResult<Self> {
        config.validate()?;
        if roster.len() < MIN_ROSTER_SIZE {
            return Err(TeacherError::RosterTooSmall {
                required: MIN_ROSTER_SIZE,
                actual: roster.len(),
            });
        }

        roster.shuffle(rng);
        let calibration = CalibrationSession::generate(&config, rng)?;
        let flashcard = FlashcardScheduler::new(roster.len());
        let spacing = SpacingScheduler::from_config(&config);
        let memory = PlaceMemoryModel::new(roster, MemoryParams::from(&config));

        info!(
            subject = %config.subject,
            places = memory.len(),
            spacing_first = config.spacing_first,
            "session created"
        );

        Ok(Self {
            config,
            memory,
            spacing,
            flashcard,
            calibration,
            ledger: TrialLedger::new(),
            pending: None,
            pending_calibration: None,
            current_place: None,
            phase: None,
            clock: 0.0,
            started_at: Utc::now(),
            finalized: false,
        })
    }

    /// Build a session with a ChaCha8 generator seeded from `config.seed`,
    /// or from the system time when no seed is set.
    pub fn with_seed(roster: Vec<Place>, config: TeacherConfig) -> TeacherResult<Self> {
        let seed = config.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::new(roster, config, &mut rng)
    }

    fn ensure_open(&self) -> TeacherResult<()> {
        if self.finalized {
            Err(TeacherError::SessionFinalized)
        } else {
            Ok(())
        }
    }

    // ==================== Calibration ====================

    /// Present the next calibration point.
    ///
    /// Returns `None` once every point has been answered; the first such call
    /// computes the average pointer speed.
    pub fn next_calibration_trial(&mut self) -> TeacherResult<Option<CalibrationDescriptor>> {
        self.ensure_open()?;
        if let Some(calib_index) = self.pending_calibration {
            return Err(TeacherError::CalibrationAlreadyPending { calib_index });
        }
        if self.calibration.is_complete() {
            return Ok(None);
        }
        if self.calibration.all_presented() {
            self.calibration.complete(self.ledger.calibrations())?;
            return Ok(None);
        }

        let descriptor = self.calibration.next_point();
        self.pending_calibration = descriptor.map(|d| d.calib_index);
        Ok(descriptor)
    }

    pub fn submit_calibration_result(&mut self, outcome: CalibrationOutcome) -> TeacherResult<()> {
        self.ensure_open()?;
        let calib_index = self
            .pending_calibration
            .ok_or(TeacherError::NoPendingCalibration)?;
        validate_calibration_outcome(&outcome)?;

        if let Err(err) = self
            .ledger
            .record_calibration(CalibrationResult::new(calib_index, &outcome))
        {
            warn!(error = %err, calib_index, "calibration result rejected");
            return Err(err);
        }
        self.pending_calibration = None;
        Ok(())
    }

    pub fn done_calibrating(&self) -> bool {
        self.calibration.is_complete()
    }

    pub fn estimated_avg_speed(&self) -> Option<f64> {
        self.calibration.estimated_avg_speed()
    }

    // ==================== Trials ====================

    /// Choose the next trial at `elapsed` seconds into the session
    pub fn next_trial(&mut self, elapsed: f64) -> TeacherResult<TrialDescriptor> {
        self.ensure_open()?;
        if !(elapsed.is_finite() && elapsed >= 0.0) {
            return Err(TeacherError::InvalidTime(elapsed));
        }
        if let Some(pending) = self.pending {
            return Err(TeacherError::TrialAlreadyPending {
                item_index: pending.item_index,
            });
        }
        if elapsed < self.clock {
            return Err(TeacherError::ClockWentBackwards {
                previous: self.clock,
                requested: elapsed,
            });
        }

        let condition = select_phase(
            elapsed,
            self.config.experiment_length,
            self.config.spacing_first,
        );
        let (item_index, trial_kind) = match condition {
            Condition::Spacing => {
                let signal = self.recall_signal()?;
                self.spacing.next_place(&mut self.memory, signal, elapsed)
            }
            Condition::Flashcard => self.flashcard.next_place(&mut self.memory),
        };

        if self.phase != Some(condition) {
            info!(?condition, elapsed, "phase started");
            self.phase = Some(condition);
        }
        self.clock = elapsed;

        self.pending = Some(PendingTrial {
            item_index,
            trial_kind,
            condition,
        });
        self.current_place = Some(item_index);

        let descriptor = TrialDescriptor {
            item_index,
            trial_kind,
            hint_eligible: hint_eligible(item_index),
            condition,
        };
        debug!(
            item = item_index,
            kind = ?trial_kind,
            ?condition,
            hint = descriptor.hint_eligible,
            "next trial"
        );
        Ok(descriptor)
    }

    /// Latency signal of the last completed trial for the spacing model
    fn recall_signal(&self) -> TeacherResult<RecallSignal> {
        let speed = self
            .calibration
            .estimated_avg_speed()
            .ok_or(TeacherError::CalibrationIncomplete)?;

        let latency = match self.ledger.last_trial() {
            Some(trial) if trial.correct => trial.response_time,
            Some(_) => self.config.penalty_latency,
            None => 0.0,
        };
        let fixed_travel_time = self
            .ledger
            .last_two_trials()
            .map(|(previous, last)| {
                self.memory
                    .fixed_travel_time(previous.place_index, last.place_index, speed)
            })
            .unwrap_or(0.0);

        Ok(RecallSignal {
            latency,
            fixed_travel_time,
        })
    }

    /// Record the outcome of the pending trial
    pub fn submit_trial_result(&mut self, outcome: TrialOutcome) -> TeacherResult<()> {
        self.ensure_open()?;
        let pending = self.pending.ok_or(TeacherError::NoPendingTrial)?;
        if outcome.item_index != pending.item_index {
            return Err(TeacherError::ItemMismatch {
                expected: pending.item_index,
                actual: outcome.item_index,
            });
        }
        validate_trial_outcome(&outcome)?;

        let name = self
            .memory
            .place(pending.item_index)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let result = TrialResult::new(
            pending.trial_kind,
            pending.condition,
            pending.item_index,
            name,
            &outcome,
        );
        if let Err(err) = self.ledger.record_trial(result) {
            warn!(error = %err, item = pending.item_index, "trial result rejected");
            return Err(err);
        }

        if pending.condition == Condition::Flashcard {
            self.flashcard.record_outcome(outcome.correct);
        }
        self.clock = self.clock.max(outcome.timestamp);
        self.pending = None;
        Ok(())
    }

    pub fn pending_trial(&self) -> Option<TrialDescriptor> {
        self.pending.map(|p| TrialDescriptor {
            item_index: p.item_index,
            trial_kind: p.trial_kind,
            hint_eligible: hint_eligible(p.item_index),
            condition: p.condition,
        })
    }

    // ==================== Scores ====================

    pub fn percentage_correct(&self, n: usize) -> u32 {
        self.ledger.percentage_correct(n)
    }

    /// Running score shown to the subject
    pub fn score_feedback(&self) -> u32 {
        self.ledger.percentage_correct(self.config.score_window)
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &TeacherConfig {
        &self.config
    }

    pub fn memory(&self) -> &PlaceMemoryModel {
        &self.memory
    }

    pub fn ledger(&self) -> &TrialLedger {
        &self.ledger
    }

    pub fn spacing(&self) -> &SpacingScheduler {
        &self.spacing
    }

    pub fn flashcard(&self) -> &FlashcardScheduler {
        &self.flashcard
    }

    pub fn calibration(&self) -> &CalibrationSession {
        &self.calibration
    }

    pub fn place(&self, i: usize) -> Option<&Place> {
        self.memory.place(i)
    }

    pub fn calibration_point(&self, i: usize) -> Option<&CalibrationPoint> {
        self.calibration.point(i)
    }

    /// Place of the most recently scheduled trial
    pub fn current_place(&self) -> Option<&Place> {
        self.current_place.and_then(|i| self.memory.place(i))
    }

    pub fn current_calibration_point(&self) -> Option<&CalibrationPoint> {
        self.calibration.current_point()
    }

    /// Latest session time accepted so far
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // ==================== Export ====================

    /// Build both export views without ending the session
    pub fn export(&self) -> SessionExport {
        let subject = &self.config.subject;
        SessionExport {
            subject: subject.clone(),
            date: self.started_at.format("%Y-%m-%d %H:%M").to_string(),
            spacing_first: self.config.spacing_first,
            estimated_avg_speed: self.calibration.estimated_avg_speed(),
            config: self.config.clone(),
            rows: self.ledger.rows(subject),
            calibration_rows: self.ledger.calibrations().to_vec(),
            places: self.ledger.place_histories(
                &self.memory,
                self.spacing.pool_size(),
                self.flashcard.slots(),
            ),
        }
    }

    /// End the session and flush the export to `sink`.
    ///
    /// Only the first successful call writes; later calls return `Ok(false)`
    /// and leave the sink untouched.
    pub fn finalize<S: ExportSink + ?Sized>(&mut self, sink: &mut S) -> TeacherResult<bool> {
        if self.finalized {
            debug!("finalize called on a finalized session");
            return Ok(false);
        }

        let export = self.export();
        sink.write_session(&export)?;
        self.finalized = true;

        info!(
            subject = %export.subject,
            trials = export.rows.len(),
            score = self.ledger.percentage_correct(export.rows.len()),
            "session finalized"
        );
        Ok(true)
    }
}

// ==================== Unit Tests ====================
