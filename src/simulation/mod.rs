//! Simulated Subject
//!
//! Drives a complete session without a window: a synthetic subject answers
//! calibration points and trials with latencies derived from pointer travel
//! and, for spacing items, from the place's current activation.
//!
//! Recall model used by the subject:
//! - spacing items: P = 1 / (1 + exp(-(A - τ) / s))
//! - items without a rehearsed trace: P = 1 - 0.6^(shows - 1)
//! - learning trials are always answered correctly (the target is shown)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::error::TeacherResult;
use crate::teacher::Teacher;
use crate::types::{CalibrationOutcome, Place, TrialDescriptor, TrialKind, TrialOutcome};

// ==================== Constants ====================

/// Noise scale s of the recall probability
const RECALL_NOISE_SCALE: f64 = 0.4;

/// Per-show retention of items without a rehearsed trace
const FAMILIARITY_BASE: f64 = 0.6;

/// Feedback shown after a correct answer (seconds)
const POSITIVE_FEEDBACK: f64 = 0.75;

/// Feedback shown after a wrong answer or time-out (seconds)
const NEGATIVE_FEEDBACK: f64 = 2.0;

/// Longest a trial may run before it times out (seconds)
const MAX_TRIAL_LENGTH: f64 = 15.0;

/// Pointer paths are longer than the straight line
const PATH_OVERHEAD: f64 = 1.25;

// ==================== Subject ====================

#[derive(Clone, Debug)]
pub struct SimulatedSubject {
    rng: ChaCha8Rng,
    /// Pointer speed in pixels per second
    pointer_speed: f64,
    /// Fixed reaction overhead per click (seconds)
    motor_time: f64,
    pointer: (i32, i32),
}

impl SimulatedSubject {
    pub fn new(seed: u64, pointer_speed: f64, start: (i32, i32)) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            pointer_speed,
            motor_time: 0.3,
            pointer: start,
        }
    }

    fn travel(&mut self, target: (i32, i32)) -> (f64, f64) {
        let shortest = f64::from((target.0 - self.pointer.0).abs() + (target.1 - self.pointer.1).abs());
        let jitter = self.rng.gen_range(1.0..PATH_OVERHEAD);
        self.pointer = target;
        (shortest * jitter, shortest)
    }

    pub fn answer_calibration(&mut self, target: (i32, i32), started_at: f64) -> CalibrationOutcome {
        let (distance, shortest) = self.travel(target);
        let response_time = distance / self.pointer_speed + self.motor_time;
        CalibrationOutcome {
            response_time,
            avg_velocity: distance / response_time,
            distance_traveled: distance,
            shortest_path: shortest,
            timestamp: started_at + response_time,
        }
    }

    fn recall_probability(teacher: &Teacher, place: &Place, index: usize, now: f64) -> f64 {
        match teacher.memory().activation_at(index, now) {
            Some(act) => {
                let tau = teacher.config().activation_threshold;
                1.0 / (1.0 + (-(act - tau) / RECALL_NOISE_SCALE).exp())
            }
            None => 1.0 - FAMILIARITY_BASE.powi(place.num_shows.saturating_sub(1) as i32),
        }
    }

    pub fn answer_trial(
        &mut self,
        teacher: &Teacher,
        trial: &TrialDescriptor,
        started_at: f64,
    ) -> TrialOutcome {
        let (place, target) = match teacher.place(trial.item_index) {
            Some(place) => (place.clone(), place.coords()),
            None => (Place::new(0, 0, "", 0.0), self.pointer),
        };

        let p_recall = match trial.trial_kind {
            TrialKind::Learning => 1.0,
            TrialKind::Quiz => Self::recall_probability(teacher, &place, trial.item_index, started_at),
        };
        let correct = self.rng.gen_bool(p_recall.clamp(0.0, 1.0));

        let (distance, shortest) = self.travel(target);
        let response_time = if correct {
            let retrieval = self.rng.gen_range(0.2..1.5) * (1.0 - p_recall + 0.2);
            (distance / self.pointer_speed + self.motor_time + retrieval).min(MAX_TRIAL_LENGTH)
        } else {
            self.rng.gen_range(2.0..MAX_TRIAL_LENGTH)
        };
        let hint_used = trial.hint_eligible && response_time > 0.66 * MAX_TRIAL_LENGTH;

        TrialOutcome {
            item_index: trial.item_index,
            correct,
            hint_used,
            response_time,
            avg_velocity: distance / response_time.max(f64::EPSILON),
            distance_traveled: distance,
            shortest_path: shortest,
            timestamp: started_at + response_time,
        }
    }
}

// ==================== Session Driver ====================

/// Totals of a simulated session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub calibration_trials: usize,
    pub trials: usize,
    pub spacing_trials: usize,
    pub flashcard_trials: usize,
    pub correct: usize,
    pub elapsed: f64,
}

/// Run calibration and then trials until the configured session length
pub fn run_session(teacher: &mut Teacher, subject: &mut SimulatedSubject) -> TeacherResult<SessionSummary> {
    let mut summary = SessionSummary::default();

    let mut clock = 0.0;
    while let Some(descriptor) = teacher.next_calibration_trial()? {
        let target = teacher
            .calibration_point(descriptor.calib_index)
            .map(|p| (p.x, p.y))
            .unwrap_or_default();
        let outcome = subject.answer_calibration(target, clock);
        clock = outcome.timestamp;
        teacher.submit_calibration_result(outcome)?;
        summary.calibration_trials += 1;
    }

    // session time restarts when the trials begin
    let length = teacher.config().experiment_length;
    let mut clock = 0.0;
    while clock < length {
        let trial = teacher.next_trial(clock)?;
        let outcome = subject.answer_trial(teacher, &trial, clock);
        let correct = outcome.correct;
        clock = outcome.timestamp;
        teacher.submit_trial_result(outcome)?;

        summary.trials += 1;
        match trial.condition {
            crate::types::Condition::Spacing => summary.spacing_trials += 1,
            crate::types::Condition::Flashcard => summary.flashcard_trials += 1,
        }
        if correct {
            summary.correct += 1;
            clock += POSITIVE_FEEDBACK;
        } else {
            clock += NEGATIVE_FEEDBACK;
        }
        debug!(clock, score = teacher.score_feedback(), "trial done");
    }
    summary.elapsed = clock;

    info!(
        trials = summary.trials,
        correct = summary.correct,
        "simulated session complete"
    );
    Ok(summary)
}

/// A roster of `count` places on a jittered grid inside the screen
pub fn synthetic_roster<R: Rng + ?Sized>(count: usize, width: i32, height: i32, rng: &mut R) -> Vec<Place> {
    let columns = (count as f64).sqrt().ceil().max(1.0) as i32;
    let rows = (count as i32 + columns - 1) / columns;
    let cell_w = (width / (columns + 1)).max(1);
    let cell_h = (height / (rows + 1)).max(1);

    (0..count as i32)
        .map(|i| {
            let jitter_x = rng.gen_range(-(cell_w / 4)..=cell_w / 4);
            let jitter_y = rng.gen_range(-(cell_h / 4)..=cell_h / 4);
            let x = (i % columns + 1) * cell_w + jitter_x;
            let y = (i / columns + 1) * cell_h + jitter_y;
            Place::new(x, y, format!("place-{:02}", i + 1), 0.8)
        })
        .collect()
}
