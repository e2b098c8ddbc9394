//! Session configuration.
//!
//! Every constant of the scheduling equations lives here, so an experiment can
//! be re-parameterized from `TOPO_*` environment variables without a rebuild.

use serde::{Deserialize, Serialize};

use crate::error::{TeacherError, TeacherResult};

/// Parameters of one experiment session.
///
/// Defaults reproduce the published experiment: a 20 minute session split in
/// half between spacing and flashcards, 5 calibration points of which the
/// first 2 are warm-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherConfig {
    pub subject: String,
    /// Total session length in seconds
    pub experiment_length: f64,
    pub spacing_first: bool,
    /// Items with an activation below this value are rehearsed
    pub activation_threshold: f64,
    /// F in the latency equation
    pub latency_scale: f64,
    /// Alpha used while an item has fewer than 3 presentations
    pub default_alpha: f64,
    /// c in the decay equation
    pub decay_constant: f64,
    /// Latency assumed after a wrong answer (seconds)
    pub penalty_latency: f64,
    pub spacing_pool_size: usize,
    pub max_calibration: usize,
    pub calibration_warmup: usize,
    pub screen_width: i32,
    pub screen_height: i32,
    pub calibration_margin: i32,
    pub calibration_min_spacing: f64,
    /// Trials used for the running score shown to the subject
    pub score_window: usize,
    pub seed: Option<u64>,
}

impl Default for TeacherConfig {
    fn default() -> Self {
        Self {
            subject: "anonymous".to_string(),
            experiment_length: 20.0 * 60.0,
            spacing_first: true,
            activation_threshold: -0.5,
            latency_scale: 1.0,
            default_alpha: 0.25,
            decay_constant: 0.25,
            penalty_latency: 15.0,
            spacing_pool_size: 16,
            max_calibration: 5,
            calibration_warmup: 2,
            screen_width: 1194,
            screen_height: 760,
            calibration_margin: 100,
            calibration_min_spacing: 50.0,
            score_window: 10,
            seed: None,
        }
    }
}

impl TeacherConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            subject: std::env::var("TOPO_SUBJECT").unwrap_or(defaults.subject),
            experiment_length: env_parse("TOPO_EXPERIMENT_LENGTH")
                .unwrap_or(defaults.experiment_length),
            spacing_first: std::env::var("TOPO_SPACING_FIRST")
                .map(|v| !(v == "false" || v == "0"))
                .unwrap_or(defaults.spacing_first),
            activation_threshold: env_parse("TOPO_THRESHOLD")
                .unwrap_or(defaults.activation_threshold),
            latency_scale: env_parse("TOPO_LATENCY_SCALE").unwrap_or(defaults.latency_scale),
            default_alpha: env_parse("TOPO_DEFAULT_ALPHA").unwrap_or(defaults.default_alpha),
            decay_constant: env_parse("TOPO_DECAY_CONSTANT").unwrap_or(defaults.decay_constant),
            penalty_latency: env_parse("TOPO_PENALTY_LATENCY").unwrap_or(defaults.penalty_latency),
            spacing_pool_size: env_parse("TOPO_SPACING_POOL").unwrap_or(defaults.spacing_pool_size),
            max_calibration: env_parse("TOPO_MAX_CALIBRATION").unwrap_or(defaults.max_calibration),
            calibration_warmup: env_parse("TOPO_CALIBRATION_WARMUP")
                .unwrap_or(defaults.calibration_warmup),
            screen_width: env_parse("TOPO_SCREEN_WIDTH").unwrap_or(defaults.screen_width),
            screen_height: env_parse("TOPO_SCREEN_HEIGHT").unwrap_or(defaults.screen_height),
            calibration_margin: defaults.calibration_margin,
            calibration_min_spacing: defaults.calibration_min_spacing,
            score_window: env_parse("TOPO_SCORE_WINDOW").unwrap_or(defaults.score_window),
            seed: env_parse("TOPO_SEED"),
        }
    }

    pub fn validate(&self) -> TeacherResult<()> {
        if !(self.experiment_length.is_finite() && self.experiment_length > 0.0) {
            return Err(TeacherError::Config(format!(
                "experiment_length must be positive, got {}",
                self.experiment_length
            )));
        }
        if self.spacing_pool_size == 0 || self.spacing_pool_size > crate::types::MIN_ROSTER_SIZE / 2
        {
            return Err(TeacherError::Config(format!(
                "spacing_pool_size must be in 1..={}, got {}",
                crate::types::MIN_ROSTER_SIZE / 2,
                self.spacing_pool_size
            )));
        }
        if self.calibration_warmup >= self.max_calibration {
            return Err(TeacherError::Config(format!(
                "calibration_warmup ({}) must be smaller than max_calibration ({})",
                self.calibration_warmup, self.max_calibration
            )));
        }
        if self.penalty_latency < 0.0 || !self.penalty_latency.is_finite() {
            return Err(TeacherError::Config(
                "penalty_latency must be a non-negative number".to_string(),
            ));
        }
        let usable_width = self.screen_width - 2 * self.calibration_margin;
        let usable_height = self.screen_height - 2 * self.calibration_margin;
        if usable_width <= 0 || usable_height <= 0 {
            return Err(TeacherError::Config(format!(
                "screen {}x{} leaves no room inside a {}px margin",
                self.screen_width, self.screen_height, self.calibration_margin
            )));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}
