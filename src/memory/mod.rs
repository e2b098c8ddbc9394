//! Place Memory Model - per-item base-level activation
//!
//! Core theory:
//! - Based on the ACT-R base-level learning equation
//! - Every presentation of a place leaves a trace that fades with its own decay
//! - Decay of a new trace grows with the activation the item already had
//!   (spacing effect) and with a per-item alpha fitted to observed latencies
//!
//! Mathematical formulas:
//! - Activation: A = ln(Σ_j (t - t_j)^(-d_j))
//!   - t_j: time of the j-th presentation (seconds)
//!   - d_j: decay of the j-th presentation
//!
//! - Decay of a new trace: d = c · e^A + α   (d = c + α while A is still 0)
//!
//! - Expected latency: L = F · e^(-A) + fixed travel time
//!
//! - Alpha update (after 3 presentations):
//!   - L_obs > L_exp: α += max(0.01, (L_obs - L_exp) / 1000)
//!   - L_obs < L_exp: α += min(-0.01, (L_obs - L_exp) / 1000)
//!
//! References:
//! - Pavlik Jr, P. I., & Anderson, J. R. (2005). Practice and forgetting effects.
//! - van Rijn, H., van Maanen, L., & van Woudenberg, M. (2009). Passing the test:
//!   improving learning gains by balancing spacing and testing effects.

use tracing::{trace, warn};

use crate::config::TeacherConfig;
use crate::types::Place;

// ==================== Constants ====================

/// Minimum age of a trace (prevent 0^(-d))
const MIN_AGE: f64 = 1e-3;

/// Presentations required before alpha is fitted to latencies
const MIN_PRESENTATIONS_FOR_ALPHA: usize = 3;

/// Smallest alpha adjustment in either direction
const MIN_ALPHA_STEP: f64 = 0.01;

/// Latency difference is divided by this before it is applied to alpha
const ALPHA_STEP_DIVISOR: f64 = 1000.0;

// ==================== Parameters ====================

/// Constants of the memory equations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryParams {
    /// F in the latency equation
    pub latency_scale: f64,
    /// Alpha used while an item has fewer than 3 presentations
    pub default_alpha: f64,
    /// c in the decay equation
    pub decay_constant: f64,
}

impl Default for MemoryParams {
    fn default() -> Self {
        Self {
            latency_scale: 1.0,
            default_alpha: 0.25,
            decay_constant: 0.25,
        }
    }
}

impl From<&TeacherConfig> for MemoryParams {
    fn from(config: &TeacherConfig) -> Self {
        Self {
            latency_scale: config.latency_scale,
            default_alpha: config.default_alpha,
            decay_constant: config.decay_constant,
        }
    }
}

// ==================== Memory Model ====================

/// Arena of places indexed by their (fixed) roster slot.
///
/// All mutation of a place's trace goes through this type. Indices are
/// produced by the schedulers and are always in range; passing an index
/// outside the roster panics.
#[derive(Clone, Debug)]
pub struct PlaceMemoryModel {
    places: Vec<Place>,
    params: MemoryParams,
}

impl PlaceMemoryModel {
    pub fn new(places: Vec<Place>, params: MemoryParams) -> Self {
        Self { places, params }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn place(&self, i: usize) -> Option<&Place> {
        self.places.get(i)
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn params(&self) -> MemoryParams {
        self.params
    }

    /// Cached activation of an item
    pub fn activation(&self, i: usize) -> f64 {
        self.places[i].act
    }

    /// Append a presentation timestamp and count the show
    pub fn record_presentation(&mut self, i: usize, now: f64) {
        let place = &mut self.places[i];
        place.times.push(now);
        place.num_shows += 1;
    }

    /// Count a show without leaving a memory trace
    pub fn record_show(&mut self, i: usize) {
        self.places[i].num_shows += 1;
    }

    /// Mark an item as shown. Returns true the first time.
    pub fn mark_shown(&mut self, i: usize) -> bool {
        let place = &mut self.places[i];
        let first = !place.shown_before;
        place.shown_before = true;
        first
    }

    /// Activation of an item at `now` from its rehearsed presentations.
    ///
    /// Only presentations that already have a decay contribute; the latest
    /// presentation of an item that has not been revisited yet is skipped.
    /// Returns `None` if no presentation has a decay.
    pub fn activation_at(&self, i: usize, now: f64) -> Option<f64> {
        let place = &self.places[i];
        let paired = place.times.len().min(place.decays.len());
        if paired == 0 {
            return None;
        }

        let sum: f64 = place.times[..paired]
            .iter()
            .zip(&place.decays[..paired])
            .map(|(&t, &d)| (now - t).max(MIN_AGE).powf(-d))
            .sum();

        if sum > 0.0 && sum.is_finite() {
            Some(sum.ln())
        } else {
            None
        }
    }

    /// Expected response latency: F · e^(-A) + fixed travel time.
    ///
    /// Uses the activation estimated at `now`, or the cached one if nothing
    /// has been rehearsed yet.
    pub fn expected_latency(&self, i: usize, now: f64, fixed_travel_time: f64) -> f64 {
        let act = self
            .activation_at(i, now)
            .unwrap_or(self.places[i].act);
        self.params.latency_scale * (-act).exp() + fixed_travel_time
    }

    /// Fixed time needed to move the pointer between two places at the
    /// calibrated average speed.
    pub fn fixed_travel_time(&self, from: usize, to: usize, avg_speed: f64) -> f64 {
        let (x, y) = self.places[from].coords();
        self.places[to].distance_to(x, y) / avg_speed
    }

    /// Append the next alpha of item `i` and return it.
    pub fn update_alpha(
        &mut self,
        i: usize,
        observed_latency: f64,
        now: f64,
        fixed_travel_time: f64,
    ) -> f64 {
        let default_alpha = self.params.default_alpha;
        if self.places[i].times.len() < MIN_PRESENTATIONS_FOR_ALPHA {
            self.places[i].alpha.push(default_alpha);
            return default_alpha;
        }

        let expected = self.expected_latency(i, now, fixed_travel_time);
        let place = &mut self.places[i];
        let previous = place.alpha.last().copied().unwrap_or(default_alpha);
        let alpha = alpha_step(previous, observed_latency, expected);
        place.alpha.push(alpha);

        trace!(
            item = i,
            observed = observed_latency,
            expected,
            alpha,
            "alpha updated"
        );
        alpha
    }

    /// Append the decay of item `i`'s latest presentation and return it.
    pub fn update_decay(
        &mut self,
        i: usize,
        latency: f64,
        now: f64,
        fixed_travel_time: f64,
    ) -> f64 {
        let act = self.places[i].act;
        let c = self.params.decay_constant;
        let alpha = self.update_alpha(i, latency, now, fixed_travel_time);
        let decay = if act == 0.0 {
            c + alpha
        } else {
            c * act.exp() + alpha
        };
        self.places[i].decays.push(decay);
        decay
    }

    /// Refresh cached activations of the first `count` items at `now`.
    ///
    /// `count == 0` refreshes item 0 alone.
    pub fn recompute_activations(&mut self, count: usize, now: f64) {
        let upto = count.max(1).min(self.places.len());
        for i in 0..upto {
            match self.activation_at(i, now) {
                Some(act) => self.places[i].act = act,
                None if !self.places[i].decays.is_empty() => warn!(
                    item = i,
                    now,
                    cached = self.places[i].act,
                    "activation not finite, keeping cached value"
                ),
                None => {}
            }
        }
    }

    /// Index of the lowest cached activation among the first `count` items.
    ///
    /// Ties go to the lowest index.
    pub fn argmin_activation(&self, count: usize) -> usize {
        let upto = count.min(self.places.len());
        let mut best = 0;
        for i in 1..upto {
            if self.places[i].act < self.places[best].act {
                best = i;
            }
        }
        best
    }
}

// ==================== Standalone Functions ====================

/// Next alpha given the previous one and an observed/expected latency pair
pub fn alpha_step(previous: f64, observed: f64, expected: f64) -> f64 {
    let diff = observed - expected;
    if diff > 0.0 {
        previous + (diff / ALPHA_STEP_DIVISOR).max(MIN_ALPHA_STEP)
    } else if diff < 0.0 {
        previous + (diff / ALPHA_STEP_DIVISOR).min(-MIN_ALPHA_STEP)
    } else {
        previous
    }
}

// ==================== Unit Tests ====================
