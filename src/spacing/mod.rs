//! Spacing Scheduler - introduce or rehearse
//!
//! Works over the first `pool_size` roster slots, introducing them in roster
//! order. Before every decision the previous item's new trace gets its decay,
//! all introduced items get a fresh activation, and then:
//!
//! 1. nothing introduced yet: present item 0 as a learning trial
//! 2. lowest activation below threshold: rehearse that item (quiz)
//! 3. otherwise, while the pool is not exhausted: introduce the next item
//! 4. pool exhausted: always rehearse the lowest activation item
//!
//! The lowest activation is found with a linear scan. With at most 16 items
//! this is cheaper than maintaining a heap.

use tracing::debug;

use crate::config::TeacherConfig;
use crate::memory::PlaceMemoryModel;
use crate::types::TrialKind;

/// What the previous spacing trial tells the memory model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecallSignal {
    /// Response time of the previous trial, or the penalty latency if it was wrong
    pub latency: f64,
    /// Pointer travel time between the last two trial locations
    pub fixed_travel_time: f64,
}

#[derive(Clone, Debug)]
pub struct SpacingScheduler {
    pool_size: usize,
    threshold: f64,
    /// Items introduced so far (also the index of the next new item)
    introduced: usize,
    last_place: usize,
}

impl SpacingScheduler {
    pub fn new(pool_size: usize, threshold: f64) -> Self {
        Self {
            pool_size,
            threshold,
            introduced: 0,
            last_place: 0,
        }
    }

    pub fn from_config(config: &TeacherConfig) -> Self {
        Self::new(config.spacing_pool_size, config.activation_threshold)
    }

    pub fn introduced(&self) -> usize {
        self.introduced
    }

    pub fn last_place(&self) -> usize {
        self.last_place
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn pool_exhausted(&self) -> bool {
        self.introduced >= self.pool_size
    }

    /// Pick the next spacing item at session time `now`.
    ///
    /// `signal` describes the previous spacing trial and is ignored for the
    /// very first call.
    pub fn next_place(
        &mut self,
        memory: &mut PlaceMemoryModel,
        signal: RecallSignal,
        now: f64,
    ) -> (usize, TrialKind) {
        if self.introduced == 0 {
            return self.introduce(memory, now);
        }

        memory.update_decay(self.last_place, signal.latency, now, signal.fixed_travel_time);
        memory.recompute_activations(self.introduced, now);

        let weakest = memory.argmin_activation(self.introduced);
        let weakest_act = memory.activation(weakest);

        if self.pool_exhausted() || weakest_act < self.threshold {
            debug!(item = weakest, activation = weakest_act, "rehearse");
            self.rehearse(memory, weakest, now)
        } else {
            debug!(
                item = self.introduced,
                lowest_activation = weakest_act,
                "introduce"
            );
            self.introduce(memory, now)
        }
    }

    fn introduce(&mut self, memory: &mut PlaceMemoryModel, now: f64) -> (usize, TrialKind) {
        let item = self.introduced;
        memory.record_presentation(item, now);
        self.last_place = item;
        self.introduced += 1;
        (item, TrialKind::Learning)
    }

    fn rehearse(
        &mut self,
        memory: &mut PlaceMemoryModel,
        item: usize,
        now: f64,
    ) -> (usize, TrialKind) {
        memory.record_presentation(item, now);
        self.last_place = item;
        (item, TrialKind::Quiz)
    }
}

// ==================== Unit Tests ====================
