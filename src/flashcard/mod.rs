//! Flashcard Scheduler - fixed batch rotation
//!
//! The second half of the roster is split into 4 batches of 4 items. Items of
//! the active batch are shown in rotation until the last answer for every
//! slot of the batch was correct and the batch has been through at least one
//! full repeat; then the next batch becomes active (wrapping after the last).

use tracing::{debug, info};

use crate::memory::PlaceMemoryModel;
use crate::types::{TrialKind, FLASHCARD_BATCHES, FLASHCARD_BATCH_SIZE};

/// Offset before the first trial, so the first rotation lands on 0
const INITIAL_OFFSET: usize = FLASHCARD_BATCH_SIZE - 1;

#[derive(Clone, Debug)]
pub struct FlashcardScheduler {
    /// First roster slot of the flashcard half
    base: usize,
    batch: usize,
    offset: usize,
    /// Latest outcome per offset of the active batch
    results: [bool; FLASHCARD_BATCH_SIZE],
}

impl FlashcardScheduler {
    pub fn new(roster_len: usize) -> Self {
        Self {
            base: roster_len / 2,
            batch: 0,
            offset: INITIAL_OFFSET,
            results: [false; FLASHCARD_BATCH_SIZE],
        }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn results(&self) -> [bool; FLASHCARD_BATCH_SIZE] {
        self.results
    }

    /// Roster slots handled by this scheduler
    pub fn slots(&self) -> std::ops::Range<usize> {
        self.base..self.base + FLASHCARD_BATCHES * FLASHCARD_BATCH_SIZE
    }

    fn batch_mastered(&self) -> bool {
        self.results.iter().all(|&correct| correct) && self.offset == INITIAL_OFFSET
    }

    /// Pick the next flashcard item
    pub fn next_place(&mut self, memory: &mut PlaceMemoryModel) -> (usize, TrialKind) {
        if self.batch_mastered() {
            let first = self.base + self.batch * FLASHCARD_BATCH_SIZE;
            let repeated = memory.place(first).map_or(false, |p| p.num_shows > 1);
            if repeated {
                self.batch = (self.batch + 1) % FLASHCARD_BATCHES;
                info!(batch = self.batch, "flashcard batch advanced");
            }
            self.offset = 0;
        } else {
            self.offset = (self.offset + 1) % FLASHCARD_BATCH_SIZE;
        }

        let item = self.base + self.batch * FLASHCARD_BATCH_SIZE + self.offset;
        memory.record_show(item);
        let kind = if memory.mark_shown(item) {
            TrialKind::Learning
        } else {
            TrialKind::Quiz
        };

        debug!(item, batch = self.batch, offset = self.offset, ?kind, "flashcard");
        (item, kind)
    }

    /// Store the outcome of the trial at the current offset
    pub fn record_outcome(&mut self, correct: bool) {
        self.results[self.offset] = correct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryParams;
    use crate::types::Place;

    fn memory(count: usize) -> PlaceMemoryModel {
        let places = (0..count)
            .map(|i| Place::new(i as i32, i as i32, format!("place-{i}"), 0.8))
            .collect();
        PlaceMemoryModel::new(places, MemoryParams::default())
    }

    fn run(
        scheduler: &mut FlashcardScheduler,
        model: &mut PlaceMemoryModel,
        answers: &[bool],
    ) -> Vec<usize> {
        answers
            .iter()
            .map(|&correct| {
                let (item, _) = scheduler.next_place(model);
                scheduler.record_outcome(correct);
                item
            })
            .collect()
    }

    #[test]
    fn test_first_item_is_base_learning_trial() {
        let mut model = memory(32);
        let mut scheduler = FlashcardScheduler::new(32);

        let (item, kind) = scheduler.next_place(&mut model);
        assert_eq!(item, 16);
        assert_eq!(kind, TrialKind::Learning);
        assert_eq!(model.place(16).unwrap().num_shows, 1);
        assert!(model.place(16).unwrap().times.is_empty());
    }

    #[test]
    fn test_repeat_is_quiz() {
        let mut model = memory(32);
        let mut scheduler = FlashcardScheduler::new(32);
        run(&mut scheduler, &mut model, &[false; 4]);

        let (item, kind) = scheduler.next_place(&mut model);
        assert_eq!(item, 16);
        assert_eq!(kind, TrialKind::Quiz);
    }

    #[test]
    fn test_rotates_while_answers_are_wrong() {
        let mut model = memory(32);
        let mut scheduler = FlashcardScheduler::new(32);
        let items = run(&mut scheduler, &mut model, &[false; 12]);
        let expected: Vec<usize> = (0..12).map(|i| 16 + i % 4).collect();
        assert_eq!(items, expected);
        assert_eq!(scheduler.batch(), 0);
    }

    #[test]
    fn test_batch_needs_a_second_pass_before_advancing() {
        let mut model = memory(32);
        let mut scheduler = FlashcardScheduler::new(32);

        // First pass all correct: first item was shown only once, so the
        // batch is repeated.
        let first = run(&mut scheduler, &mut model, &[true; 4]);
        assert_eq!(first, vec![16, 17, 18, 19]);
        let second = run(&mut scheduler, &mut model, &[true; 4]);
        assert_eq!(second, vec![16, 17, 18, 19]);

        // Second pass all correct: advance.
        let (item, kind) = scheduler.next_place(&mut model);
        assert_eq!(scheduler.batch(), 1);
        assert_eq!(item, 20);
        assert_eq!(kind, TrialKind::Learning);
    }

    #[test]
    fn test_single_miss_blocks_advance() {
        let mut model = memory(32);
        let mut scheduler = FlashcardScheduler::new(32);
        run(&mut scheduler, &mut model, &[true; 4]);
        run(&mut scheduler, &mut model, &[true, false, true, true]);

        let items = run(&mut scheduler, &mut model, &[true; 4]);
        assert_eq!(items, vec![16, 17, 18, 19]);
        assert_eq!(scheduler.batch(), 0);
    }

    #[test]
    fn test_batch_wraps_after_last() {
        let mut model = memory(32);
        let mut scheduler = FlashcardScheduler::new(32);
        for _ in 0..4 {
            // two correct passes per batch
            run(&mut scheduler, &mut model, &[true; 8]);
        }
        assert_eq!(scheduler.batch(), 3);
        let (item, _) = scheduler.next_place(&mut model);
        assert_eq!(scheduler.batch(), 0);
        assert_eq!(item, 16);
    }

    #[test]
    fn test_larger_roster_uses_its_half() {
        let mut model = memory(40);
        let mut scheduler = FlashcardScheduler::new(40);
        assert_eq!(scheduler.slots(), 20..36);
        let (item, _) = scheduler.next_place(&mut model);
        assert_eq!(item, 20);
    }
}
