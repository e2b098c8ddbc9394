//! # topo-teacher - adaptive scheduling for topographic learning experiments
//!
//! A subject learns a fixed roster of named map locations. Trial by trial the
//! [`Teacher`] decides which place to ask for next, under two regimes that
//! split the session in half:
//!
//! - **Spacing** - ACT-R style introduce-or-rehearse over the first 16 slots,
//!   driven by a per-item activation fitted to response latencies
//! - **Flashcards** - fixed 4-item batches over the second half of the roster,
//!   rotated until every answer in the batch is correct
//!
//! A short calibration phase measures the subject's pointer speed first, so
//! that movement time can be separated from retrieval time.
//!
//! ## Module structure
//!
//! - [`memory`] - per-place activation, decay and alpha
//! - [`spacing`] - introduce-or-rehearse scheduler
//! - [`flashcard`] - batch rotation scheduler
//! - [`calibration`] - pointer speed estimate
//! - [`ledger`] - trial history, running score, export views
//! - [`teacher`] - session facade
//! - [`simulation`] - synthetic subject for offline runs
//!
//! ## Example
//!
//! ```rust
//! use topo_teacher::{SessionExport, Teacher, TeacherConfig};
//! use topo_teacher::simulation::{run_session, synthetic_roster, SimulatedSubject};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
//! let roster = synthetic_roster(32, 1194, 760, &mut rng);
//! let config = TeacherConfig { experiment_length: 60.0, seed: Some(1), ..Default::default() };
//!
//! let mut teacher = Teacher::with_seed(roster, config).unwrap();
//! let mut subject = SimulatedSubject::new(2, 400.0, (597, 380));
//! let summary = run_session(&mut teacher, &mut subject).unwrap();
//!
//! let mut exports: Vec<SessionExport> = Vec::new();
//! assert!(teacher.finalize(&mut exports).unwrap());
//! assert_eq!(exports[0].rows.len(), summary.trials);
//! ```

pub mod calibration;
pub mod config;
pub mod error;
pub mod flashcard;
pub mod ledger;
pub mod logging;
pub mod memory;
pub mod sanitize;
pub mod simulation;
pub mod spacing;
pub mod teacher;
pub mod types;

pub use calibration::CalibrationSession;
pub use config::TeacherConfig;
pub use error::{TeacherError, TeacherResult};
pub use flashcard::FlashcardScheduler;
pub use ledger::{PlaceHistory, TrialLedger, TrialRow};
pub use memory::{alpha_step, MemoryParams, PlaceMemoryModel};
pub use spacing::{RecallSignal, SpacingScheduler};
pub use teacher::{hint_eligible, select_phase, ExportSink, SessionExport, Teacher};
pub use types::*;
