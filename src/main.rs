use std::io::Write;
use std::process::ExitCode;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use topo_teacher::logging::{init_tracing, LogSettings};
use topo_teacher::simulation::{run_session, synthetic_roster, SimulatedSubject};
use topo_teacher::{ExportSink, SessionExport, Teacher, TeacherConfig, TeacherError, TeacherResult};

/// Writes the export as pretty JSON to stdout
struct StdoutJsonSink;

impl ExportSink for StdoutJsonSink {
    fn write_session(&mut self, export: &SessionExport) -> TeacherResult<()> {
        let mut out = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, export)
            .map_err(|e| TeacherError::Export(e.to_string()))?;
        writeln!(out).map_err(|e| TeacherError::Export(e.to_string()))
    }
}

fn run(config: TeacherConfig) -> TeacherResult<()> {
    let seed = config.seed.unwrap_or(42);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let roster = synthetic_roster(32, config.screen_width, config.screen_height, &mut rng);
    let center = (config.screen_width / 2, config.screen_height / 2);

    let mut teacher = Teacher::new(roster, config, &mut rng)?;
    let mut subject = SimulatedSubject::new(seed.wrapping_add(1), 450.0, center);
    let summary = run_session(&mut teacher, &mut subject)?;

    tracing::info!(
        trials = summary.trials,
        spacing = summary.spacing_trials,
        flashcard = summary.flashcard_trials,
        correct = summary.correct,
        "session summary"
    );
    teacher.finalize(&mut StdoutJsonSink)?;
    Ok(())
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let mut config = TeacherConfig::from_env();
    let _log_guard = match init_tracing(&LogSettings::from_env(), &config.subject) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{err}");
            None
        }
    };

    // "A" starts the session with flashcards
    if std::env::args().nth(1).as_deref() == Some("A") {
        config.spacing_first = false;
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "session failed");
            ExitCode::FAILURE
        }
    }
}
