//! Tracing setup for the simulator and embedding hosts.
//!
//! Console output goes to stderr so stdout stays free for the session
//! export. With `TOPO_LOG_FILE=1` a daily rolling file per subject is
//! written to `TOPO_LOG_DIR` as well.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{TeacherError, TeacherResult};

/// Keeps the non-blocking file writer alive; drop it last.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info,topo_teacher::spacing=debug`
    pub filter: String,
    /// Directory for the rolling session log, `None` disables it
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// `RUST_LOG`, `TOPO_LOG_FILE` and `TOPO_LOG_DIR`
    pub fn from_env() -> Self {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let file_enabled = std::env::var("TOPO_LOG_FILE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let file_dir = file_enabled.then(|| {
            std::env::var("TOPO_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs"))
        });
        Self { filter, file_dir }
    }
}

/// File name prefix of the rolling log, one file set per subject
pub fn log_file_prefix(subject: &str) -> String {
    let cleaned: String = subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "session.log".to_string()
    } else {
        format!("session-{cleaned}.log")
    }
}

/// Install the global subscriber.
///
/// Fails with `TeacherError::Config` if a subscriber is already installed.
/// A log directory that cannot be created only disables the file layer.
pub fn init_tracing(settings: &LogSettings, subject: &str) -> TeacherResult<Option<FileLogGuard>> {
    let env_filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let mut guard = None;
    let file_layer = match &settings.file_dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender =
                    RollingFileAppender::new(Rotation::DAILY, dir, log_file_prefix(subject));
                let (writer, worker) = tracing_appender::non_blocking(appender);
                guard = Some(FileLogGuard { _guard: worker });
                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(err) => {
                eprintln!("failed to create log directory {}: {err}", dir.display());
                None
            }
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| TeacherError::Config(format!("tracing already initialized: {e}")))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_prefix_sanitizes_subject() {
        assert_eq!(log_file_prefix("s01"), "session-s01.log");
        assert_eq!(log_file_prefix("a b/c"), "session-a_b_c.log");
        assert_eq!(log_file_prefix(""), "session.log");
    }

    #[test]
    fn test_default_settings_log_to_console_only() {
        let settings = LogSettings::default();
        assert_eq!(settings.filter, "info");
        assert!(settings.file_dir.is_none());
    }
}
