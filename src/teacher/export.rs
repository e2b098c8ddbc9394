//! Session export bundle and the sink it is flushed to

use serde::{Deserialize, Serialize};

use crate::config::TeacherConfig;
use crate::error::TeacherResult;
use crate::ledger::{PlaceHistory, TrialRow};
use crate::types::CalibrationResult;

/// Everything the persistence layer needs to store one session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub subject: String,
    /// Session start, "%Y-%m-%d %H:%M"
    pub date: String,
    pub spacing_first: bool,
    pub estimated_avg_speed: Option<f64>,
    pub config: TeacherConfig,
    pub rows: Vec<TrialRow>,
    pub calibration_rows: Vec<CalibrationResult>,
    pub places: Vec<PlaceHistory>,
}

/// Receives the session export when a session is finalized.
///
/// The file format is up to the implementation.
pub trait ExportSink {
    fn write_session(&mut self, export: &SessionExport) -> TeacherResult<()>;
}

impl ExportSink for Vec<SessionExport> {
    fn write_session(&mut self, export: &SessionExport) -> TeacherResult<()> {
        self.push(export.clone());
        Ok(())
    }
}
