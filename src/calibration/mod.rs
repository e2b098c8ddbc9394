//! Pointer Speed Calibration
//!
//! Before the learning trials start the subject clicks a handful of synthetic
//! points. The average pointer speed over those clicks (ignoring the first
//! few as warm-up) is used to separate movement time from retrieval time in
//! observed latencies.
//!
//! - Speed: v = Σ distance[warmup..] / Σ RT[warmup..]

use rand::Rng;
use tracing::info;

use crate::config::TeacherConfig;
use crate::error::{TeacherError, TeacherResult};
use crate::types::{CalibrationDescriptor, CalibrationPoint, CalibrationResult};

/// Upper bound on rejected candidates while placing calibration points
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

#[derive(Clone, Debug)]
pub struct CalibrationSession {
    points: Vec<CalibrationPoint>,
    /// Index of the last presented point
    cursor: Option<usize>,
    warmup: usize,
    estimated_avg_speed: Option<f64>,
}

impl CalibrationSession {
    pub fn new(points: Vec<CalibrationPoint>, warmup: usize) -> Self {
        Self {
            points,
            cursor: None,
            warmup,
            estimated_avg_speed: None,
        }
    }

    /// Place `max_calibration` points inside the screen margins, keeping
    /// them at least `calibration_min_spacing` apart.
    pub fn generate<R: Rng + ?Sized>(config: &TeacherConfig, rng: &mut R) -> TeacherResult<Self> {
        let x_range = config.calibration_margin..config.screen_width - config.calibration_margin;
        let y_range = config.calibration_margin..config.screen_height - config.calibration_margin;
        if x_range.is_empty() || y_range.is_empty() {
            return Err(TeacherError::Config(
                "calibration area is empty".to_string(),
            ));
        }

        let mut points: Vec<CalibrationPoint> = Vec::with_capacity(config.max_calibration);
        let mut attempts = 0;
        while points.len() < config.max_calibration {
            attempts += 1;
            if attempts > MAX_PLACEMENT_ATTEMPTS {
                return Err(TeacherError::Config(format!(
                    "could not place {} calibration points {}px apart",
                    config.max_calibration, config.calibration_min_spacing
                )));
            }

            let x = rng.gen_range(x_range.clone());
            let y = rng.gen_range(y_range.clone());
            let accepted = points
                .iter()
                .all(|p| p.distance_to(x, y) >= config.calibration_min_spacing);
            if accepted {
                points.push(CalibrationPoint { x, y });
            }
        }

        Ok(Self::new(points, config.calibration_warmup))
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn point(&self, i: usize) -> Option<&CalibrationPoint> {
        self.points.get(i)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Point currently presented to the subject
    pub fn current_point(&self) -> Option<&CalibrationPoint> {
        self.cursor.and_then(|i| self.points.get(i))
    }

    /// True once every point has been presented
    pub fn all_presented(&self) -> bool {
        match self.cursor {
            Some(i) => i + 1 >= self.points.len(),
            None => self.points.is_empty(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.estimated_avg_speed.is_some()
    }

    pub fn estimated_avg_speed(&self) -> Option<f64> {
        self.estimated_avg_speed
    }

    /// Advance to the next point
    pub fn next_point(&mut self) -> Option<CalibrationDescriptor> {
        if self.all_presented() {
            return None;
        }
        let next = self.cursor.map_or(0, |i| i + 1);
        self.cursor = Some(next);
        Some(CalibrationDescriptor { calib_index: next })
    }

    /// Estimate the average pointer speed from the completed calibration
    /// trials. Only valid once every point has been presented and answered.
    pub fn complete(&mut self, results: &[CalibrationResult]) -> TeacherResult<f64> {
        if let Some(speed) = self.estimated_avg_speed {
            return Ok(speed);
        }
        if !self.all_presented() || results.len() < self.points.len() {
            return Err(TeacherError::InsufficientCalibrationData {
                required: self.points.len(),
                actual: results.len(),
            });
        }

        let samples = results.get(self.warmup..).unwrap_or_default();
        let distance: f64 = samples.iter().map(|r| r.distance_traveled).sum();
        let response_time: f64 = samples.iter().map(|r| r.response_time).sum();
        let speed = distance / response_time;

        if !(response_time > 0.0 && speed.is_finite() && speed > 0.0) {
            return Err(TeacherError::DegenerateCalibration {
                distance,
                response_time,
            });
        }

        info!(
            speed,
            samples = samples.len(),
            "calibration complete"
        );
        self.estimated_avg_speed = Some(speed);
        Ok(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CalibrationOutcome;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPSILON: f64 = 1e-10;

    fn results(distances: &[f64], rts: &[f64]) -> Vec<CalibrationResult> {
        distances
            .iter()
            .zip(rts)
            .enumerate()
            .map(|(i, (&d, &rt))| {
                CalibrationResult::new(
                    i,
                    &CalibrationOutcome {
                        response_time: rt,
                        avg_velocity: 0.0,
                        distance_traveled: d,
                        shortest_path: d,
                        timestamp: i as f64,
                    },
                )
            })
            .collect()
    }

    fn fixed_points(count: usize) -> Vec<CalibrationPoint> {
        (0..count)
            .map(|i| CalibrationPoint {
                x: 100 + i as i32 * 60,
                y: 200,
            })
            .collect()
    }

    fn presented_session() -> CalibrationSession {
        let mut session = CalibrationSession::new(fixed_points(5), 2);
        while session.next_point().is_some() {}
        session
    }

    #[test]
    fn test_points_presented_in_order() {
        let mut session = CalibrationSession::new(fixed_points(5), 2);
        let indices: Vec<usize> = std::iter::from_fn(|| session.next_point())
            .map(|d| d.calib_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert!(session.all_presented());
        assert_eq!(session.cursor(), Some(4));
    }

    #[test]
    fn test_speed_discards_warmup_trials() {
        let mut session = presented_session();
        let data = results(&[999.0, 1.0, 100.0, 150.0, 200.0], &[0.5, 7.0, 2.0, 3.0, 4.0]);

        let speed = session.complete(&data).unwrap();
        assert!((speed - 50.0).abs() < EPSILON);
        assert_eq!(session.estimated_avg_speed(), Some(speed));
    }

    #[test]
    fn test_complete_requires_all_points() {
        let mut session = CalibrationSession::new(fixed_points(5), 2);
        session.next_point();
        let data = results(&[10.0], &[1.0]);
        assert!(matches!(
            session.complete(&data),
            Err(TeacherError::InsufficientCalibrationData { .. })
        ));
        assert!(!session.is_complete());
    }

    #[test]
    fn test_zero_response_time_is_degenerate() {
        let mut session = presented_session();
        let data = results(&[10.0; 5], &[1.0, 1.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            session.complete(&data),
            Err(TeacherError::DegenerateCalibration { .. })
        ));
    }

    #[test]
    fn test_generated_points_respect_margin_and_spacing() {
        let config = TeacherConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let session = CalibrationSession::generate(&config, &mut rng).unwrap();

        assert_eq!(session.points().len(), config.max_calibration);
        for (i, p) in session.points().iter().enumerate() {
            assert!(p.x >= 100 && p.x < config.screen_width - 100);
            assert!(p.y >= 100 && p.y < config.screen_height - 100);
            for q in &session.points()[i + 1..] {
                assert!(p.distance_to(q.x, q.y) >= config.calibration_min_spacing);
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic_for_seed() {
        let config = TeacherConfig::default();
        let a = CalibrationSession::generate(&config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        let b = CalibrationSession::generate(&config, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert_eq!(a.points(), b.points());
    }
}
