#![allow(dead_code)]

use topo_teacher::{
    CalibrationOutcome, Place, Teacher, TeacherConfig, TrialDescriptor, TrialOutcome,
};

pub const FIXED_SEED: u64 = 20150601;

pub fn roster(count: usize) -> Vec<Place> {
    (0..count)
        .map(|i| {
            let x = 100 + (i % 8) as i32 * 120;
            let y = 100 + (i / 8) as i32 * 120;
            Place::new(x, y, format!("city-{i:02}"), 0.8)
        })
        .collect()
}

pub fn config(spacing_first: bool) -> TeacherConfig {
    TeacherConfig {
        subject: "tester".to_string(),
        experiment_length: 600.0,
        spacing_first,
        seed: Some(FIXED_SEED),
        ..Default::default()
    }
}

pub fn teacher(spacing_first: bool) -> Teacher {
    Teacher::with_seed(roster(32), config(spacing_first)).expect("valid session")
}

pub fn calibration_outcome(distance: f64, response_time: f64, timestamp: f64) -> CalibrationOutcome {
    CalibrationOutcome {
        response_time,
        avg_velocity: distance / response_time.max(1e-9),
        distance_traveled: distance,
        shortest_path: distance,
        timestamp,
    }
}

/// Calibrate with distances [500, 500, 100, 150, 200] over [9, 9, 2, 3, 4]
/// seconds, giving an estimated speed of 50 px/s.
pub fn calibrate(teacher: &mut Teacher) {
    let data = [(500.0, 9.0), (500.0, 9.0), (100.0, 2.0), (150.0, 3.0), (200.0, 4.0)];
    let mut clock = 0.0;
    for (distance, rt) in data {
        teacher
            .next_calibration_trial()
            .expect("calibration step")
            .expect("point available");
        clock += rt;
        teacher
            .submit_calibration_result(calibration_outcome(distance, rt, clock))
            .expect("calibration accepted");
    }
    assert!(teacher.next_calibration_trial().unwrap().is_none());
}

pub fn calibrated_teacher(spacing_first: bool) -> Teacher {
    let mut teacher = teacher(spacing_first);
    calibrate(&mut teacher);
    teacher
}

pub fn outcome(trial: &TrialDescriptor, correct: bool, response_time: f64, timestamp: f64) -> TrialOutcome {
    TrialOutcome {
        item_index: trial.item_index,
        correct,
        hint_used: false,
        response_time,
        avg_velocity: 100.0,
        distance_traveled: 200.0,
        shortest_path: 180.0,
        timestamp,
    }
}
