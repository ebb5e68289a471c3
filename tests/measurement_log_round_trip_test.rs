// tests/measurement_log_round_trip_test.rs

use approx::assert_relative_eq;
use tempfile::tempdir;

use emio_validation::controller::{SequencerConfig, SequencingController, TickContext, TickHandler};
use emio_validation::data_analysis::comparison::compare_table;
use emio_validation::data_input::log_data::{LogColumn, LogLayout};
use emio_validation::data_input::log_parser::load_positions;
use emio_validation::ValidationError;

#[test]
fn test_logged_position_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("round_trip.csv");
    let config = SequencerConfig {
        step_count: 1,
        ..SequencerConfig::default()
    };
    let mut controller = SequencingController::new(vec![[1.0, 2.0, 3.0]], config, &path).unwrap();
    controller
        .on_tick(&TickContext::ready_at([1.25, 2.0, 2.5]))
        .unwrap();
    assert!(controller.finished());

    let table = load_positions(&path).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.layout(), LogLayout::basic());
    for (loaded, expected) in table.targets()[0].iter().zip([1.0, 2.0, 3.0]) {
        assert_relative_eq!(*loaded, expected, epsilon = 1e-12);
    }
    for (loaded, expected) in table.simulations()[0].iter().zip([1.25, 2.0, 2.5]) {
        assert_relative_eq!(*loaded, expected, epsilon = 1e-12);
    }
}

#[test]
fn test_full_layout_round_trip_with_missing_readings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("full.csv");
    let config = SequencerConfig {
        step_count: 1,
        layout: LogLayout::full(),
        ..SequencerConfig::default()
    };
    let mut controller =
        SequencingController::new(vec![[0.0; 3], [10.0, 0.0, 0.0]], config, &path).unwrap();

    let with_camera = TickContext {
        depth_camera: Some([10.0, 0.0, 1.0]),
        ..TickContext::ready_at([10.0, 0.0, 0.5])
    };
    controller.on_tick(&with_camera).unwrap();
    controller.on_tick(&TickContext::ready_at([0.0, 0.0, 0.5])).unwrap();

    let table = load_positions(&path).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.layout(), LogLayout::full());
    assert!(table.column(LogColumn::Polhemus).unwrap()[0][0].is_nan());

    let reports = compare_table(&table).unwrap();
    assert_eq!(reports.len(), 3);
    assert_relative_eq!(reports[0].summary.unwrap().mean, 0.5, epsilon = 1e-12);
    assert_eq!(reports[1].summary.unwrap().count, 1);
    assert!(reports[2].summary.is_none());
}

#[test]
fn test_malformed_row_reports_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    let mut content: String = (0..9).map(|i| format!("meta{i};x\n")).collect();
    content.push_str("[1.0 2.0 3.0];[1.0 2.0 3.0]\n");
    content.push_str("[1.0 2.0];[1.0 2.0 3.0]\n");
    std::fs::write(&path, content).unwrap();

    match load_positions(&path) {
        Err(ValidationError::MalformedRow { line, .. }) => assert_eq!(line, 11),
        other => panic!("expected a malformed row, got {other:?}"),
    }
}
