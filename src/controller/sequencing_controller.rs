// src/controller/sequencing_controller.rs

use std::path::Path;

use crate::controller::host::{Action, TickContext, TickHandler};
use crate::controller::target_sequencer::{SequencerConfig, TargetSequencer};
use crate::data_input::measurement_log::{LogMetadata, MeasurementLog};
use crate::error::ValidationResult;
use crate::types::{Pose, Vec3};

/// Target sequencer bound to its measurement log.
///
/// The log is truncated and given its header when the controller is built; every
/// `LogRow` action is appended before the actions are handed back to the host.
#[derive(Debug)]
pub struct SequencingController {
    sequencer: TargetSequencer,
    log: MeasurementLog,
}

impl SequencingController {
    pub fn new(
        targets: Vec<Vec3>,
        config: SequencerConfig,
        log_path: impl AsRef<Path>,
    ) -> ValidationResult<Self> {
        let sequencer = TargetSequencer::new(targets, config)?;
        let metadata = LogMetadata {
            step_count: config.step_count,
            proximity_gate: config.proximity_gate,
            distance_tolerance: config.distance_tolerance,
            target_count: sequencer.targets().len(),
        };
        let log = MeasurementLog::create(log_path, config.layout, &metadata)?;
        Ok(Self { sequencer, log })
    }

    pub fn initial_goal(&self) -> Option<Pose> {
        self.sequencer.initial_goal()
    }

    pub fn sequencer(&self) -> &TargetSequencer {
        &self.sequencer
    }

    pub fn log(&self) -> &MeasurementLog {
        &self.log
    }
}

impl TickHandler for SequencingController {
    fn on_tick(&mut self, ctx: &TickContext) -> ValidationResult<Vec<Action>> {
        let actions = self.sequencer.step(ctx);
        for action in &actions {
            if let Action::LogRow(row) = action {
                self.log.append(row)?;
            }
        }
        Ok(actions)
    }

    fn finished(&self) -> bool {
        self.sequencer.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LOG_HEADER_ROWS;
    use tempfile::tempdir;

    #[test]
    fn test_rows_appended_per_transition() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let config = SequencerConfig {
            step_count: 2,
            ..SequencerConfig::default()
        };
        let mut controller = SequencingController::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            config,
            &path,
        )
        .unwrap();

        let ctx = TickContext::ready_at([0.5, 0.5, 0.5]);
        for _ in 0..50 {
            controller.on_tick(&ctx).unwrap();
        }
        assert!(controller.finished());
        assert_eq!(controller.log().rows_written(), 3);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), LOG_HEADER_ROWS + 3);
        assert!(content.contains("target_count;3"));
        assert!(content.lines().last().unwrap().starts_with("[0.0 0.0 0.0];"));
    }
}
