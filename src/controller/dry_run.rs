// src/controller/dry_run.rs
//! Kinematic stand-in for the simulation host.
//!
//! Lets a sequencing run be rehearsed without the physics engine: the assembly
//! reports ready after a fixed number of settle ticks and the effector covers a
//! fixed fraction of the remaining distance to its goal on every tick.

use tracing::{info, warn};

use crate::constants::{DRY_RUN_SETTLE_TICKS, DRY_RUN_TRACKING_GAIN, SCENE_INITIAL_TARGET};
use crate::controller::host::{published_goal, Action, TickContext, TickHandler};
use crate::error::{ValidationError, ValidationResult};
use crate::types::{Pose, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct StandInHost {
    effector: Vec3,
    goal: Pose,
    settle_ticks: u32,
    gain: f64,
    tick: u64,
}

impl Default for StandInHost {
    fn default() -> Self {
        Self {
            effector: SCENE_INITIAL_TARGET,
            goal: Pose::at(SCENE_INITIAL_TARGET),
            settle_ticks: DRY_RUN_SETTLE_TICKS,
            gain: DRY_RUN_TRACKING_GAIN,
            tick: 0,
        }
    }
}

impl StandInHost {
    pub fn new(settle_ticks: u32, gain: f64) -> ValidationResult<Self> {
        if !(gain > 0.0 && gain <= 1.0) {
            return Err(ValidationError::invalid(format!(
                "tracking gain must be in (0, 1], got {gain}"
            )));
        }
        Ok(Self {
            settle_ticks,
            gain,
            ..Self::default()
        })
    }

    pub fn effector(&self) -> Vec3 {
        self.effector
    }

    pub fn goal(&self) -> Pose {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Pose) {
        self.goal = goal;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn context(&self) -> TickContext {
        TickContext {
            assembly_ready: self.tick >= u64::from(self.settle_ticks),
            effector_position: self.effector,
            depth_camera: None,
            polhemus: None,
        }
    }

    /// Moves the effector toward the goal and advances the clock.
    pub fn advance(&mut self) {
        for axis in 0..3 {
            self.effector[axis] += self.gain * (self.goal.position[axis] - self.effector[axis]);
        }
        self.tick += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DryRunReport {
    pub ticks: u64,
    pub rows: usize,
    pub finished: bool,
}

/// Ticks `handler` against `host` until it finishes or `max_ticks` elapse.
pub fn run_dry_run<H: TickHandler>(
    handler: &mut H,
    host: &mut StandInHost,
    initial_goal: Option<Pose>,
    max_ticks: u64,
) -> ValidationResult<DryRunReport> {
    if let Some(goal) = initial_goal {
        host.set_goal(goal);
    }

    let mut rows = 0;
    while host.tick() < max_ticks && !handler.finished() {
        let actions = handler.on_tick(&host.context())?;
        rows += actions
            .iter()
            .filter(|a| matches!(a, Action::LogRow(_)))
            .count();
        if let Some(goal) = published_goal(&actions) {
            host.set_goal(goal);
        }
        host.advance();
    }

    let report = DryRunReport {
        ticks: host.tick(),
        rows,
        finished: handler.finished(),
    };
    if report.finished {
        info!("Dry run finished after {} ticks, {} rows", report.ticks, report.rows);
    } else {
        warn!(
            "Dry run stopped at the {max_ticks} tick limit with {} rows",
            report.rows
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::target_sequencer::{SequencerConfig, TargetSequencer};

    #[test]
    fn test_effector_tracks_goal() {
        let mut host = StandInHost::new(0, 0.5).unwrap();
        host.set_goal(Pose::at([0.0, -148.0, 0.0]));
        host.advance();
        assert_eq!(host.effector(), [0.0, -149.0, 0.0]);
        assert_eq!(host.tick(), 1);
    }

    #[test]
    fn test_gated_run_completes() {
        let targets = vec![[0.0, -150.0, 0.0], [10.0, -150.0, 0.0], [10.0, -140.0, 0.0]];
        let config = SequencerConfig {
            step_count: 20,
            proximity_gate: true,
            ..SequencerConfig::default()
        };
        let mut sequencer = TargetSequencer::new(targets, config).unwrap();
        let initial = sequencer.initial_goal();
        let mut host = StandInHost::new(5, DRY_RUN_TRACKING_GAIN).unwrap();

        let report = run_dry_run(&mut sequencer, &mut host, initial, 10_000).unwrap();
        assert!(report.finished);
        assert_eq!(report.rows, 3);
        assert!(report.ticks < 10_000);
    }

    #[test]
    fn test_tick_limit() {
        let mut sequencer =
            TargetSequencer::new(vec![[0.0; 3]; 4], SequencerConfig::default()).unwrap();
        let mut host = StandInHost::default();
        let report = run_dry_run(&mut sequencer, &mut host, None, 10).unwrap();
        assert!(!report.finished);
        assert_eq!(report.ticks, 10);
        assert_eq!(report.rows, 0);
    }

    #[test]
    fn test_invalid_gain() {
        assert!(StandInHost::new(0, 0.0).is_err());
        assert!(StandInHost::new(0, 1.5).is_err());
    }
}
