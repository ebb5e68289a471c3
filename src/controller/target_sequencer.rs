// src/controller/target_sequencer.rs

use tracing::{debug, info};

use crate::constants::{DEFAULT_DISTANCE_TOLERANCE, DEFAULT_DWELL_STEPS};
use crate::controller::host::{Action, TickContext, TickHandler};
use crate::data_input::log_data::{LogLayout, LogRow};
use crate::error::{ValidationError, ValidationResult};
use crate::types::{distance, Pose, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerConfig {
    /// Qualifying ticks spent on each target before moving on.
    pub step_count: u32,
    /// Hold the countdown until the effector first reaches the starting target.
    pub proximity_gate: bool,
    /// Distance (mm) under which the starting target counts as reached.
    pub distance_tolerance: f64,
    /// Columns of the rows this sequencer emits.
    pub layout: LogLayout,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            step_count: DEFAULT_DWELL_STEPS,
            proximity_gate: false,
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
            layout: LogLayout::basic(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Dwell countdown running, or waiting for the proximity gate.
    Idle,
    /// A transition happened on the last tick.
    Advancing,
    /// Every target has been logged.
    Done,
}

/// Walks a target list from the last index down to zero.
///
/// Each qualifying tick (assembly ready, and proximity gate latched when enabled)
/// decrements the dwell countdown. When it reaches zero the current target and
/// the effector position are logged, the index moves down and the next target is
/// published. Below index zero the sequencer is inert.
#[derive(Debug, Clone)]
pub struct TargetSequencer {
    targets: Vec<Vec3>,
    config: SequencerConfig,
    index: isize,
    countdown: u32,
    latched: bool,
    state: SequencerState,
}

impl TargetSequencer {
    pub fn new(targets: Vec<Vec3>, config: SequencerConfig) -> ValidationResult<Self> {
        if config.step_count == 0 {
            return Err(ValidationError::invalid("dwell step count must be at least 1"));
        }
        if !config.distance_tolerance.is_finite() || config.distance_tolerance <= 0.0 {
            return Err(ValidationError::invalid(format!(
                "distance tolerance must be positive, got {}",
                config.distance_tolerance
            )));
        }

        let index = targets.len() as isize - 1;
        let state = if index < 0 {
            SequencerState::Done
        } else {
            SequencerState::Idle
        };
        Ok(Self {
            targets,
            config,
            index,
            countdown: config.step_count,
            latched: false,
            state,
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    /// Index of the target currently driven; negative once done.
    pub fn index(&self) -> isize {
        self.index
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.index < 0
    }

    pub fn current_target(&self) -> Option<Vec3> {
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.targets.get(i).copied())
    }

    /// Goal to set before the first tick: the starting target.
    pub fn initial_goal(&self) -> Option<Pose> {
        self.current_target().map(Pose::at)
    }

    /// Advances the state machine by one host tick.
    pub fn step(&mut self, ctx: &TickContext) -> Vec<Action> {
        let Some(target) = self.current_target() else {
            self.state = SequencerState::Done;
            return vec![Action::NoOp];
        };
        self.state = SequencerState::Idle;
        if !ctx.assembly_ready {
            return vec![Action::NoOp];
        }

        if self.config.proximity_gate && !self.latched {
            let gap = distance(&ctx.effector_position, &target);
            if gap < self.config.distance_tolerance {
                self.latched = true;
                info!("First target reached (distance {gap:.3} mm), sequencing starts");
            } else {
                return vec![Action::NoOp];
            }
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            return vec![Action::NoOp];
        }

        let row = LogRow {
            target,
            simulation: ctx.effector_position,
            auxiliary: self
                .config
                .layout
                .auxiliary_columns()
                .iter()
                .map(|column| ctx.reading(*column).unwrap_or([f64::NAN; 3]))
                .collect(),
        };
        self.index -= 1;
        self.countdown = self.config.step_count;

        let mut actions = vec![Action::LogRow(row)];
        match self.current_target() {
            Some(next) => {
                debug!("Advancing to target {} at {:?}", self.index, next);
                actions.push(Action::PublishGoal(Pose::at(next)));
                self.state = SequencerState::Advancing;
            }
            None => {
                info!("All {} targets visited", self.targets.len());
                self.state = SequencerState::Done;
            }
        }
        actions
    }
}

impl TickHandler for TargetSequencer {
    fn on_tick(&mut self, ctx: &TickContext) -> ValidationResult<Vec<Action>> {
        Ok(self.step(ctx))
    }

    fn finished(&self) -> bool {
        self.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(actions: &[Action]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, Action::LogRow(_)))
            .count()
    }

    fn three_targets() -> Vec<Vec3> {
        vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]
    }

    fn config(step_count: u32, proximity_gate: bool) -> SequencerConfig {
        SequencerConfig {
            step_count,
            proximity_gate,
            ..SequencerConfig::default()
        }
    }

    #[test]
    fn test_three_targets_two_steps() {
        let mut sequencer = TargetSequencer::new(three_targets(), config(2, false)).unwrap();
        assert_eq!(sequencer.initial_goal(), Some(Pose::at([20.0, 0.0, 0.0])));

        let ctx = TickContext::ready_at([5.0, 5.0, 5.0]);
        let mut logged = Vec::new();
        for _ in 0..20 {
            for action in sequencer.step(&ctx) {
                if let Action::LogRow(row) = action {
                    logged.push(row.target);
                }
            }
        }
        assert_eq!(
            logged,
            vec![[20.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 0.0, 0.0]]
        );
        assert!(sequencer.is_done());
        assert_eq!(sequencer.state(), SequencerState::Done);
    }

    #[test]
    fn test_transition_publishes_next_goal() {
        let mut sequencer = TargetSequencer::new(three_targets(), config(2, false)).unwrap();
        let ctx = TickContext::ready_at([19.0, 0.0, 0.0]);

        assert_eq!(sequencer.step(&ctx), vec![Action::NoOp]);
        assert_eq!(sequencer.countdown(), 1);

        let actions = sequencer.step(&ctx);
        assert_eq!(
            actions,
            vec![
                Action::LogRow(LogRow {
                    target: [20.0, 0.0, 0.0],
                    simulation: [19.0, 0.0, 0.0],
                    auxiliary: vec![],
                }),
                Action::PublishGoal(Pose::at([10.0, 0.0, 0.0])),
            ]
        );
        assert_eq!(sequencer.state(), SequencerState::Advancing);
        assert_eq!(sequencer.index(), 1);
        assert_eq!(sequencer.countdown(), 2);
    }

    #[test]
    fn test_final_transition_publishes_nothing() {
        let mut sequencer = TargetSequencer::new(vec![[1.0, 2.0, 3.0]], config(1, false)).unwrap();
        let actions = sequencer.step(&TickContext::ready_at([0.0; 3]));
        assert_eq!(rows(&actions), 1);
        assert!(!actions.iter().any(|a| matches!(a, Action::PublishGoal(_))));
        assert_eq!(sequencer.step(&TickContext::ready_at([0.0; 3])), vec![Action::NoOp]);
    }

    #[test]
    fn test_not_ready_ticks_do_not_count() {
        let mut sequencer = TargetSequencer::new(three_targets(), config(2, false)).unwrap();
        let not_ready = TickContext::default();
        for _ in 0..10 {
            assert_eq!(sequencer.step(&not_ready), vec![Action::NoOp]);
        }
        assert_eq!(sequencer.countdown(), 2);
        assert_eq!(sequencer.index(), 2);
    }

    #[test]
    fn test_gate_never_reached() {
        let mut sequencer = TargetSequencer::new(three_targets(), config(2, true)).unwrap();
        let far = TickContext::ready_at([21.0, 0.0, 0.0]);
        let total: usize = (0..1000).map(|_| rows(&sequencer.step(&far))).sum();
        assert_eq!(total, 0);
        assert!(!sequencer.is_latched());
        assert_eq!(sequencer.state(), SequencerState::Idle);
        assert_eq!(sequencer.countdown(), 2);
    }

    #[test]
    fn test_gate_latches_once() {
        let mut sequencer = TargetSequencer::new(three_targets(), config(2, true)).unwrap();
        // Within tolerance of the starting target [20, 0, 0]: latches and counts down.
        assert_eq!(sequencer.step(&TickContext::ready_at([20.5, 0.0, 0.0])), vec![Action::NoOp]);
        assert!(sequencer.is_latched());
        assert_eq!(sequencer.countdown(), 1);
        // Far away afterwards: the latch holds and the transition happens.
        let actions = sequencer.step(&TickContext::ready_at([50.0, 0.0, 0.0]));
        assert_eq!(rows(&actions), 1);
    }

    #[test]
    fn test_auxiliary_columns() {
        let cfg = SequencerConfig {
            step_count: 1,
            layout: LogLayout::full(),
            ..SequencerConfig::default()
        };
        let mut sequencer = TargetSequencer::new(three_targets(), cfg).unwrap();
        let ctx = TickContext {
            depth_camera: Some([1.0, 1.0, 1.0]),
            ..TickContext::ready_at([0.0; 3])
        };
        let actions = sequencer.step(&ctx);
        let Action::LogRow(row) = &actions[0] else {
            panic!("expected a log row first, got {actions:?}");
        };
        assert_eq!(row.auxiliary.len(), 2);
        assert_eq!(row.auxiliary[0], [1.0, 1.0, 1.0]);
        assert!(row.auxiliary[1].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_empty_and_invalid() {
        let sequencer = TargetSequencer::new(vec![], config(2, false)).unwrap();
        assert!(sequencer.is_done());
        assert_eq!(sequencer.initial_goal(), None);

        assert!(TargetSequencer::new(three_targets(), config(0, false)).is_err());
        let cfg = SequencerConfig {
            distance_tolerance: 0.0,
            ..SequencerConfig::default()
        };
        assert!(TargetSequencer::new(three_targets(), cfg).is_err());
    }
}
