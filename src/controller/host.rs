// src/controller/host.rs
// Boundary between the simulation host and the per-tick controllers.

use crate::data_input::log_data::{LogColumn, LogRow};
use crate::error::ValidationResult;
use crate::types::{Pose, Vec3};

/// Everything a controller may read from the host on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    /// The assembly has settled and the effector may be driven.
    pub assembly_ready: bool,
    /// Measured effector position, mm.
    pub effector_position: Vec3,
    pub depth_camera: Option<Vec3>,
    pub polhemus: Option<Vec3>,
}

impl TickContext {
    pub fn ready_at(effector_position: Vec3) -> Self {
        Self {
            assembly_ready: true,
            effector_position,
            ..Self::default()
        }
    }

    /// Reading for a log column; `None` for sensors the host did not provide.
    pub fn reading(&self, column: LogColumn) -> Option<Vec3> {
        match column {
            LogColumn::Target => None,
            LogColumn::Simulation => Some(self.effector_position),
            LogColumn::DepthCamera => self.depth_camera,
            LogColumn::Polhemus => self.polhemus,
        }
    }
}

/// What a controller asks of the host after a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    NoOp,
    /// Write this pose into the effector goal.
    PublishGoal(Pose),
    /// Record this transition.
    LogRow(LogRow),
}

/// A controller driven once per simulation tick.
pub trait TickHandler {
    fn on_tick(&mut self, ctx: &TickContext) -> ValidationResult<Vec<Action>>;

    /// True once the handler will never act again. Hosts may keep ticking.
    fn finished(&self) -> bool {
        false
    }
}

/// The last goal published among `actions`, if any.
pub fn published_goal(actions: &[Action]) -> Option<Pose> {
    actions.iter().rev().find_map(|action| match action {
        Action::PublishGoal(pose) => Some(*pose),
        _ => None,
    })
}
