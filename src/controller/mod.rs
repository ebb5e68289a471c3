// src/controller/mod.rs

pub mod dry_run;
pub mod host;
pub mod sequencing_controller;
pub mod target_sequencer;

pub use host::{Action, TickContext, TickHandler};
pub use sequencing_controller::SequencingController;
pub use target_sequencer::{SequencerConfig, TargetSequencer};

// src/controller/mod.rs
