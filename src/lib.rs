// src/lib.rs - Library interface for internal module access

pub mod axis_names;
pub mod constants;
pub mod controller;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod plot_framework;
pub mod plot_functions;
pub mod sensor;
pub mod types;

pub use error::{ValidationError, ValidationResult};

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
