// src/data_analysis/mod.rs

pub mod comparison;
pub mod point_cloud_error;
pub mod targets;

// src/data_analysis/mod.rs
