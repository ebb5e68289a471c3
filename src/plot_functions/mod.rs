// src/plot_functions/mod.rs

pub mod plot_error_map;
pub mod plot_point_clouds;

// src/plot_functions/mod.rs
