// src/data_input/mod.rs

pub mod log_data;
pub mod log_parser;
pub mod measurement_log;
pub mod vector_text;

// src/data_input/mod.rs
