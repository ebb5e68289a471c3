// src/constants.rs

// Import specific colors needed
use plotters::style::colors::full_palette::{AMBER, BLUE, GREEN, ORANGE, PURPLE, RED, WHITE};
use plotters::style::RGBColor;

use std::time::Duration;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;

// Font sizes used across all charts.
pub const FONT_SIZE_MAIN_TITLE: i32 = 24;
pub const FONT_SIZE_CHART_TITLE: i32 = 20;
pub const FONT_SIZE_AXIS_LABEL: i32 = 14;
pub const FONT_SIZE_LEGEND: i32 = 14;
pub const FONT_SIZE_MESSAGE: i32 = 20;
pub const FONT_SIZE_SUMMARY: i32 = 16;

// Scatter marker radius in pixels.
pub const POINT_MARKER_SIZE: u32 = 3;

// Color scale bar geometry (pixels).
pub const COLORBAR_WIDTH_PX: u32 = 140;
pub const COLORBAR_STEPS: usize = 64;

// Projection used for the 3-D scatter charts.
pub const SCATTER_PITCH_RAD: f64 = 0.5;
pub const SCATTER_YAW_RAD: f64 = 0.6;
pub const SCATTER_SCALE: f64 = 0.8;

// --- Plot Color Assignments ---
// Clouds are colored in this order: Target, Simulation, DepthCamera, Polhemus.
pub const CLOUD_COLORS: [&RGBColor; 4] = [&BLUE, &ORANGE, &GREEN, &PURPLE];
pub const COLOR_EXTRA_CLOUD: &RGBColor = &AMBER;
pub const COLOR_UNAVAILABLE_TEXT: &RGBColor = &RED;
pub const COLOR_SUMMARY_BACKGROUND: &RGBColor = &WHITE;

// --- Measurement log format ---
// Number of rows preceding the data rows: 8 metadata rows and the column header.
// Readers skip exactly this many rows; it doubles as the format version marker.
pub const LOG_HEADER_ROWS: usize = 9;
pub const LOG_DELIMITER: u8 = b';';
pub const LOG_FORMAT_NAME: &str = "emio-validation-log";
pub const LOG_FORMAT_VERSION: u32 = 1;
pub const LOG_UNITS: &str = "mm";

// --- Target generator defaults ---
pub const DEFAULT_TARGET_SIZE: f64 = 100.0;
pub const DEFAULT_TARGET_RATIO: f64 = 0.1;
pub const DEFAULT_TARGET_CENTER: [f64; 3] = [0.0, 0.0, 0.0];
// Largest lattice a generator may build (steps^3 points).
pub const MAX_TARGET_POINTS: usize = 1_000_000;

// --- Target sequencing defaults ---
pub const DEFAULT_DWELL_STEPS: u32 = 30;
pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 1.0;
// Goals are published as Rigid3 poses with the identity orientation (qx, qy, qz, qw).
pub const IDENTITY_QUATERNION: [f64; 4] = [0.0, 0.0, 0.0, 1.0];
// Initial effector target used by the Emio scene before sequencing starts.
pub const SCENE_INITIAL_TARGET: [f64; 3] = [0.0, -150.0, 0.0];

// --- Dry-run stand-in host ---
pub const DRY_RUN_SETTLE_TICKS: u32 = 50;
pub const DRY_RUN_MAX_TICKS: u64 = 100_000;
pub const DRY_RUN_TRACKING_GAIN: f64 = 0.2;

// --- Polhemus USB device ---
pub const POLHEMUS_VENDOR_ID: u16 = 0x0F44;
pub const POLHEMUS_PRODUCT_ID: u16 = 0xFF20;
pub const POLHEMUS_IN_ENDPOINT: u8 = 0x88;
pub const POLHEMUS_OUT_ENDPOINT: u8 = 0x04;
pub const POLHEMUS_INTERFACE: u8 = 0;
pub const POLHEMUS_CONFIGURATION: u8 = 1;
pub const POLHEMUS_TIMEOUT: Duration = Duration::from_millis(100);
pub const POLHEMUS_READ_BUFFER_LEN: usize = 400;
pub const POLHEMUS_MAX_SENSORS: usize = 4;
// Single-byte frame request.
pub const POLHEMUS_POLL_COMMAND: &[u8] = b"p";
// Units in centimetres.
pub const POLHEMUS_UNITS_COMMAND: &[u8] = b"U1\r";
// Output list: cartesian position (2), quaternion (7), CRLF (1).
pub const POLHEMUS_OUTPUT_COMMAND: &[u8] = b"O*,2,7,1\r";

// Static calibration of the tracker frame against the Emio frame, in cm.
pub const POLHEMUS_OFFSET_CM: [f64; 3] = [-(19.4 - 2.85), -0.45, 27.3 - 1.85 - 2.7];
// cm -> mm
pub const POLHEMUS_UNIT_SCALE: f64 = 10.0;
pub const POLHEMUS_ROUND_DECIMALS: i32 = 3;

// src/constants.rs
