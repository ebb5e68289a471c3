// src/axis_names.rs

/// Centralized axis naming utilities
///
/// Provides consistent axis names for plot labels and log output.
pub const AXIS_COUNT: usize = 3;

/// Get all axis names as a static array
pub const AXIS_NAMES: [&str; AXIS_COUNT] = ["X", "Y", "Z"];

/// Get the axis label used on charts for a given index, e.g. "X (mm)".
///
/// # Panics
/// Panics if index is greater than 2
pub fn axis_label(index: usize) -> String {
    match AXIS_NAMES.get(index) {
        Some(name) => format!("{name} ({})", crate::constants::LOG_UNITS),
        None => panic!(
            "Invalid axis index: {}. Expected 0 (X), 1 (Y), or 2 (Z)",
            index
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_label() {
        assert_eq!(axis_label(0), "X (mm)");
        assert_eq!(axis_label(1), "Y (mm)");
        assert_eq!(axis_label(2), "Z (mm)");
    }

    #[test]
    #[should_panic(expected = "Invalid axis index")]
    fn test_axis_label_panic() {
        axis_label(3);
    }
}
