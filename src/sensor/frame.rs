// src/sensor/frame.rs
// ASCII frame layout of the Polhemus response and the static calibration.

use crate::constants::{
    POLHEMUS_MAX_SENSORS, POLHEMUS_OFFSET_CM, POLHEMUS_ROUND_DECIMALS, POLHEMUS_UNIT_SCALE,
};
use crate::types::{Quaternion, Vec3};

pub const FRAME_TERMINATOR: &[u8] = b"\r\n";

/// One sensor line as reported by the tracker, before calibration.
/// Columns: `[id+status, x, y, z, q0, q1, q2, q3]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFrame {
    pub position: Vec3,
    pub quaternion: Quaternion,
}

/// Splits a response into per-sensor lines. The piece after the last terminator
/// is always empty and is dropped; at most `POLHEMUS_MAX_SENSORS` lines are kept.
pub fn split_frames(response: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    let mut rest = response;
    while let Some(end) = rest
        .windows(FRAME_TERMINATOR.len())
        .position(|w| w == FRAME_TERMINATOR)
    {
        frames.push(&rest[..end]);
        rest = &rest[end + FRAME_TERMINATOR.len()..];
    }
    frames.truncate(POLHEMUS_MAX_SENSORS);
    frames
}

/// Parses one sensor line.
pub fn parse_frame(line: &[u8]) -> Result<RawFrame, String> {
    let text = std::str::from_utf8(line).map_err(|e| format!("frame is not ASCII: {e}"))?;
    let columns: Vec<&str> = text.split_whitespace().collect();
    if columns.len() < 8 {
        return Err(format!(
            "expected 8 columns, found {} in '{}'",
            columns.len(),
            text.trim()
        ));
    }

    let parse = |token: &str| {
        token
            .parse::<f64>()
            .map_err(|e| format!("invalid value '{token}': {e}"))
    };
    let mut position = [0.0; 3];
    for (slot, token) in position.iter_mut().zip(columns[1..4].iter().copied()) {
        *slot = parse(token)?;
    }
    let mut quaternion = [0.0; 4];
    for (slot, token) in quaternion.iter_mut().zip(columns[4..8].iter().copied()) {
        *slot = parse(token)?;
    }
    Ok(RawFrame {
        position,
        quaternion,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Maps a tracker position (cm) into the robot frame (mm): offset, scale,
/// round, then permute to `(x, -z, y)`.
pub fn calibrate_position(raw: &Vec3) -> Vec3 {
    let mut scaled = [0.0; 3];
    for (axis, value) in scaled.iter_mut().enumerate() {
        *value = round_to(
            (raw[axis] + POLHEMUS_OFFSET_CM[axis]) * POLHEMUS_UNIT_SCALE,
            POLHEMUS_ROUND_DECIMALS,
        );
    }
    [scaled[0], -scaled[2], scaled[1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_split_frames_drops_trailing_piece() {
        let response = b"01 1 2 3 1 0 0 0\r\n02 4 5 6 1 0 0 0\r\n";
        let frames = split_frames(response);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], b"02 4 5 6 1 0 0 0");
        assert!(split_frames(b"").is_empty());
        assert!(split_frames(b"no terminator").is_empty());
    }

    #[test]
    fn test_split_frames_caps_sensor_count() {
        let response = b"a\r\nb\r\nc\r\nd\r\ne\r\n";
        assert_eq!(split_frames(response).len(), POLHEMUS_MAX_SENSORS);
    }

    #[test]
    fn test_parse_frame() {
        let frame = parse_frame(b"01   16.550  0.450 -22.750 0.7071 0.0 0.7071 0.0").unwrap();
        assert_eq!(frame.position, [16.55, 0.45, -22.75]);
        assert_eq!(frame.quaternion, [0.7071, 0.0, 0.7071, 0.0]);
        assert!(parse_frame(b"01 1 2 3").is_err());
        assert!(parse_frame(b"01 1 x 3 1 0 0 0").is_err());
    }

    #[test]
    fn test_calibration_origin() {
        // A raw reading equal to minus the offset lands on the origin.
        let raw = [19.4 - 2.85, 0.45, -(27.3 - 1.85 - 2.7)];
        let calibrated = calibrate_position(&raw);
        for value in calibrated {
            assert_relative_eq!(value, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_calibration_permutation() {
        let base = [19.4 - 2.85, 0.45, -(27.3 - 1.85 - 2.7)];
        let raw = [base[0] + 1.0, base[1] + 2.0, base[2] + 3.0];
        let calibrated = calibrate_position(&raw);
        assert_relative_eq!(calibrated[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(calibrated[1], -30.0, epsilon = 1e-9);
        assert_relative_eq!(calibrated[2], 20.0, epsilon = 1e-9);
    }
}
