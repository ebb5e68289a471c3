// src/types.rs
// Shared geometric types and small vector helpers.

use crate::axis_names::AXIS_COUNT;
use crate::constants::IDENTITY_QUATERNION;

// Compile-time assertion: positions are always three-dimensional.
const _: () = assert!(AXIS_COUNT == 3, "AXIS_COUNT must be 3 for Vec3 positions");

/// A 3-D position in millimetres.
pub type Vec3 = [f64; AXIS_COUNT];

/// Orientation quaternion, stored (qx, qy, qz, qw).
pub type Quaternion = [f64; 4];

/// A Rigid3 pose as the host reads it: position followed by orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quaternion,
}

impl Pose {
    /// Pose at `position` with the identity orientation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: IDENTITY_QUATERNION,
        }
    }

    /// Flattened `[x, y, z, qx, qy, qz, qw]` layout.
    pub fn to_rigid3(&self) -> [f64; 7] {
        let [x, y, z] = self.position;
        let [qx, qy, qz, qw] = self.orientation;
        [x, y, z, qx, qy, qz, qw]
    }
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn norm(v: &Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Euclidean distance between two points.
pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    norm(&sub(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(distance(&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0]), 5.0);
        assert_eq!(distance(&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_pose_rigid3_layout() {
        let pose = Pose::at([1.0, 2.0, 3.0]);
        assert_eq!(pose.to_rigid3(), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
    }
}

// src/types.rs
