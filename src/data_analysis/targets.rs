// src/data_analysis/targets.rs

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_TARGET_CENTER, DEFAULT_TARGET_RATIO, DEFAULT_TARGET_SIZE, MAX_TARGET_POINTS,
};
use crate::error::{ValidationError, ValidationResult};
use crate::types::{distance, Vec3};

/// Shape filled by a target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Sphere,
}

impl FromStr for Shape {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cube" => Ok(Shape::Cube),
            "sphere" => Ok(Shape::Sphere),
            other => Err(ValidationError::invalid(format!(
                "unknown shape '{other}', expected 'cube' or 'sphere'"
            ))),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Cube => write!(f, "cube"),
            Shape::Sphere => write!(f, "sphere"),
        }
    }
}

/// Parametric generator of effector targets.
///
/// `size` is the cube side (or sphere diameter), `ratio` the lattice spacing as a
/// fraction of `size`, `center` the shape center.
#[derive(Debug, Clone, PartialEq)]
pub struct Targets {
    size: f64,
    ratio: f64,
    center: Vec3,
    steps: usize,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            size: DEFAULT_TARGET_SIZE,
            ratio: DEFAULT_TARGET_RATIO,
            center: DEFAULT_TARGET_CENTER,
            steps: lattice_steps(DEFAULT_TARGET_SIZE, DEFAULT_TARGET_RATIO).unwrap_or(1),
        }
    }
}

/// Points per axis, `floor(size / (size * ratio)) + 1`, computed in floating point
/// exactly as written (so `size = 3, ratio = 0.1` gives 10, not 11).
///
/// Fails when the full lattice would exceed `MAX_TARGET_POINTS`.
fn lattice_steps(size: f64, ratio: f64) -> ValidationResult<usize> {
    let too_large = || {
        ValidationError::invalid(format!(
            "size {size} with ratio {ratio} exceeds {MAX_TARGET_POINTS} lattice points"
        ))
    };
    let intervals = (size / (size * ratio)).floor();
    if !intervals.is_finite() || intervals >= MAX_TARGET_POINTS as f64 {
        return Err(too_large());
    }
    let steps = (intervals as usize).checked_add(1).ok_or_else(too_large)?;
    let points = steps
        .checked_mul(steps)
        .and_then(|square| square.checked_mul(steps))
        .ok_or_else(too_large)?;
    if points > MAX_TARGET_POINTS {
        return Err(too_large());
    }
    Ok(steps)
}

impl Targets {
    pub fn new(size: f64, ratio: f64, center: Vec3) -> ValidationResult<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ValidationError::invalid(format!(
                "ratio must be a positive finite number, got {ratio}"
            )));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(ValidationError::invalid(format!(
                "size must be a positive finite number, got {size}"
            )));
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(ValidationError::invalid(format!(
                "center must be finite, got {center:?}"
            )));
        }
        let steps = lattice_steps(size, ratio)?;
        Ok(Self {
            size,
            ratio,
            center,
            steps,
        })
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Lattice spacing.
    pub fn spacing(&self) -> f64 {
        self.size * self.ratio
    }

    /// Number of lattice points along each axis.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn generate(&self, shape: Shape) -> Vec<Vec3> {
        match shape {
            Shape::Cube => self.cube(),
            Shape::Sphere => self.sphere(),
        }
    }

    /// Every lattice point of the cube, in boustrophedon order.
    ///
    /// Loops run y (outer), x, z (inner). The x sign flips on every y step and the
    /// z sign flips on every x step without being reset between y steps; the sign
    /// also applies to the center offset. Downstream target indices depend on this
    /// exact order.
    pub fn cube(&self) -> Vec<Vec3> {
        let side = self.size;
        let half = side / 2.0;
        let dx = self.spacing();
        let steps = self.steps();
        let [cx, cy, cz] = self.center;

        let mut positions = Vec::with_capacity(steps * steps * steps);
        let mut direction_x = 1.0;
        let mut direction_z = 1.0;
        for y in 0..steps {
            direction_x = -direction_x;
            for x in 0..steps {
                direction_z = -direction_z;
                for z in 0..steps {
                    positions.push([
                        direction_x * (x as f64 * dx - half + cx),
                        y as f64 * dx - half + cy,
                        direction_z * (z as f64 * dx - half + cz),
                    ]);
                }
            }
        }
        positions
    }

    /// Cube lattice points within `size / 2` of the center, in cube order.
    pub fn sphere(&self) -> Vec<Vec3> {
        let radius = self.size / 2.0;
        self.cube()
            .into_iter()
            .filter(|p| {
                let d = [
                    p[0] - self.center[0],
                    p[1] - self.center[1],
                    p[2] - self.center[2],
                ];
                d[0] * d[0] + d[1] * d[1] + d[2] * d[2] <= radius * radius
            })
            .collect()
    }

    /// Largest distance between a generated point and the center.
    pub fn max_radius(points: &[Vec3], center: &Vec3) -> f64 {
        points
            .iter()
            .map(|p| distance(p, center))
            .fold(0.0, f64::max)
    }
}
