// src/data_analysis/point_cloud_error.rs

use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;

use crate::error::{ValidationError, ValidationResult};
use crate::types::Vec3;

/// Statistics of the per-point Euclidean error between two clouds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Packs a cloud into an `n x 3` array.
pub fn cloud_to_array(cloud: &[Vec3]) -> Array2<f64> {
    let flat: Vec<f64> = cloud.iter().flat_map(|p| p.iter().copied()).collect();
    // Shape always matches: 3 values per point.
    Array2::from_shape_vec((cloud.len(), 3), flat).unwrap_or_else(|_| Array2::zeros((0, 3)))
}

/// Euclidean norm of `a[i] - b[i]` for every pair.
pub fn point_errors(a: &[Vec3], b: &[Vec3]) -> ValidationResult<Array1<f64>> {
    if a.len() != b.len() {
        return Err(ValidationError::invalid(format!(
            "point clouds differ in size: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let diff = cloud_to_array(a) - cloud_to_array(b);
    Ok(diff.map_axis(Axis(1), |row| row.dot(&row).sqrt()))
}

fn non_empty_errors(a: &[Vec3], b: &[Vec3]) -> ValidationResult<Array1<f64>> {
    let errors = point_errors(a, b)?;
    if errors.is_empty() {
        return Err(ValidationError::invalid(
            "cannot compute error statistics of empty point clouds",
        ));
    }
    Ok(errors)
}

/// Mean of the per-point errors.
pub fn mean_error(a: &[Vec3], b: &[Vec3]) -> ValidationResult<f64> {
    let errors = non_empty_errors(a, b)?;
    Ok(errors.sum() / errors.len() as f64)
}

/// Population standard deviation (ddof = 0) of the per-point errors.
pub fn error_std(a: &[Vec3], b: &[Vec3]) -> ValidationResult<f64> {
    let errors = non_empty_errors(a, b)?;
    Ok(errors.std(0.0))
}

pub fn summarize(a: &[Vec3], b: &[Vec3]) -> ValidationResult<ErrorSummary> {
    let errors = non_empty_errors(a, b)?;
    Ok(ErrorSummary {
        mean: errors.sum() / errors.len() as f64,
        std: errors.std(0.0),
        min: *errors.min_skipnan(),
        max: *errors.max_skipnan(),
        count: errors.len(),
    })
}

/// Per-axis `(min, max)` bounds of one or more clouds, ignoring NaN components.
pub fn cloud_bounds<'a, I>(clouds: I) -> Option<[(f64, f64); 3]>
where
    I: IntoIterator<Item = &'a [Vec3]>,
{
    let mut bounds = [(f64::INFINITY, f64::NEG_INFINITY); 3];
    let mut any = false;
    for cloud in clouds {
        for point in cloud {
            for (axis, value) in point.iter().enumerate() {
                if value.is_finite() {
                    bounds[axis].0 = bounds[axis].0.min(*value);
                    bounds[axis].1 = bounds[axis].1.max(*value);
                    any = true;
                }
            }
        }
    }
    any.then_some(bounds)
}
