// src/plot_functions/plot_error_map.rs

use std::error::Error;
use std::path::Path;

use crate::data_analysis::comparison::finite_pairs;
use crate::data_analysis::point_cloud_error::{point_errors, summarize};
use crate::error::ValidationError;
use crate::plot_framework::{
    draw_scatter_plot, map_value_to_color, CloudSeries, ColorScale, ScatterPlotConfig,
};
use crate::types::Vec3;

/// Generates a 3-D scatter of `measured`, each point colored by its distance
/// to the matching `reference` point, with a color scale and a summary overlay.
///
/// Rows with a missing (NaN) reading on either side are left out.
pub fn plot_error_map(
    reference: &[Vec3],
    measured: &[Vec3],
    output: &Path,
    title: &str,
) -> Result<(), Box<dyn Error>> {
    if reference.len() != measured.len() {
        return Err(ValidationError::invalid(format!(
            "error map needs clouds of equal size, got {} and {}",
            reference.len(),
            measured.len()
        ))
        .into());
    }
    let (reference, measured_finite) = finite_pairs(reference, measured);
    let skipped = measured.len() - measured_finite.len();

    if measured_finite.is_empty() {
        let config = ScatterPlotConfig {
            title: "Error map".to_string(),
            series: Vec::new(),
            color_scale: None,
            summary_lines: Vec::new(),
        };
        return draw_scatter_plot(output, title, &config);
    }

    let errors = point_errors(&reference, &measured_finite)?;
    let summary = summarize(&reference, &measured_finite)?;

    let mut summary_lines = vec![
        format!("mean: {:.3} mm", summary.mean),
        format!("std: {:.3} mm", summary.std),
        format!("max: {:.3} mm", summary.max),
        format!("count: {}", summary.count),
    ];
    if skipped > 0 {
        summary_lines.push(format!("skipped: {skipped}"));
    }

    let midpoint = (summary.min + summary.max) * 0.5;
    let config = ScatterPlotConfig {
        title: "Error map (mm)".to_string(),
        series: vec![CloudSeries {
            points: measured_finite,
            label: "Per-point error".to_string(),
            color: map_value_to_color(midpoint, summary.min, summary.max),
            values: Some(errors.to_vec()),
        }],
        color_scale: Some(ColorScale {
            min: summary.min,
            max: summary.max,
            label: "Error (mm)".to_string(),
        }),
        summary_lines,
    };
    draw_scatter_plot(output, title, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    #[ignore = "renders text; needs a system sans-serif font"]
    fn test_plot_error_map_writes_png() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("error_map.png");
        let reference = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]];
        let measured = [[1.0, 0.0, 0.0], [10.0, 2.0, 0.0], [f64::NAN; 3]];
        plot_error_map(&reference, &measured, &output, "run").unwrap();
        assert!(output.exists());
    }

    #[test]
    #[ignore = "renders text; needs a system sans-serif font"]
    fn test_plot_error_map_without_readings() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("empty.png");
        plot_error_map(&[[0.0; 3]], &[[f64::NAN; 3]], &output, "run").unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_plot_error_map_size_mismatch() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("mismatch.png");
        assert!(plot_error_map(&[[0.0; 3]; 2], &[[0.0; 3]], &output, "run").is_err());
    }
}

// src/plot_functions/plot_error_map.rs
