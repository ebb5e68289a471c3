// src/plot_functions/plot_point_clouds.rs

use std::error::Error;
use std::path::Path;

use plotters::style::RGBColor;

use crate::axis_names::axis_label;
use crate::constants::{CLOUD_COLORS, COLOR_EXTRA_CLOUD};
use crate::data_analysis::point_cloud_error::cloud_bounds;
use crate::plot_framework::{draw_scatter_plot, CloudSeries, ScatterPlotConfig};
use crate::types::Vec3;

/// Color of the `index`-th cloud: Target, Simulation, DepthCamera, Polhemus, then a fallback.
pub fn cloud_color(index: usize) -> RGBColor {
    CLOUD_COLORS
        .get(index)
        .map_or(*COLOR_EXTRA_CLOUD, |color| **color)
}

/// Generates a single 3-D scatter of every named cloud, with a legend.
pub fn plot_point_clouds(
    clouds: &[(&str, &[Vec3])],
    output: &Path,
    title: &str,
) -> Result<(), Box<dyn Error>> {
    let series = clouds
        .iter()
        .enumerate()
        .map(|(index, (label, points))| CloudSeries::solid(points, label, cloud_color(index)))
        .collect();

    let mut summary_lines: Vec<String> = clouds
        .iter()
        .map(|(label, points)| format!("{label}: {} points", points.len()))
        .collect();
    if let Some(bounds) = cloud_bounds(clouds.iter().map(|(_, points)| *points)) {
        for (axis, (min, max)) in bounds.iter().enumerate() {
            summary_lines.push(format!("{}: {min:.1} .. {max:.1}", axis_label(axis)));
        }
    }

    let config = ScatterPlotConfig {
        title: "Point clouds (mm)".to_string(),
        series,
        color_scale: None,
        summary_lines,
    };
    draw_scatter_plot(output, title, &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cloud_colors() {
        assert_eq!(cloud_color(0), *CLOUD_COLORS[0]);
        assert_eq!(cloud_color(3), *CLOUD_COLORS[3]);
        assert_eq!(cloud_color(7), *COLOR_EXTRA_CLOUD);
    }

    #[test]
    #[ignore = "renders text; needs a system sans-serif font"]
    fn test_plot_point_clouds_writes_png() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("clouds.png");
        let target = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 5.0]];
        let simulation = [[0.5, 0.0, 0.0], [10.5, 0.0, 0.0], [10.0, 10.5, 5.0]];
        plot_point_clouds(
            &[("Target", &target[..]), ("Simulation", &simulation[..])],
            &output,
            "run",
        )
        .unwrap();
        assert!(output.exists());
    }
}

// src/plot_functions/plot_point_clouds.rs
