// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, Rectangle, Text};
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use crate::constants::{
    COLORBAR_STEPS, COLORBAR_WIDTH_PX, COLOR_SUMMARY_BACKGROUND, COLOR_UNAVAILABLE_TEXT,
    FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND, FONT_SIZE_MAIN_TITLE,
    FONT_SIZE_MESSAGE, FONT_SIZE_SUMMARY, PLOT_HEIGHT, PLOT_WIDTH, POINT_MARKER_SIZE,
    SCATTER_PITCH_RAD, SCATTER_SCALE, SCATTER_YAW_RAD,
};
use crate::data_analysis::point_cloud_error::cloud_bounds;
use crate::types::Vec3;

// Approximate glyph width relative to font size, for centering text without measuring it.
const CHAR_WIDTH_RATIO: f32 = 0.6;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    plot_type: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let message = format!("{plot_type} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;

    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let estimated_text_width = max_line_length.saturating_mul(estimated_char_width as usize) as i32;
    let estimated_text_height = lines.len().saturating_mul(estimated_line_height as usize) as i32;

    let center_x = width / 2 - estimated_text_width / 2;
    let center_y = height / 2 - estimated_text_height / 2;

    let text_style = ("sans-serif", FONT_SIZE_MESSAGE)
        .into_font()
        .color(COLOR_UNAVAILABLE_TEXT);
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.to_string(),
            (center_x, center_y + i as i32 * estimated_line_height),
            text_style.clone(),
        ))?;
    }
    Ok(())
}

/// Maps `value` onto the viridis scale spanning `[min, max]`.
pub fn map_value_to_color(value: f64, min: f64, max: f64) -> RGBColor {
    if !value.is_finite() || !min.is_finite() || !max.is_finite() {
        return RGBColor(0, 0, 0); // Black for invalid values
    }

    let span = (max - min).abs().max(1e-9);
    let t = ((value.clamp(min, max) - min) / span).clamp(0.0, 1.0);

    let color = colorous::VIRIDIS.eval_continuous(t);
    RGBColor(color.r, color.g, color.b)
}

/// One labelled point cloud of a scatter chart.
#[derive(Clone)]
pub struct CloudSeries {
    pub points: Vec<Vec3>,
    pub label: String,
    pub color: RGBColor,
    /// Per-point values drawn through the color scale instead of `color`.
    pub values: Option<Vec<f64>>,
}

impl CloudSeries {
    pub fn solid(points: &[Vec3], label: &str, color: RGBColor) -> Self {
        Self {
            points: points.to_vec(),
            label: label.to_string(),
            color,
            values: None,
        }
    }

    /// Points with every component finite, paired with their scale value.
    fn finite_points(&self) -> Vec<(Vec3, Option<f64>)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, self.values.as_ref().and_then(|v| v.get(i).copied())))
            .filter(|(p, v)| p.iter().all(|c| c.is_finite()) && v.map_or(true, f64::is_finite))
            .collect()
    }
}

#[derive(Clone)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub label: String,
}

#[derive(Clone)]
pub struct ScatterPlotConfig {
    pub title: String,
    pub series: Vec<CloudSeries>,
    pub color_scale: Option<ColorScale>,
    /// Lines drawn in a boxed overlay at the top-left of the chart.
    pub summary_lines: Vec<String>,
}

fn draw_summary_box(
    area: &DrawingArea<BitMapBackend, Shift>,
    lines: &[String],
) -> Result<(), Box<dyn Error>> {
    const PADDING: i32 = 10;
    const ORIGIN: (i32, i32) = (20, 40);

    if lines.is_empty() {
        return Ok(());
    }
    let line_height = FONT_SIZE_SUMMARY + 6;
    let longest = lines.iter().map(String::len).max().unwrap_or(0) as f32;
    let width = (longest * FONT_SIZE_SUMMARY as f32 * CHAR_WIDTH_RATIO) as i32 + 2 * PADDING;
    let height = lines.len() as i32 * line_height + 2 * PADDING;
    let corners = [ORIGIN, (ORIGIN.0 + width, ORIGIN.1 + height)];

    area.draw(&Rectangle::new(
        corners,
        COLOR_SUMMARY_BACKGROUND.mix(0.85).filled(),
    ))?;
    area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;

    let text_style = ("sans-serif", FONT_SIZE_SUMMARY).into_font().color(&BLACK);
    for (i, line) in lines.iter().enumerate() {
        area.draw(&Text::new(
            line.clone(),
            (ORIGIN.0 + PADDING, ORIGIN.1 + PADDING + i as i32 * line_height),
            text_style.clone(),
        ))?;
    }
    Ok(())
}

fn draw_colorbar(
    area: &DrawingArea<BitMapBackend, Shift>,
    scale: &ColorScale,
) -> Result<(), Box<dyn Error>> {
    let (min, max) = if scale.max > scale.min {
        (scale.min, scale.max)
    } else {
        (scale.min, scale.min + 1e-6)
    };

    let mut chart = ChartBuilder::on(area)
        .margin_top(80)
        .margin_bottom(80)
        .margin_right(10)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, min..max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc(&scale.label)
        .y_labels(10)
        .y_label_formatter(&|y| format!("{y:.2}"))
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()?;

    let step = (max - min) / COLORBAR_STEPS as f64;
    chart.draw_series((0..COLORBAR_STEPS).map(|i| {
        let low = min + step * i as f64;
        let high = low + step;
        Rectangle::new(
            [(0.0, low), (1.0, high)],
            map_value_to_color(low + step * 0.5, min, max).filled(),
        )
    }))?;
    Ok(())
}

fn padded_range((min, max): (f64, f64)) -> Range<f64> {
    let (low, high) = calculate_range(min, max);
    low..high
}

fn draw_scatter_chart(
    area: &DrawingArea<BitMapBackend, Shift>,
    config: &ScatterPlotConfig,
    bounds: [(f64, f64); 3],
) -> Result<(), Box<dyn Error>> {
    let mut chart = ChartBuilder::on(area)
        .caption(&config.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
        .margin(20)
        .build_cartesian_3d(
            padded_range(bounds[0]),
            padded_range(bounds[1]),
            padded_range(bounds[2]),
        )?;

    chart.with_projection(|mut pb| {
        pb.pitch = SCATTER_PITCH_RAD;
        pb.yaw = SCATTER_YAW_RAD;
        pb.scale = SCATTER_SCALE;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()?;

    let scale = config
        .color_scale
        .as_ref()
        .map_or((0.0, 1.0), |s| (s.min, s.max));

    let mut legend_series_count = 0;
    for series in &config.series {
        let points = series.finite_points();
        if points.is_empty() {
            continue;
        }
        let color = series.color;
        let drawn = chart.draw_series(points.into_iter().map(|(p, value)| {
            let fill = value.map_or(color, |v| map_value_to_color(v, scale.0, scale.1));
            Circle::new((p[0], p[1], p[2]), POINT_MARKER_SIZE, fill.filled())
        }))?;
        if !series.label.is_empty() {
            drawn
                .label(&series.label)
                .legend(move |(x, y)| Circle::new((x, y), POINT_MARKER_SIZE + 2, color.filled()));
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", FONT_SIZE_LEGEND))
            .draw()?;
    }
    Ok(())
}

/// Renders one 3-D scatter chart of every series to `output_filename`.
///
/// All clouds share the axes. When a color scale is given, series carrying
/// per-point values are colored through it and a scale bar is drawn on the
/// right. If no series has a finite point, the chart is replaced by an
/// "unavailable" message.
pub fn draw_scatter_plot(
    output_filename: &Path,
    root_name: &str,
    config: &ScatterPlotConfig,
) -> Result<(), Box<dyn Error>> {
    let root_area =
        BitMapBackend::new(output_filename, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        root_name,
        (10, 10),
        ("sans-serif", FONT_SIZE_MAIN_TITLE).into_font().color(&BLACK),
    ))?;

    let margined_root_area = root_area.margin(50, 5, 5, 5);
    let (chart_area, colorbar_area) = match &config.color_scale {
        Some(_) => {
            let width = margined_root_area.dim_in_pixel().0;
            let (left, right) =
                margined_root_area.split_horizontally(width.saturating_sub(COLORBAR_WIDTH_PX));
            (left, Some(right))
        }
        None => (margined_root_area, None),
    };

    let finite: Vec<Vec<Vec3>> = config
        .series
        .iter()
        .map(|s| s.finite_points().into_iter().map(|(p, _)| p).collect())
        .collect();
    let Some(bounds) = cloud_bounds(finite.iter().map(Vec::as_slice)) else {
        draw_unavailable_message(&chart_area, &config.title, "No finite points to plot")?;
        root_area.present()?;
        println!(
            "  Skipping '{}' plot saving: No finite points, only placeholder message shown.",
            output_filename.display()
        );
        return Ok(());
    };

    draw_scatter_chart(&chart_area, config, bounds)?;
    if let (Some(area), Some(scale)) = (colorbar_area, &config.color_scale) {
        draw_colorbar(&area, scale)?;
    }
    draw_summary_box(&chart_area, &config.summary_lines)?;

    root_area.present()?;
    println!("  Scatter plot saved as '{}'.", output_filename.display());
    Ok(())
}


// src/plot_framework.rs
