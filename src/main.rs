// src/main.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use emio_validation::constants::{
    DEFAULT_DISTANCE_TOLERANCE, DEFAULT_DWELL_STEPS, DEFAULT_TARGET_RATIO, DEFAULT_TARGET_SIZE,
    DRY_RUN_MAX_TICKS, DRY_RUN_SETTLE_TICKS, DRY_RUN_TRACKING_GAIN, POLHEMUS_MAX_SENSORS,
};
use emio_validation::controller::dry_run::{run_dry_run, StandInHost};
use emio_validation::controller::{SequencerConfig, SequencingController};
use emio_validation::data_analysis::comparison::compare_table;
use emio_validation::data_analysis::targets::{Shape, Targets};
use emio_validation::data_input::log_data::{LogColumn, LogLayout, PositionTable};
use emio_validation::data_input::log_parser::load_positions;
use emio_validation::data_input::vector_text::format_vector;
use emio_validation::plot_functions::plot_error_map::plot_error_map;
use emio_validation::plot_functions::plot_point_clouds::plot_point_clouds;
use emio_validation::sensor::frame::RawFrame;
use emio_validation::sensor::mock::MockTransport;
use emio_validation::sensor::{PolhemusUsb, UsbTransport};
use emio_validation::types::Vec3;

/// Parse "x,y,z" into a point.
fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}")))
        .collect::<Result<_, _>>()?;
    <[f64; 3]>::try_from(values.as_slice())
        .map_err(|_| format!("expected three comma-separated values, got '{s}'"))
}

/// Emio validation tooling
#[derive(Parser, Debug)]
#[command(name = "emio-validation")]
#[command(about = "Target generation, sequencing dry runs, Polhemus polling and point-cloud analysis for Emio")]
#[command(version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Shape filled by the targets: cube or sphere
    #[arg(long, default_value_t = Shape::Cube)]
    shape: Shape,

    /// Cube side or sphere diameter in mm
    #[arg(long, default_value_t = DEFAULT_TARGET_SIZE)]
    size: f64,

    /// Lattice spacing as a fraction of size
    #[arg(long, default_value_t = DEFAULT_TARGET_RATIO)]
    ratio: f64,

    /// Shape center as x,y,z in mm
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
    center: Vec3,
}

impl TargetArgs {
    fn generate(&self) -> Result<Vec<Vec3>> {
        let targets = Targets::new(self.size, self.ratio, self.center)?;
        Ok(targets.generate(self.shape))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print or write a target list
    Targets {
        #[command(flatten)]
        targets: TargetArgs,

        /// Write the list to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print error statistics of a measurement log and render its plots
    Analyze {
        /// Measurement log (semicolon-delimited CSV)
        input: PathBuf,

        /// Directory for the PNG plots (defaults to the log's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Only print statistics
        #[arg(long)]
        no_plots: bool,
    },

    /// Poll the Polhemus tracker and print sensor positions
    Poll {
        /// Number of sensors to print
        #[arg(long, default_value_t = 1)]
        sensors: usize,

        /// Delay between polls in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Number of polls
        #[arg(long, default_value_t = 10)]
        count: u64,

        /// Use a simulated tracker instead of the USB device
        #[arg(long)]
        mock: bool,
    },

    /// Run the target sequencer against a kinematic stand-in host
    DryRun {
        #[command(flatten)]
        targets: TargetArgs,

        /// Qualifying ticks spent on each target
        #[arg(long, default_value_t = DEFAULT_DWELL_STEPS)]
        steps: u32,

        /// Wait until the effector first reaches the starting target
        #[arg(long)]
        gate: bool,

        /// Proximity gate distance in mm
        #[arg(long, default_value_t = DEFAULT_DISTANCE_TOLERANCE)]
        tolerance: f64,

        /// Ticks before the assembly reports ready
        #[arg(long, default_value_t = DRY_RUN_SETTLE_TICKS)]
        settle_ticks: u32,

        /// Stop after this many ticks even if targets remain
        #[arg(long, default_value_t = DRY_RUN_MAX_TICKS)]
        max_ticks: u64,

        /// Measurement log to write
        #[arg(long, default_value = "dry_run.csv")]
        log: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Targets { targets, output } => cmd_targets(&targets, output.as_deref()),
        Command::Analyze {
            input,
            output_dir,
            no_plots,
        } => cmd_analyze(&input, output_dir.as_deref(), no_plots),
        Command::Poll {
            sensors,
            interval_ms,
            count,
            mock,
        } => cmd_poll(sensors, Duration::from_millis(interval_ms), count, mock),
        Command::DryRun {
            targets,
            steps,
            gate,
            tolerance,
            settle_ticks,
            max_ticks,
            log,
        } => {
            let config = SequencerConfig {
                step_count: steps,
                proximity_gate: gate,
                distance_tolerance: tolerance,
                layout: LogLayout::basic(),
            };
            cmd_dry_run(&targets, config, settle_ticks, max_ticks, &log)
        }
    }
}

fn cmd_targets(args: &TargetArgs, output: Option<&Path>) -> Result<()> {
    let points = args.generate()?;
    let text: String = points
        .iter()
        .map(|p| format!("{}\n", format_vector(p)))
        .collect();

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing '{}'", path.display()))?;
            println!("Wrote {} {} targets to '{}'", points.len(), args.shape, path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_analyze(input: &Path, output_dir: Option<&Path>, no_plots: bool) -> Result<()> {
    let table = load_positions(input)
        .with_context(|| format!("loading measurement log '{}'", input.display()))?;
    if table.is_empty() {
        bail!("'{}' holds no data rows", input.display());
    }
    println!("Loaded {} rows with columns {:?}", table.len(), table.layout().headers());

    let reports = compare_table(&table)?;
    for report in &reports {
        for line in report.lines() {
            println!("{line}");
        }
    }

    if no_plots {
        return Ok(());
    }

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating '{}'", output_dir.display()))?;
    let root_name = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    println!("\n--- Generating Plots ---");
    render_point_clouds(&table, &output_dir, &root_name)?;
    for report in &reports {
        let pair = report.pair;
        let (Some(reference), Some(measured)) =
            (table.column(pair.reference), table.column(pair.measured))
        else {
            continue;
        };
        let output = output_dir.join(format!("{root_name}_{}_ErrorMap.png", pair.file_tag()));
        plot_error_map(reference, measured, &output, &format!("{root_name} [{pair}]"))
            .map_err(|e| anyhow!("rendering '{}': {e}", output.display()))?;
    }
    Ok(())
}

fn render_point_clouds(table: &PositionTable, output_dir: &Path, root_name: &str) -> Result<()> {
    let clouds: Vec<(&str, &[Vec3])> = LogColumn::ALL
        .iter()
        .filter_map(|column| table.column(*column).map(|points| (column.label(), points)))
        .collect();
    let output = output_dir.join(format!("{root_name}_PointClouds.png"));
    plot_point_clouds(&clouds, &output, root_name)
        .map_err(|e| anyhow!("rendering '{}': {e}", output.display()))
}

/// Frames served by the simulated tracker: one sensor at the calibration origin
/// and one 10 mm along each Emio axis.
fn mock_frames() -> Vec<RawFrame> {
    let origin = [16.55, 0.45, -22.75];
    let offsets = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
    offsets
        .iter()
        .map(|o| RawFrame {
            position: [origin[0] + o[0], origin[1] + o[1], origin[2] + o[2]],
            quaternion: [1.0, 0.0, 0.0, 0.0],
        })
        .collect()
}

fn cmd_poll(sensors: usize, interval: Duration, count: u64, mock: bool) -> Result<()> {
    if sensors == 0 || sensors > POLHEMUS_MAX_SENSORS {
        bail!("--sensors must be between 1 and {POLHEMUS_MAX_SENSORS}");
    }

    if mock {
        info!("Polling a simulated tracker");
        let mut poller = PolhemusUsb::with_transport(MockTransport::with_fallback(&mock_frames()))?;
        return poll_loop(&mut poller, sensors, interval, count);
    }
    poll_device(sensors, interval, count)
}

#[cfg(feature = "usb")]
fn poll_device(sensors: usize, interval: Duration, count: u64) -> Result<()> {
    let mut poller = PolhemusUsb::try_connect().context("connecting to the Polhemus tracker")?;
    poll_loop(&mut poller, sensors, interval, count)
}

#[cfg(not(feature = "usb"))]
fn poll_device(_sensors: usize, _interval: Duration, _count: u64) -> Result<()> {
    bail!("built without the `usb` feature; use --mock")
}

fn poll_loop<T: UsbTransport>(
    poller: &mut PolhemusUsb<T>,
    sensors: usize,
    interval: Duration,
    count: u64,
) -> Result<()> {
    for tick in 0..count {
        match poller.poll() {
            Ok(_) => {
                for (index, sample) in poller.sensors().iter().take(sensors).enumerate() {
                    println!(
                        "[{tick}] sensor {}: {} q={:?}",
                        index + 1,
                        format_vector(&sample.position()),
                        sample.quaternion()
                    );
                }
            }
            Err(e) if e.is_transient() => warn!("Poll {tick} skipped: {e}"),
            Err(e) => return Err(e.into()),
        }
        thread::sleep(interval);
    }
    Ok(())
}

fn cmd_dry_run(
    args: &TargetArgs,
    config: SequencerConfig,
    settle_ticks: u32,
    max_ticks: u64,
    log: &Path,
) -> Result<()> {
    let points = args.generate()?;
    info!("Generated {} {} targets", points.len(), args.shape);

    let mut controller = SequencingController::new(points, config, log)
        .with_context(|| format!("creating measurement log '{}'", log.display()))?;
    let mut host = StandInHost::new(settle_ticks, DRY_RUN_TRACKING_GAIN)?;
    let initial_goal = controller.initial_goal();

    let report = run_dry_run(&mut controller, &mut host, initial_goal, max_ticks)?;
    println!(
        "Dry run: {} ticks, {} rows written to '{}'{}",
        report.ticks,
        report.rows,
        log.display(),
        if report.finished { "" } else { " (tick limit reached)" }
    );
    Ok(())
}

// src/main.rs
