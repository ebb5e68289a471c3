// src/data_input/measurement_log.rs

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use tracing::{debug, info};

use crate::constants::{
    LOG_DELIMITER, LOG_FORMAT_NAME, LOG_FORMAT_VERSION, LOG_HEADER_ROWS, LOG_UNITS,
};
use crate::data_input::log_data::{LogLayout, LogRow};
use crate::data_input::vector_text::format_vector;
use crate::error::{ValidationError, ValidationResult};

/// Run parameters recorded in the metadata rows of a log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMetadata {
    pub step_count: u32,
    pub proximity_gate: bool,
    pub distance_tolerance: f64,
    pub target_count: usize,
}

/// Append-only CSV log of target transitions.
///
/// The file is truncated and given its header block once, in `create`. Each row
/// is then written by opening the file in append mode, writing, flushing and
/// closing, so an interrupted run never damages rows already on disk.
#[derive(Debug)]
pub struct MeasurementLog {
    path: PathBuf,
    layout: LogLayout,
    rows_written: usize,
}

fn csv_writer<W: Write>(inner: W) -> Writer<W> {
    WriterBuilder::new()
        .delimiter(LOG_DELIMITER)
        .flexible(true)
        .from_writer(inner)
}

impl MeasurementLog {
    pub fn create(
        path: impl AsRef<Path>,
        layout: LogLayout,
        metadata: &LogMetadata,
    ) -> ValidationResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv_writer(File::create(&path)?);
        let header_rows = header_block(layout, metadata);
        debug_assert_eq!(header_rows.len(), LOG_HEADER_ROWS);
        for row in &header_rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!(
            "Created measurement log '{}' with columns {:?}",
            path.display(),
            layout.headers()
        );
        Ok(Self {
            path,
            layout,
            rows_written: 0,
        })
    }

    /// Appends one row with scoped file acquisition.
    pub fn append(&mut self, row: &LogRow) -> ValidationResult<()> {
        if row.field_count() != self.layout.column_count() {
            return Err(ValidationError::invalid(format!(
                "log row has {} fields but '{}' has {} columns",
                row.field_count(),
                self.path.display(),
                self.layout.column_count()
            )));
        }

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv_writer(file);
        writer.write_record(row.fields().map(format_vector))?;
        writer.flush()?;
        drop(writer);

        self.rows_written += 1;
        debug!("Logged row {} to '{}'", self.rows_written, self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> LogLayout {
        self.layout
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

/// The fixed nine-row preamble: eight `key;value` rows then the column headers.
fn header_block(layout: LogLayout, metadata: &LogMetadata) -> Vec<Vec<String>> {
    let kv = |key: &str, value: String| vec![key.to_string(), value];
    let mut columns_row = vec!["columns".to_string()];
    columns_row.extend(layout.headers().into_iter().map(String::from));

    vec![
        kv("format", LOG_FORMAT_NAME.to_string()),
        kv("version", LOG_FORMAT_VERSION.to_string()),
        kv("units", LOG_UNITS.to_string()),
        columns_row,
        kv("step_count", metadata.step_count.to_string()),
        kv("proximity_gate", metadata.proximity_gate.to_string()),
        kv("distance_tolerance", metadata.distance_tolerance.to_string()),
        kv("target_count", metadata.target_count.to_string()),
        layout.headers().into_iter().map(String::from).collect(),
    ]
}
