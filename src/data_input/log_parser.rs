// src/data_input/log_parser.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info};

use crate::constants::{LOG_DELIMITER, LOG_HEADER_ROWS};
use crate::data_input::log_data::{LogLayout, PositionTable};
use crate::data_input::vector_text::parse_vector;
use crate::error::{ValidationError, ValidationResult};
use crate::types::Vec3;

/// Loads the position columns of a measurement log.
///
/// The first `LOG_HEADER_ROWS` physical lines are skipped without being decoded;
/// they are the format's metadata preamble and may be blank or hold any bytes.
/// Every following non-blank line holds 2 to 4 vector fields (Target,
/// Simulation, then optionally DepthCamera and Polhemus). The width of the first
/// data row fixes the layout for the whole file. Blank data lines carry no
/// fields and are skipped.
///
/// Any field that is not a three-component vector, or not UTF-8, is a
/// `MalformedRow` carrying the 1-based file line of the offending row.
pub fn load_positions(input_file_path: &Path) -> ValidationResult<PositionTable> {
    let mut input = BufReader::new(File::open(input_file_path)?);
    let skipped = skip_header_rows(&mut input)?;
    debug!("Skipped {skipped} header rows");

    let mut table: Option<PositionTable> = None;

    for (offset, bytes) in input.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = LOG_HEADER_ROWS + offset + 1;
        let Some(record) = read_record(&bytes)? else {
            continue;
        };

        let fields = record
            .iter()
            .map(|field| {
                decode_field(field).map_err(|reason| ValidationError::malformed(line, reason))
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        let layout = match &table {
            Some(existing) => existing.layout(),
            None => {
                let layout = LogLayout::from_column_count(fields.len())
                    .map_err(|e| ValidationError::malformed(line, e.to_string()))?;
                debug!("Detected log layout {:?}", layout.headers());
                layout
            }
        };
        let table = table.get_or_insert_with(|| PositionTable::new(layout));
        if fields.len() != table.layout().column_count() {
            return Err(ValidationError::malformed(
                line,
                format!(
                    "expected {} fields, found {}",
                    table.layout().column_count(),
                    fields.len()
                ),
            ));
        }
        table.push_row(fields)?;
    }

    let table = table.unwrap_or_else(|| PositionTable::new(LogLayout::basic()));
    info!(
        "Loaded {} position rows from '{}'",
        table.len(),
        input_file_path.display()
    );
    Ok(table)
}

/// Consumes up to `LOG_HEADER_ROWS` raw lines; returns how many were present.
fn skip_header_rows<R: BufRead>(input: &mut R) -> ValidationResult<usize> {
    let mut row = Vec::new();
    for skipped in 0..LOG_HEADER_ROWS {
        row.clear();
        if input.read_until(b'\n', &mut row)? == 0 {
            return Ok(skipped);
        }
    }
    Ok(LOG_HEADER_ROWS)
}

/// Splits one physical line into fields; `None` for a blank line.
fn read_record(line: &[u8]) -> ValidationResult<Option<ByteRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(LOG_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    let mut record = ByteRecord::new();
    if reader.read_byte_record(&mut record)? {
        Ok(Some(record))
    } else {
        Ok(None)
    }
}

fn decode_field(field: &[u8]) -> Result<Vec3, String> {
    let text = std::str::from_utf8(field).map_err(|e| format!("field is not UTF-8: {e}"))?;
    parse_vector(text)
}
