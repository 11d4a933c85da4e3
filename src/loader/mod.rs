//! Delimited file loader.
//!
//! Reads the accident table into [`RawTable`], keeping row order and
//! resolving the handful of columns the rest of the pipeline needs by
//! header name once, up front.
//!
//! Rows shorter than the header are padded with empty cells; rows longer
//! than the header are rejected.

use crate::error::{PipelineError, Result};
use crate::models::{RawRecord, RawTable};
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "Date";
pub const OPERATOR_COLUMN: &str = "Operator";
pub const ABOARD_COLUMN: &str = "Aboard";
pub const FATALITIES_COLUMN: &str = "Fatalities";

/// Header prefix marking the free-text description column some exports
/// carry in first position.
const DESCRIPTIVE_COLUMN_PREFIX: &str = "accident";

/// Positions of the columns we read, in the file's own column order.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    operator: usize,
    aboard: usize,
    fatalities: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[(usize, String)], path: &Path) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .find(|(_, header)| header == name)
                .map(|(idx, _)| *idx)
                .ok_or_else(|| PipelineError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };

        Ok(Self {
            date: find(DATE_COLUMN)?,
            operator: find(OPERATOR_COLUMN)?,
            aboard: find(ABOARD_COLUMN)?,
            fatalities: find(FATALITIES_COLUMN)?,
        })
    }

    fn extract(&self, record: &ByteRecord) -> RawRecord {
        let cell = |idx: usize| {
            record
                .get(idx)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        };

        RawRecord {
            date: cell(self.date),
            operator: cell(self.operator),
            aboard: cell(self.aboard),
            fatalities: cell(self.fatalities),
        }
    }
}

/// Load the accident table from a file on disk.
pub fn load_table(path: &Path) -> Result<RawTable> {
    info!("Loading accident records from {}", path.display());

    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = load_from_reader(file, path)?;
    info!("Loaded {} records", table.len());
    debug!("Columns: {}", table.columns.join(", "));
    Ok(table)
}

/// Load the accident table from any reader.
///
/// `origin` is only used to label errors.
pub fn load_from_reader<R: Read>(reader: R, origin: &Path) -> Result<RawTable> {
    let parse_error = |source| PipelineError::Parse {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let mut headers: Vec<(usize, String)> = reader
        .byte_headers()
        .map_err(parse_error)?
        .iter()
        .enumerate()
        .map(|(idx, h)| (idx, String::from_utf8_lossy(h).into_owned()))
        .collect();
    let width = headers.len();

    if should_drop_first_column(&headers) {
        let (_, dropped) = headers.remove(0);
        debug!("Dropping descriptive column '{}'", dropped);
    }

    let index = ColumnIndex::resolve(&headers, origin)?;
    let columns = headers.into_iter().map(|(_, h)| h).collect();

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record).map_err(parse_error)? {
        if record.len() > width {
            return Err(PipelineError::TooManyFields {
                path: origin.to_path_buf(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: width,
                found: record.len(),
            });
        }
        rows.push(index.extract(&record));
    }

    Ok(RawTable { columns, rows })
}

fn should_drop_first_column(headers: &[(usize, String)]) -> bool {
    headers
        .first()
        .map(|(_, h)| h.to_lowercase().starts_with(DESCRIPTIVE_COLUMN_PREFIX))
        .unwrap_or(false)
}
