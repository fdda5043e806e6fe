use std::path::Path;

use crate::data::parser::{self, ColumnSet};
use crate::error::{LoadError, ViewerError};
use crate::state::data_series::SampleSeries;

/// Name of the time column, and the prefix of the header line.
pub const TIME_COLUMN: &str = "timestamp";

/// Parsed log: normalized column names, the time column and every column
/// as numeric cells. A cell is `None` when the log left it blank (channel not
/// sampled on that row) and `Some(NAN)` when it held non-numeric text.
#[derive(Debug, Clone)]
pub struct LogTable {
    columns: Vec<String>,
    times: Vec<f64>,
    column_data: Vec<Vec<Option<f64>>>, // column-major: column_data[col_idx][row_idx]
}

impl LogTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_set(&self) -> ColumnSet {
        ColumnSet::new(&self.columns)
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn row_count(&self) -> usize {
        self.times.len()
    }

    /// Build the sample series for one column. Blank cells are skipped, so
    /// channels logged at a lower rate get their own irregular time base.
    pub fn series(&self, column: &str) -> Option<Result<SampleSeries, ViewerError>> {
        let key = parser::normalize_column_name(column).to_lowercase();
        let col_idx = self
            .columns
            .iter()
            .position(|c| c.to_lowercase() == key)?;

        let cells = &self.column_data[col_idx];
        let mut times = Vec::with_capacity(cells.len());
        let mut values = Vec::with_capacity(cells.len());
        for (&t, cell) in self.times.iter().zip(cells) {
            if let Some(v) = cell {
                times.push(t);
                values.push(*v);
            }
        }
        Some(SampleSeries::new(times, values))
    }
}

/// Read a log file from disk.
pub fn load_file(path: &Path) -> Result<LogTable, LoadError> {
    let content = std::fs::read(path)?;
    let text = parser::decode_text(content);
    let table = parse_log(&text)?;
    tracing::info!(
        "Loaded {} rows x {} columns from {:?}",
        table.row_count(),
        table.columns().len(),
        path
    );
    Ok(table)
}

/// Parse log text: skip the metadata blocks, read the table from the
/// `timestamp` header, drop rows whose timestamp does not parse.
pub fn parse_log(text: &str) -> Result<LogTable, LoadError> {
    let header_line = parser::find_header_line(text, TIME_COLUMN)
        .ok_or_else(|| LoadError::MissingHeader(TIME_COLUMN.to_string()))?;
    let offset = parser::line_offset(text, header_line)
        .ok_or_else(|| LoadError::MissingHeader(TIME_COLUMN.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(text[offset..].as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(parser::normalize_column_name)
        .collect();

    let time_idx = columns
        .iter()
        .position(|c| c == TIME_COLUMN)
        .ok_or_else(|| LoadError::MissingTimeColumn {
            expected: TIME_COLUMN.to_string(),
            found: columns.clone(),
        })?;

    let mut times = Vec::new();
    let mut column_data: Vec<Vec<Option<f64>>> = vec![Vec::new(); columns.len()];
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("Skipping unreadable row: {e}");
                dropped += 1;
                continue;
            }
        };

        let time = match record.get(time_idx).and_then(parse_cell) {
            Some(t) if t.is_finite() => t,
            _ => {
                dropped += 1;
                continue;
            }
        };

        times.push(time);
        for (col_idx, col_data) in column_data.iter_mut().enumerate() {
            col_data.push(record.get(col_idx).and_then(parse_cell));
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {dropped} rows without a valid timestamp");
    }
    if times.is_empty() {
        return Err(LoadError::NoRows);
    }

    let mut table = LogTable { columns, times, column_data };
    sort_by_time(&mut table);
    Ok(table)
}

/// Parse one cell. Blank cells are `None`; text that is not a number is
/// kept as a missing sample (`NAN`).
fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
}

fn sort_by_time(table: &mut LogTable) {
    if table.times.windows(2).all(|w| w[0] <= w[1]) {
        return;
    }
    tracing::warn!("Log rows are not in time order; sorting by timestamp");

    let mut order: Vec<usize> = (0..table.times.len()).collect();
    order.sort_by(|&a, &b| table.times[a].total_cmp(&table.times[b]));

    table.times = order.iter().map(|&i| table.times[i]).collect();
    for col in &mut table.column_data {
        *col = order.iter().map(|&i| col[i]).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
JB4 Stinger GT,fw 44
map,2
timestamp, RPM ,ECU  Boost,GPS Speed,Pedal
0.0,900,0.5,,10
0.1,1500,2.0,12,20
bad,1,1,1,1
0.2,2100,--,,30
0.3,2600,6.5,14,40
";

    #[test]
    fn parses_table_after_metadata() {
        let table = parse_log(LOG).unwrap();
        assert_eq!(
            table.columns(),
            &["timestamp", "RPM", "ECU Boost", "GPS Speed", "Pedal"]
        );
        assert_eq!(table.times(), &[0.0, 0.1, 0.2, 0.3]);
        assert_eq!(table.column_set().get("ecu boost"), Some("ECU Boost"));
    }

    #[test]
    fn blank_cells_thin_out_the_series() {
        let table = parse_log(LOG).unwrap();
        let speed = table.series("GPS Speed").unwrap().unwrap();
        assert_eq!(speed.times(), &[0.1, 0.3]);
        assert_eq!(speed.value_at(0), Some(12.0));
    }

    #[test]
    fn non_numeric_cells_become_missing_values() {
        let table = parse_log(LOG).unwrap();
        let boost = table.series("ECU Boost").unwrap().unwrap();
        assert_eq!(boost.len(), 4);
        assert_eq!(boost.value_at(2), None);
        assert_eq!(boost.value_at(3), Some(6.5));
    }

    #[test]
    fn unknown_column_has_no_series() {
        let table = parse_log(LOG).unwrap();
        assert!(table.series("AFR").is_none());
    }

    #[test]
    fn missing_header_is_reported() {
        let err = parse_log("a,b\n1,2\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingHeader(_)));
    }

    #[test]
    fn header_without_rows_is_reported() {
        let err = parse_log("timestamp,RPM\n").unwrap_err();
        assert!(matches!(err, LoadError::NoRows));
    }

    #[test]
    fn out_of_order_rows_are_sorted() {
        let table = parse_log("timestamp,RPM\n0.2,3\n0.0,1\n0.1,2\n").unwrap();
        assert_eq!(table.times(), &[0.0, 0.1, 0.2]);
        let rpm = table.series("RPM").unwrap().unwrap();
        assert_eq!((0..3).map(|i| rpm.value_at(i)).collect::<Vec<_>>(), [Some(1.0), Some(2.0), Some(3.0)]);
    }
}
