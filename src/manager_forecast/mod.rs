use std::path::Path;
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use crate::cells::{parse_timestamp, to_f64, Cell};
use crate::errors::LoadError;
use crate::models::forecast::{ForecastRow, ForecastTable};

/// Name of the forecast column holding the row timestamp
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Loads the weather forecast from a csv file with a header row.
///
/// The timestamp column is required, every other column is treated as a numeric weather
/// attribute and kept in file order.
///
/// # Arguments
///
/// * 'path' - path to the forecast csv file
pub fn load_forecast(path: &str) -> Result<ForecastTable, LoadError> {
    if !Path::new(path).exists() {
        return Err(LoadError::NotFound(format!("forecast file {}", path)));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let table = read_forecast(path, &headers, reader.records())?;
    info!("loaded {} forecast rows with {} weather attributes from {}", table.rows.len(), table.attributes.len(), path);

    Ok(table)
}

/// Builds the forecast table from csv headers and records
///
/// # Arguments
///
/// * 'file' - file name used in error messages
/// * 'headers' - the csv header record
/// * 'records' - iterator over csv data records
fn read_forecast<I>(file: &str, headers: &StringRecord, records: I) -> Result<ForecastTable, LoadError>
where
    I: Iterator<Item = Result<StringRecord, csv::Error>>,
{
    let ts_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or(LoadError::MissingColumn { file: file.to_string(), column: TIMESTAMP_COLUMN.to_string() })?;

    let attributes = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ts_idx)
        .map(|(_, h)| h.to_string())
        .collect::<Vec<String>>();
    debug!("forecast weather attributes: {:?}", attributes);

    let mut rows: Vec<ForecastRow> = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record?;
        // header is row 1
        let row_no = i + 2;
        let parse_error = |column: &str, msg: String| LoadError::Parse {
            file: file.to_string(),
            row: row_no,
            column: column.to_string(),
            msg,
        };

        let raw_ts = record.get(ts_idx).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts).map_err(|e| parse_error(TIMESTAMP_COLUMN, e))?;

        let mut values: Vec<f64> = Vec::with_capacity(attributes.len());
        for (idx, name) in headers.iter().enumerate().filter(|(i, _)| *i != ts_idx) {
            let cell = Cell::Text(record.get(idx).unwrap_or("").to_string());
            values.push(to_f64(&cell).map_err(|e| parse_error(name, e))?);
        }

        rows.push(ForecastRow { timestamp, values });
    }

    Ok(ForecastTable { attributes, rows })
}
