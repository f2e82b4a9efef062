use std::path::Path;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use log::{debug, info};
use crate::cells::{to_date, to_time, Cell};
use crate::config::SunColumns;
use crate::errors::LoadError;
use crate::models::sun_table::{SunTableRow, DATE, SUNRISE, SUN_NOON, SUNSET};

static EMPTY_CELL: Cell = Cell::Empty;

/// Loads the sunrise/sunset table from a spreadsheet (first worksheet) or a csv file.
///
/// Source headers are relabelled to the canonical names date, sunrise, sun_noon and sunset
/// given the column mapping. Any other columns are ignored.
///
/// # Arguments
///
/// * 'path' - path to the sun table, csv if the extension is csv, otherwise a spreadsheet
/// * 'columns' - mapping from canonical name to source header
pub fn load_sun_table(path: &str, columns: &SunColumns) -> Result<Vec<SunTableRow>, LoadError> {
    let file = Path::new(path);
    if !file.exists() {
        return Err(LoadError::NotFound(format!("sun table {}", path)));
    }

    let is_csv = file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let (headers, cells) = if is_csv {
        read_csv_cells(path)?
    } else {
        read_spreadsheet_cells(path)?
    };

    let rows = read_sun_rows(path, &headers, cells, columns)?;
    info!("loaded {} sun table rows from {}", rows.len(), path);

    Ok(rows)
}

/// Reads the first worksheet of a spreadsheet into a header row and data rows
///
/// # Arguments
///
/// * 'path' - path to the spreadsheet
fn read_spreadsheet_cells(path: &str) -> Result<(Vec<String>, Vec<Vec<Cell>>), LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::Document(format!("no worksheet found in {}", path)))??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or(LoadError::Document(format!("empty worksheet in {}", path)))?
        .iter()
        .map(|d| d.to_string().trim().to_string())
        .collect::<Vec<String>>();

    let cells = rows
        .map(|r| r.iter().map(data_to_cell).collect::<Vec<Cell>>())
        .collect::<Vec<Vec<Cell>>>();

    Ok((headers, cells))
}

/// Reads a csv file into a header row and data rows, all cells as text
///
/// # Arguments
///
/// * 'path' - path to the csv file
fn read_csv_cells(path: &str) -> Result<(Vec<String>, Vec<Vec<Cell>>), LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(|h| h.to_string()).collect::<Vec<String>>();

    let mut cells: Vec<Vec<Cell>> = Vec::new();
    for record in reader.records() {
        cells.push(record?.iter().map(|c| Cell::Text(c.to_string())).collect());
    }

    Ok((headers, cells))
}

/// Translates a spreadsheet value to a table cell
///
/// # Arguments
///
/// * 'data' - the spreadsheet value
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => dt.as_datetime().map_or(Cell::Number(dt.as_f64()), Cell::DateTime),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Picks the mapped columns out of the raw rows and coerces them to sun table rows.
/// Rows where every cell is empty are skipped.
///
/// # Arguments
///
/// * 'file' - file name used in error messages
/// * 'headers' - source headers
/// * 'cells' - raw data rows
/// * 'columns' - mapping from canonical name to source header
fn read_sun_rows(file: &str, headers: &[String], cells: Vec<Vec<Cell>>, columns: &SunColumns) -> Result<Vec<SunTableRow>, LoadError> {
    let index_of = |source: &str| {
        headers
            .iter()
            .position(|h| h == source.trim())
            .ok_or(LoadError::MissingColumn { file: file.to_string(), column: source.to_string() })
    };

    let date_idx = index_of(columns.date.as_str())?;
    let sunrise_idx = index_of(columns.sunrise.as_str())?;
    let sun_noon_idx = index_of(columns.sun_noon.as_str())?;
    let sunset_idx = index_of(columns.sunset.as_str())?;

    let mapped = [date_idx, sunrise_idx, sun_noon_idx, sunset_idx];
    let ignored = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !mapped.contains(i))
        .map(|(_, h)| h.as_str())
        .collect::<Vec<&str>>();
    if !ignored.is_empty() {
        debug!("ignoring sun table columns {:?}", ignored);
    }

    let mut rows: Vec<SunTableRow> = Vec::with_capacity(cells.len());
    for (i, row) in cells.iter().enumerate() {
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }

        // header is row 1
        let row_no = i + 2;
        let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY_CELL);
        let parse_error = |column: &str, msg: String| LoadError::Parse {
            file: file.to_string(),
            row: row_no,
            column: column.to_string(),
            msg,
        };

        rows.push(SunTableRow {
            date: to_date(cell(date_idx)).map_err(|e| parse_error(DATE, e))?,
            sunrise: to_time(cell(sunrise_idx)).map_err(|e| parse_error(SUNRISE, e))?,
            sun_noon: to_time(cell(sun_noon_idx)).map_err(|e| parse_error(SUN_NOON, e))?,
            sunset: to_time(cell(sunset_idx)).map_err(|e| parse_error(SUNSET, e))?,
        });
    }

    Ok(rows)
}
