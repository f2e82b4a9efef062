use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Spreadsheet day zero, dates are stored as days since this date
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

const SECONDS_PER_DAY: f64 = 86400.0;

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];

/// The last one is the iso 8601 duration form used by OpenDocument spreadsheets
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M", "PT%HH%MM%S%.fS"];

/// A raw table cell as delivered by either the csv reader or the spreadsheet reader
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Coerces a cell to a number. Booleans are coerced to 1/0.
///
/// # Arguments
///
/// * 'cell' - the cell to coerce
pub fn to_f64(cell: &Cell) -> Result<f64, String> {
    match cell {
        Cell::Number(n) => Ok(*n),
        Cell::Text(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Ok(1.0)
            } else if s.eq_ignore_ascii_case("false") {
                Ok(0.0)
            } else {
                s.parse::<f64>().map_err(|_| format!("'{}' is not a number", s))
            }
        }
        Cell::Empty => Err("empty cell".to_string()),
        Cell::DateTime(dt) => Err(format!("expected a number, found date time {}", dt)),
    }
}

/// Parses a timestamp. RFC 3339 timestamps keep their local wall time, the offset is dropped.
///
/// # Arguments
///
/// * 'value' - the timestamp text
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();

    // Report lines print this wall time without the offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(format!("'{}' is not a recognized timestamp", value))
}

/// Coerces a cell to a calendar date
///
/// # Arguments
///
/// * 'cell' - the cell to coerce
pub fn to_date(cell: &Cell) -> Result<NaiveDate, String> {
    match cell {
        Cell::DateTime(dt) => Ok(dt.date()),
        Cell::Number(n) => serial_to_date_time(*n).map(|dt| dt.date()),
        Cell::Text(s) => {
            let s = s.trim();
            for format in DATE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                    return Ok(date);
                }
            }
            parse_timestamp(s)
                .map(|dt| dt.date())
                .map_err(|_| format!("'{}' is not a recognized date", s))
        }
        Cell::Empty => Err("empty cell".to_string()),
    }
}

/// Coerces a cell to a time of day
///
/// # Arguments
///
/// * 'cell' - the cell to coerce
pub fn to_time(cell: &Cell) -> Result<NaiveTime, String> {
    match cell {
        Cell::DateTime(dt) => Ok(dt.time()),
        Cell::Number(n) => fraction_to_time(*n),
        Cell::Text(s) => {
            let s = s.trim();
            for format in TIME_FORMATS {
                if let Ok(time) = NaiveTime::parse_from_str(s, format) {
                    return Ok(time);
                }
            }
            Err(format!("'{}' is not a recognized time", s))
        }
        Cell::Empty => Err("empty cell".to_string()),
    }
}

/// Converts a spreadsheet serial number (days since 1899-12-30, fraction is time of day)
///
/// # Arguments
///
/// * 'serial' - the serial number
fn serial_to_date_time(serial: f64) -> Result<NaiveDateTime, String> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(format!("{} is not a valid date serial", serial));
    }

    let epoch = NaiveDate::from_ymd_opt(SPREADSHEET_EPOCH.0, SPREADSHEET_EPOCH.1, SPREADSHEET_EPOCH.2)
        .ok_or("invalid spreadsheet epoch")?
        .and_time(NaiveTime::MIN);
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;

    epoch
        .checked_add_signed(Duration::seconds(seconds))
        .ok_or(format!("{} is out of range as a date serial", serial))
}

/// Converts the fractional part of a spreadsheet number to a time of day
///
/// # Arguments
///
/// * 'value' - day fraction, any integer part is ignored
fn fraction_to_time(value: f64) -> Result<NaiveTime, String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} is not a valid time fraction", value));
    }

    let seconds = ((value.fract() * SECONDS_PER_DAY).round() as u32) % 86400;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .ok_or(format!("{} is not a valid time fraction", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn numbers_and_booleans_coerce() {
        assert_eq!(to_f64(&text(" 12.5 ")).unwrap(), 12.5);
        assert_eq!(to_f64(&text("True")).unwrap(), 1.0);
        assert_eq!(to_f64(&text("false")).unwrap(), 0.0);
        assert_eq!(to_f64(&Cell::Number(3.0)).unwrap(), 3.0);
        assert!(to_f64(&text("cloudy")).is_err());
        assert!(to_f64(&Cell::Empty).is_err());
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap().and_hms_opt(13, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2023-05-01 13:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-05-01T13:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-05-01 13:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-05-01T13:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-05-01T13:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-05-01").unwrap().hour(), 0);
        assert!(parse_timestamp("01/05/2023 1pm").is_err());
    }

    #[test]
    fn dates_from_text_and_serials() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        assert_eq!(to_date(&text("2023-05-01")).unwrap(), expected);
        assert_eq!(to_date(&text("01-05-2023")).unwrap(), expected);
        assert_eq!(to_date(&text("2023-05-01 00:00:00")).unwrap(), expected);
        assert_eq!(to_date(&Cell::Number(45047.0)).unwrap(), expected);
        assert_eq!(to_date(&Cell::DateTime(expected.and_hms_opt(0, 0, 0).unwrap())).unwrap(), expected);
        assert!(to_date(&Cell::Number(-1.0)).is_err());
    }

    #[test]
    fn times_from_text_and_fractions() {
        let t = to_time(&text("07:15")).unwrap();
        assert_eq!((t.hour(), t.minute()), (7, 15));
        let t = to_time(&text("12:30:41")).unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (12, 30, 41));
        // 19:40 as a day fraction
        let t = to_time(&Cell::Number((19.0 * 60.0 + 40.0) / 1440.0)).unwrap();
        assert_eq!((t.hour(), t.minute()), (19, 40));
        // integer part (the date) is ignored
        let t = to_time(&Cell::Number(45047.5)).unwrap();
        assert_eq!((t.hour(), t.minute()), (12, 0));
        let t = to_time(&text("PT19H40M00S")).unwrap();
        assert_eq!((t.hour(), t.minute()), (19, 40));
        assert!(to_time(&text("sunrise")).is_err());
    }

    #[test]
    fn serial_carries_time_of_day() {
        let dt = serial_to_date_time(45047.25).unwrap();
        assert_eq!(dt.date().day(), 1);
        assert_eq!(dt.hour(), 6);
    }

    #[test]
    fn blank_text_counts_as_empty() {
        assert!(text("   ").is_empty());
        assert!(Cell::Empty.is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }
}
