use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// One hourly weather forecast record
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub timestamp: NaiveDateTime,
    /// Weather attribute values, ordered as in ForecastTable::attributes
    pub values: Vec<f64>,
}

impl ForecastRow {
    /// Returns the calendar date of the forecast timestamp
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Returns the hour of day (0-23) of the forecast timestamp
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// The loaded forecast, attribute names in file order with the timestamp column excluded
#[derive(Debug, Clone, Default)]
pub struct ForecastTable {
    pub attributes: Vec<String>,
    pub rows: Vec<ForecastRow>,
}
