use chrono::NaiveDateTime;
use crate::models::forecast::ForecastRow;
use crate::models::sun_table::SunTableRow;

/// A forecast row matched with the sun table row of the same date
#[derive(Debug, Clone, Copy)]
pub struct JoinedRow<'a> {
    pub forecast: &'a ForecastRow,
    pub sun: &'a SunTableRow,
}

/// Named feature columns and one row of values per joined row.
///
/// Timestamps are kept alongside the values (they are not part of the model schema) so
/// that every prediction can be reported against the row that produced it.
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub timestamps: Vec<NaiveDateTime>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    /// Returns the value of the named column for the given row, if both exist
    ///
    /// # Arguments
    ///
    /// * 'row' - row index
    /// * 'column' - column name
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(idx)).copied()
    }
}

/// Predicted production for one forecast hour, rounded to two decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
}
