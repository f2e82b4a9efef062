use std::collections::{BTreeSet, HashMap};
use chrono::NaiveDate;
use log::{info, warn};
use crate::errors::JoinError;
use crate::models::features::JoinedRow;
use crate::models::forecast::ForecastRow;
use crate::models::sun_table::SunTableRow;

/// Inner join of forecast rows with sun table rows on calendar date.
///
/// Output order follows the forecast order. A forecast row matching several sun table rows
/// yields one joined row per match, in sun table order. Forecast rows without a match are
/// dropped with a warning, or rejected when strict is set.
///
/// # Arguments
///
/// * 'forecast' - forecast rows in file order
/// * 'sun' - sun table rows
/// * 'strict' - fail instead of dropping unmatched forecast rows
pub fn join_on_date<'a>(forecast: &'a [ForecastRow], sun: &'a [SunTableRow], strict: bool) -> Result<Vec<JoinedRow<'a>>, JoinError> {
    let mut by_date: HashMap<NaiveDate, Vec<&SunTableRow>> = HashMap::new();
    for s in sun {
        by_date.entry(s.date).or_default().push(s);
    }

    let mut joined: Vec<JoinedRow> = Vec::with_capacity(forecast.len());
    let mut unmatched: Vec<NaiveDate> = Vec::new();

    for f in forecast {
        match by_date.get(&f.date()) {
            Some(matches) => {
                for s in matches {
                    joined.push(JoinedRow { forecast: f, sun: s });
                }
            }
            None => unmatched.push(f.date()),
        }
    }

    if !unmatched.is_empty() {
        let dates = unmatched
            .iter()
            .collect::<BTreeSet<&NaiveDate>>()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        if strict {
            return Err(JoinError::Unmatched { count: unmatched.len(), dates });
        }
        warn!("dropping {} forecast rows without sun table entry, dates: {}", unmatched.len(), dates);
    }

    if joined.is_empty() {
        warn!("no forecast rows matched the sun table, nothing to predict");
    } else {
        info!("joined {} forecast rows with the sun table", joined.len());
    }

    Ok(joined)
}
