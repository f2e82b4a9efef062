use chrono::{Datelike, NaiveTime, Timelike};
use log::debug;
use crate::models::features::{FeatureMatrix, JoinedRow};

/// Derived columns appended after the weather attributes, in model schema order
pub const DERIVED_COLUMNS: [&str; 10] = [
    "hour",
    "sunrise",
    "sun_noon",
    "sunset",
    "light",
    "minutes_since_sunrise",
    "minutes_from_sun_noon",
    "minutes_until_sunset",
    "month",
    "day_of_year",
];

/// Daylight relative features for one joined row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaylightFeatures {
    pub hour: i64,
    pub sunrise: i64,
    pub sun_noon: i64,
    pub sunset: i64,
    pub light: i64,
    pub minutes_since_sunrise: i64,
    pub minutes_from_sun_noon: i64,
    pub minutes_until_sunset: i64,
    pub month: i64,
    pub day_of_year: i64,
}

impl DaylightFeatures {
    /// Returns the features as values in DERIVED_COLUMNS order
    pub fn to_values(&self) -> [f64; 10] {
        [
            self.hour as f64,
            self.sunrise as f64,
            self.sun_noon as f64,
            self.sunset as f64,
            self.light as f64,
            self.minutes_since_sunrise as f64,
            self.minutes_from_sun_noon as f64,
            self.minutes_until_sunset as f64,
            self.month as f64,
            self.day_of_year as f64,
        ]
    }
}

/// Converts a time of day to minutes past midnight, seconds are dropped
///
/// # Arguments
///
/// * 'time' - the time of day
pub fn minutes_past_midnight(time: NaiveTime) -> i64 {
    (time.hour() * 60 + time.minute()) as i64
}

/// Calculates the daylight relative features for one joined row.
///
/// Light is an hour granularity check, the row is lit if its hour lies between the sunrise
/// hour and the sunset hour, both inclusive.
///
/// # Arguments
///
/// * 'row' - forecast row joined with the sun table row for the same date
pub fn daylight_features(row: &JoinedRow) -> DaylightFeatures {
    let hour = row.forecast.hour() as i64;
    let hour_minutes = hour * 60;
    let date = row.forecast.date();

    let sunrise = minutes_past_midnight(row.sun.sunrise);
    let sun_noon = minutes_past_midnight(row.sun.sun_noon);
    let sunset = minutes_past_midnight(row.sun.sunset);

    let after_sunrise = hour >= row.sun.sunrise.hour() as i64;
    let before_sunset = hour <= row.sun.sunset.hour() as i64;

    DaylightFeatures {
        hour,
        sunrise,
        sun_noon,
        sunset,
        light: (after_sunrise && before_sunset) as i64,
        minutes_since_sunrise: hour_minutes - sunrise,
        minutes_from_sun_noon: (hour_minutes - sun_noon).abs(),
        minutes_until_sunset: sunset - hour_minutes,
        month: date.month() as i64,
        day_of_year: date.ordinal() as i64,
    }
}

/// Builds the model feature matrix from joined rows.
///
/// Columns are the weather attributes in forecast file order followed by DERIVED_COLUMNS.
/// Row order and cardinality follow the joined rows.
///
/// # Arguments
///
/// * 'attributes' - weather attribute names from the forecast
/// * 'joined' - forecast rows joined with the sun table
pub fn build_feature_matrix(attributes: &[String], joined: &[JoinedRow]) -> FeatureMatrix {
    let mut columns = attributes.to_vec();
    columns.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));

    let mut timestamps = Vec::with_capacity(joined.len());
    let mut rows = Vec::with_capacity(joined.len());

    for j in joined {
        let mut values = j.forecast.values.clone();
        values.extend_from_slice(&daylight_features(j).to_values());

        timestamps.push(j.forecast.timestamp);
        rows.push(values);
    }
    debug!("feature matrix: {} rows, columns {:?}", rows.len(), columns);

    FeatureMatrix { columns, timestamps, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::forecast::ForecastRow;
    use crate::models::sun_table::SunTableRow;

    fn sun() -> SunTableRow {
        SunTableRow {
            date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            sunrise: NaiveTime::from_hms_opt(7, 15, 0).unwrap(),
            sun_noon: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            sunset: NaiveTime::from_hms_opt(19, 40, 0).unwrap(),
        }
    }

    fn forecast(hour: u32) -> ForecastRow {
        ForecastRow {
            timestamp: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap(),
            values: vec![8.5, 60.0],
        }
    }

    fn features_at(hour: u32) -> DaylightFeatures {
        let f = forecast(hour);
        let s = sun();
        daylight_features(&JoinedRow { forecast: &f, sun: &s })
    }

    #[test]
    fn times_convert_to_minutes() {
        let f = features_at(10);
        assert_eq!(f.sunrise, 435);
        assert_eq!(f.sun_noon, 750);
        assert_eq!(f.sunset, 1180);
    }

    #[test]
    fn seconds_are_dropped() {
        assert_eq!(minutes_past_midnight(NaiveTime::from_hms_opt(7, 15, 59).unwrap()), 435);
    }

    #[test]
    fn light_uses_inclusive_hour_bounds() {
        assert_eq!(features_at(6).light, 0);
        assert_eq!(features_at(7).light, 1);
        assert_eq!(features_at(12).light, 1);
        assert_eq!(features_at(19).light, 1);
        assert_eq!(features_at(20).light, 0);
    }

    #[test]
    fn relative_minutes_keep_sign_except_noon() {
        let early = features_at(6);
        assert_eq!(early.minutes_since_sunrise, 360 - 435);
        assert_eq!(early.minutes_until_sunset, 1180 - 360);
        assert_eq!(early.minutes_from_sun_noon, 750 - 360);

        let late = features_at(21);
        assert_eq!(late.minutes_since_sunrise, 1260 - 435);
        assert_eq!(late.minutes_until_sunset, 1180 - 1260);
        assert_eq!(late.minutes_from_sun_noon, 1260 - 750);
    }

    #[test]
    fn distance_from_noon_is_never_negative() {
        for hour in 0..24 {
            assert!(features_at(hour).minutes_from_sun_noon >= 0);
        }
    }

    #[test]
    fn calendar_fields_come_from_the_date() {
        let f = features_at(10);
        assert_eq!(f.month, 3);
        assert_eq!(f.day_of_year, 60);
    }

    #[test]
    fn matrix_layout_follows_schema() {
        let rows = vec![forecast(6), forecast(13)];
        let s = sun();
        let joined = rows.iter().map(|f| JoinedRow { forecast: f, sun: &s }).collect::<Vec<JoinedRow>>();
        let attributes = vec!["temp".to_string(), "clouds".to_string()];

        let matrix = build_feature_matrix(&attributes, &joined);
        assert_eq!(matrix.columns.len(), 12);
        assert_eq!(&matrix.columns[..3], &["temp".to_string(), "clouds".to_string(), "hour".to_string()]);
        assert_eq!(matrix.columns.last().unwrap(), "day_of_year");
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.timestamps[1], rows[1].timestamp);
        assert_eq!(matrix.value(0, "temp"), Some(8.5));
        assert_eq!(matrix.value(1, "hour"), Some(13.0));
        assert_eq!(matrix.value(1, "light"), Some(1.0));
        assert_eq!(matrix.value(0, "minutes_from_sun_noon"), Some(390.0));
        assert!(matrix.rows.iter().all(|r| r.len() == matrix.columns.len()));
    }
}
