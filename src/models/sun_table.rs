use chrono::{NaiveDate, NaiveTime};

pub const DATE: &str = "date";
pub const SUNRISE: &str = "sunrise";
pub const SUN_NOON: &str = "sun_noon";
pub const SUNSET: &str = "sunset";

/// Sunrise, solar noon and sunset for one date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTableRow {
    pub date: NaiveDate,
    pub sunrise: NaiveTime,
    pub sun_noon: NaiveTime,
    pub sunset: NaiveTime,
}
