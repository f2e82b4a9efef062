use std::fs;
use std::path::Path;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Files {
    pub forecast: String,
    pub sun_table: String,
    pub model: String,
    pub chart: String,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            forecast: "data/forecast.csv".to_string(),
            sun_table: "data/sunrise-sunset.xlsx".to_string(),
            model: "models/random_forest.json".to_string(),
            chart: "predictions/predictions.png".to_string(),
        }
    }
}

/// Source headers in the sun table, mapped to the canonical column names
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SunColumns {
    pub date: String,
    pub sunrise: String,
    pub sun_noon: String,
    pub sunset: String,
}

impl Default for SunColumns {
    fn default() -> Self {
        Self {
            date: "datum".to_string(),
            sunrise: "Opkomst".to_string(),
            sun_noon: "Op ware middag".to_string(),
            sunset: "Ondergang".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ChartParameters {
    pub width: u32,
    pub height: u32,
    pub caption: String,
    pub y_desc: String,
}

impl Default for ChartParameters {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 600,
            caption: "Predicted solar production".to_string(),
            y_desc: "kWh".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PipelineParameters {
    pub strict_join: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_path: String::new(),
            log_level: LevelFilter::Info,
            log_to_stdout: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub files: Files,
    pub sun_columns: SunColumns,
    pub chart: ChartParameters,
    pub pipeline: PipelineParameters,
    pub general: General,
}

/// Loads the configuration file and returns a struct with all configuration items.
/// If the file doesn't exist the built-in defaults are returned.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let path = Path::new(config_path);
    if !path.exists() {
        return Ok(Config::default());
    }

    let toml = fs::read_to_string(path)?;
    parse_config(&toml)
}

/// Parses a configuration document
///
/// # Arguments
///
/// * 'toml' - the configuration as a toml string
fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.chart.width == 0 || config.chart.height == 0 {
        return Err(ConfigError::from("chart width and height must be greater than zero"));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.files.forecast, "data/forecast.csv");
        assert_eq!(config.files.sun_table, "data/sunrise-sunset.xlsx");
        assert_eq!(config.files.chart, "predictions/predictions.png");
        assert_eq!(config.sun_columns.sun_noon, "Op ware middag");
        assert_eq!(config.general.log_level, LevelFilter::Info);
        assert!(!config.pipeline.strict_join);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let toml = r#"
            [files]
            model = "other/model.json"

            [pipeline]
            strict_join = true

            [general]
            log_level = "debug"
        "#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.files.model, "other/model.json");
        assert_eq!(config.files.forecast, "data/forecast.csv");
        assert!(config.pipeline.strict_join);
        assert_eq!(config.general.log_level, LevelFilter::Debug);
        assert!(config.general.log_to_stdout);
        assert_eq!(config.chart.width, 1400);
    }

    #[test]
    fn zero_sized_chart_is_rejected() {
        assert!(parse_config("[chart]\nwidth = 0").is_err());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(parse_config("[files\nforecast = 1").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config("this/file/does/not/exist.toml").unwrap();
        assert_eq!(config.sun_columns.date, "datum");
    }
}
