use thiserror::Error;

/// Error while loading the configuration file
#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(format!("io error: {}", e)) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(format!("toml document error: {}", e)) }
}

/// Error while setting up logging
#[derive(Error, Debug)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}
impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(format!("log file error: {}", e)) }
}

/// Errors from reading the forecast file or the sun table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("LoadError::NotFound: {0}")]
    NotFound(String),
    #[error("LoadError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("LoadError::Csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("LoadError::Spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("LoadError::MissingColumn: column '{column}' not found in {file}")]
    MissingColumn { file: String, column: String },
    #[error("LoadError::Parse: {file}, row {row}, column '{column}': {msg}")]
    Parse { file: String, row: usize, column: String, msg: String },
    #[error("LoadError::Document: {0}")]
    Document(String),
}

/// Errors from aligning forecast rows with the sun table
#[derive(Error, Debug)]
pub enum JoinError {
    #[error("JoinError::Unmatched: {count} forecast rows have no sun table entry, dates: {dates}")]
    Unmatched { count: usize, dates: String },
}

/// Errors from loading or evaluating the regression model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("ModelError::Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("ModelError::Document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("ModelError::Invalid: {0}")]
    Invalid(String),
    #[error("ModelError::SchemaMismatch: {0}")]
    SchemaMismatch(String),
}

/// Errors from writing the chart
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("ReportError::Chart: {0}")]
    Chart(String),
    #[error("ReportError::Io: {0}")]
    Io(#[from] std::io::Error),
}
impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>> for ReportError {
    fn from(e: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ReportError::Chart(e.to_string())
    }
}

/// Error while initializing configuration and logging
#[derive(Error, Debug)]
pub enum InitError {
    #[error("InitError::Config: {0}")]
    Config(#[from] ConfigError),
    #[error("InitError::Logging: {0}")]
    Logging(#[from] LoggingError),
}
