use log::error;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::General;
use crate::errors::LoggingError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} - {m}{n}";

/// Sets up log4rs given the general configuration parameters.
///
/// The console appender writes to stderr since stdout is reserved for the prediction report.
///
/// # Arguments
///
/// * 'general' - general configuration including log level and log destinations
pub fn setup_logger(general: &General) -> Result<(), LoggingError> {
    let config = build_log_config(general)?;
    log4rs::init_config(config)?;

    Ok(())
}

/// Logs a fatal error and returns its message when it must also be written to stderr,
/// that is when no console appender is configured
///
/// # Arguments
///
/// * 'general' - general configuration including log destinations
/// * 'err' - the error that ended the run
pub fn log_fatal(general: &General, err: &anyhow::Error) -> Option<String> {
    let message = format!("{:#}", err);
    error!("{}", message);

    if general.log_to_stdout {
        None
    } else {
        Some(message)
    }
}

/// Builds the log4rs configuration
///
/// # Arguments
///
/// * 'general' - general configuration including log level and log destinations
fn build_log_config(general: &General) -> Result<Config, LoggingError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if general.log_to_stdout {
        let console = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(console)));
        root = root.appender("console");
    }

    if !general.log_path.is_empty() {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(&general.log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    builder
        .build(root.build(general.log_level))
        .map_err(|e| LoggingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn console_only_config_builds() {
        let general = General { log_path: String::new(), log_level: LevelFilter::Warn, log_to_stdout: true };
        let config = build_log_config(&general).unwrap();
        assert_eq!(config.appenders().len(), 1);
        assert_eq!(config.root().level(), LevelFilter::Warn);
    }

    #[test]
    fn no_destinations_builds_silent_config() {
        let general = General { log_path: String::new(), log_level: LevelFilter::Info, log_to_stdout: false };
        let config = build_log_config(&general).unwrap();
        assert!(config.appenders().is_empty());
    }

    #[test]
    fn fatal_error_is_echoed_without_console() {
        let err = anyhow::anyhow!("no such file").context("loading forecast");

        let file_only = General { log_path: "solar.log".to_string(), log_level: LevelFilter::Info, log_to_stdout: false };
        assert_eq!(log_fatal(&file_only, &err), Some("loading forecast: no such file".to_string()));

        let console = General { log_path: String::new(), log_level: LevelFilter::Info, log_to_stdout: true };
        assert_eq!(log_fatal(&console, &err), None);
    }

    #[test]
    fn file_appender_is_added_when_path_set() {
        let path = std::env::temp_dir().join("solar_forecast_logging_test.log");
        let general = General {
            log_path: path.to_string_lossy().to_string(),
            log_level: LevelFilter::Debug,
            log_to_stdout: true,
        };
        let config = build_log_config(&general).unwrap();
        assert_eq!(config.appenders().len(), 2);
        let _ = std::fs::remove_file(path);
    }
}
