use std::io;
use std::process::ExitCode;
use crate::initialization::init;
use crate::logging::log_fatal;

mod cells;
mod config;
mod errors;
mod feature_engineering;
mod initialization;
mod join;
mod logging;
mod manager_forecast;
mod manager_model;
mod manager_sun;
mod models;
mod pipeline;
mod report;

fn main() -> ExitCode {
    let config = match init() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    match pipeline::run(&config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(message) = log_fatal(&config.general, &e) {
                eprintln!("{}", message);
            }
            ExitCode::FAILURE
        }
    }
}
