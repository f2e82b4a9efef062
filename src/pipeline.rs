use std::io::Write;
use anyhow::{Context, Result};
use log::{debug, info};
use crate::config::Config;
use crate::feature_engineering::build_feature_matrix;
use crate::join::join_on_date;
use crate::manager_forecast::load_forecast;
use crate::manager_model::{predict_production, Model};
use crate::manager_sun::load_sun_table;
use crate::models::features::Prediction;
use crate::report::{print_predictions, render_chart};

/// Loads both sources, joins them on date, derives the features and predicts production
/// for every joined row, in forecast order.
///
/// # Arguments
///
/// * 'config' - the configuration with file paths and pipeline parameters
pub fn forecast_production(config: &Config) -> Result<Vec<Prediction>> {
    let forecast = load_forecast(&config.files.forecast)
        .with_context(|| format!("loading forecast {}", config.files.forecast))?;
    let sun = load_sun_table(&config.files.sun_table, &config.sun_columns)
        .with_context(|| format!("loading sun table {}", config.files.sun_table))?;

    let joined = join_on_date(&forecast.rows, &sun, config.pipeline.strict_join)
        .context("joining forecast with sun table")?;
    let matrix = build_feature_matrix(&forecast.attributes, &joined);
    debug!("derived {} feature rows with {} columns", matrix.len(), matrix.columns.len());

    let model = Model::load(&config.files.model)
        .with_context(|| format!("loading model {}", config.files.model))?;
    let predictions = predict_production(&model, &matrix).context("predicting production")?;

    Ok(predictions)
}

/// Runs the whole forecast once: predicts, writes the report lines and renders the chart
///
/// # Arguments
///
/// * 'config' - the configuration
/// * 'out' - where report lines are written, normally stdout
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let predictions = forecast_production(config)?;

    print_predictions(out, &predictions).context("printing predictions")?;
    render_chart(&config.files.chart, &predictions, &config.chart)
        .with_context(|| format!("rendering chart {}", config.files.chart))?;

    let total = predictions.iter().map(|p| p.kwh).sum::<f64>();
    info!("forecast done, {} hours, {:.2} kwh in total", predictions.len(), total);

    Ok(())
}
