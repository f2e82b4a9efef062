use std::io::{self, Write};
use std::path::Path;
use chrono::Timelike;
use log::info;
use plotters::prelude::*;
use crate::config::ChartParameters;
use crate::errors::ReportError;
use crate::models::features::Prediction;

/// Formats a kwh value in its shortest form while always keeping one decimal
///
/// # Arguments
///
/// * 'kwh' - the value to format
pub fn format_kwh(kwh: f64) -> String {
    if kwh.fract() == 0.0 {
        format!("{:.1}", kwh)
    } else {
        format!("{}", kwh)
    }
}

/// Returns the report line for one prediction
///
/// # Arguments
///
/// * 'prediction' - the prediction to report
pub fn report_line(prediction: &Prediction) -> String {
    format!("{}: {}kwh", prediction.timestamp.format("%Y-%m-%d %H:%M:%S"), format_kwh(prediction.kwh))
}

/// Writes one line per prediction
///
/// # Arguments
///
/// * 'out' - where to write the report, normally stdout
/// * 'predictions' - predictions in forecast order
pub fn print_predictions<W: Write>(out: &mut W, predictions: &[Prediction]) -> Result<(), ReportError> {
    for p in predictions {
        writeln!(out, "{}", report_line(p))?;
    }
    out.flush()?;

    Ok(())
}

/// Returns the y-axis range, covering zero and all values with some headroom
///
/// # Arguments
///
/// * 'values' - the plotted values
fn y_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(0.0_f64, f64::min);
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    let span = if max - min > 0.0 { max - min } else { 1.0 };

    let low = if min < 0.0 { min - span * 0.1 } else { 0.0 };
    (low, max + span * 0.1)
}

/// One bar per prediction, indexed in forecast order and labelled with its hour of day
#[derive(Debug, PartialEq)]
struct ChartBars {
    bars: Vec<(u32, f64)>,
    hours: Vec<u32>,
}

impl ChartBars {
    fn values(&self) -> Vec<f64> {
        self.bars.iter().map(|(_, v)| *v).collect()
    }

    fn label(&self, index: u32) -> String {
        self.hours.get(index as usize).map(|h| h.to_string()).unwrap_or_default()
    }
}

/// Returns the chart bars for the predictions
///
/// # Arguments
///
/// * 'predictions' - predictions in forecast order
fn chart_bars(predictions: &[Prediction]) -> ChartBars {
    ChartBars {
        bars: predictions.iter().enumerate().map(|(i, p)| (i as u32, p.kwh)).collect(),
        hours: predictions.iter().map(|p| p.timestamp.hour()).collect(),
    }
}

/// Renders the predictions as a bar chart, one bar per prediction labelled with its hour,
/// and writes it as a png to the given path. Any existing file is overwritten.
///
/// # Arguments
///
/// * 'path' - output file path
/// * 'predictions' - predictions in forecast order
/// * 'params' - chart size and labels
pub fn render_chart(path: &str, predictions: &[Prediction], params: &ChartParameters) -> Result<(), ReportError> {
    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            return Err(ReportError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("chart directory {} does not exist", dir.display()),
            )));
        }
    }

    let chart_bars = chart_bars(predictions);
    let (y_low, y_high) = y_range(&chart_bars.values());
    let bars = chart_bars.bars.len().max(1) as u32;

    let root = BitMapBackend::new(path, (params.width, params.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&params.caption, ("sans-serif", 24.0))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d((0u32..bars).into_segmented(), y_low..y_high)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars as usize)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => chart_bars.label(*i),
            SegmentValue::Last => String::new(),
        })
        .x_desc("hour")
        .y_desc(&params.y_desc)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(2)
            .data(chart_bars.bars.iter().copied()),
    )?;

    root.present()?;
    info!("wrote chart with {} bars to {}", chart_bars.bars.len(), path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn prediction(hour: u32, kwh: f64) -> Prediction {
        Prediction {
            timestamp: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap().and_hms_opt(hour, 0, 0).unwrap(),
            kwh,
        }
    }

    #[test]
    fn values_keep_at_least_one_decimal() {
        assert_eq!(format_kwh(3.46), "3.46");
        assert_eq!(format_kwh(3.5), "3.5");
        assert_eq!(format_kwh(3.0), "3.0");
        assert_eq!(format_kwh(0.0), "0.0");
        assert_eq!(format_kwh(-0.13), "-0.13");
    }

    #[test]
    fn report_line_format() {
        assert_eq!(report_line(&prediction(13, 3.46)), "2023-05-01 13:00:00: 3.46kwh");
    }

    #[test]
    fn one_line_per_prediction_in_order() {
        let predictions = vec![prediction(9, 1.25), prediction(7, 0.0), prediction(8, 0.5)];
        let mut out: Vec<u8> = Vec::new();
        print_predictions(&mut out, &predictions).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<&str>>();
        assert_eq!(lines, vec![
            "2023-05-01 09:00:00: 1.25kwh",
            "2023-05-01 07:00:00: 0.0kwh",
            "2023-05-01 08:00:00: 0.5kwh",
        ]);
    }

    #[test]
    fn y_range_covers_zero_and_values() {
        let (low, high) = y_range(&[1.0, 4.0]);
        assert_eq!(low, 0.0);
        assert!(high > 4.0);

        let (low, high) = y_range(&[-2.0, 2.0]);
        assert!(low < -2.0);
        assert!(high > 2.0);

        let (low, high) = y_range(&[]);
        assert!(low < high);
    }

    #[test]
    fn one_bar_per_prediction_labelled_by_hour() {
        let predictions = vec![prediction(9, 1.25), prediction(7, 0.0), prediction(8, 0.5)];
        let chart_bars = chart_bars(&predictions);

        assert_eq!(chart_bars.bars.len(), predictions.len());
        assert_eq!(chart_bars.bars, vec![(0, 1.25), (1, 0.0), (2, 0.5)]);
        assert_eq!(chart_bars.hours, vec![9, 7, 8]);
        assert_eq!((0..3).map(|i| chart_bars.label(i)).collect::<Vec<String>>(), vec!["9", "7", "8"]);
        assert_eq!(chart_bars.label(3), "");
    }

    #[test]
    fn no_predictions_gives_no_bars() {
        let chart_bars = chart_bars(&[]);
        assert!(chart_bars.bars.is_empty());
        assert!(chart_bars.hours.is_empty());
        assert!(chart_bars.values().is_empty());
    }

    #[test]
    #[ignore = "draws text, needs system fonts"]
    fn chart_is_written_and_overwritten() {
        let path = std::env::temp_dir().join("solar_forecast_report_test.png");
        std::fs::write(&path, b"stale").unwrap();
        let path_str = path.to_str().unwrap();
        let params = ChartParameters { width: 400, height: 200, ..ChartParameters::default() };

        render_chart(path_str, &[prediction(6, 0.0), prediction(12, 3.46), prediction(18, 1.1)], &params).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let params = ChartParameters::default();
        let result = render_chart("/no/such/dir/chart.png", &[prediction(6, 1.0)], &params);
        assert!(matches!(result, Err(ReportError::Io(_))));
    }
}
