//! Inline SVG line chart for temperature and humidity

use crate::model::Reading;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 300.0;
const PADDING: f64 = 40.0;

fn series_points(readings: &[&Reading], value: fn(&Reading) -> f64) -> String {
    let values: Vec<f64> = readings.iter().map(|r| value(r)).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };
    let step = if values.len() > 1 {
        (WIDTH - 2.0 * PADDING) / (values.len() - 1) as f64
    } else {
        0.0
    };

    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = PADDING + step * i as f64;
            let y = HEIGHT - PADDING - (v - min) / span * (HEIGHT - 2.0 * PADDING);
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `readings` must be oldest first
pub fn line_chart(readings: &[&Reading]) -> String {
    if readings.is_empty() {
        return r#"<p class="chart-empty">No data available for chart</p>"#.to_string();
    }
    format!(
        r##"<svg class="chart" viewBox="0 0 {w} {h}" width="100%" role="img" aria-label="Readings chart">
            <rect x="0" y="0" width="{w}" height="{h}" fill="#fff"/>
            <polyline data-series="temperature" fill="none" stroke="#dc3545" stroke-width="2" points="{temperature}"/>
            <polyline data-series="humidity" fill="none" stroke="#0d6efd" stroke-width="2" points="{humidity}"/>
            <text x="{pad}" y="20" fill="#dc3545">Temperature (&deg;C)</text>
            <text x="{legend}" y="20" fill="#0d6efd">Humidity (%)</text>
        </svg>"##,
        w = WIDTH,
        h = HEIGHT,
        pad = PADDING,
        legend = PADDING + 200.0,
        temperature = series_points(readings, |r| r.temperature),
        humidity = series_points(readings, |r| r.humidity),
    )
}
