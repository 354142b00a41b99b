use crate::pages::readings::{DeviceReadings, ReadingsPage};
use crate::session::Session;
use crate::views::{chart, escape, format_timestamp, layout, render_state};

fn stats_cards(data: &DeviceReadings) -> String {
    match data.stats() {
        Some(stats) => format!(
            r#"<div class="cards">
                <div class="card"><h3>Latest Temperature</h3><p>{:.1} &deg;C</p></div>
                <div class="card"><h3>Latest Humidity</h3><p>{:.1} %</p></div>
                <div class="card"><h3>Average Temperature</h3><p>{:.1} &deg;C</p></div>
                <div class="card"><h3>Average Humidity</h3><p>{:.1} %</p></div>
            </div>"#,
            stats.latest_temperature,
            stats.latest_humidity,
            stats.average_temperature,
            stats.average_humidity,
        ),
        None => String::new(),
    }
}

fn history_table(data: &DeviceReadings) -> String {
    if data.readings.is_empty() {
        return "<p>No readings recorded</p>".to_string();
    }
    let rows: String = data
        .readings
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td></tr>",
                format_timestamp(Some(r.timestamp)),
                r.temperature,
                r.humidity
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>Time</th><th>Temperature (&deg;C)</th><th>Humidity (%)</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

pub fn render(page: &ReadingsPage, session: &Session) -> String {
    let body = render_state(&page.data, |data| {
        format!(
            r#"<h1>{name} Readings</h1>
            <p>Location: {location}</p>
            {stats}
            <div class="card">{chart}</div>
            <h2>History</h2>
            {table}
            <p><a class="btn btn-secondary" href="/devices/{id}">Back to Device</a></p>"#,
            name = escape(&data.device.name),
            location = escape(&data.device.location),
            stats = stats_cards(data),
            chart = chart::line_chart(&data.chronological()),
            table = history_table(data),
            id = escape(&page.id),
        )
    });
    layout::page("Readings", session, "/devices", &body)
}
