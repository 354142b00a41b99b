use crate::model::Alert;
use crate::pages::home::{HomePage, HomeTab, Overview};
use crate::views::{alert_badge, escape, format_timestamp, layout, render_state, status_badge};

fn identity_card(page: &HomePage) -> String {
    let session = &page.session;
    format!(
        r#"<div class="card">
            <span class="avatar">{initial}</span>
            <h3>{username}</h3>
            <p>{email}</p>
            <p>Role: {role}</p>
        </div>"#,
        initial = escape(&session.initial().to_string()),
        username = escape(session.username.as_deref().unwrap_or("User")),
        email = escape(session.email.as_deref().unwrap_or("")),
        role = session.role,
    )
}

fn progress(label: &str, count: usize, percent: f64, color: &str) -> String {
    format!(
        r#"<p>{label}: {count}</p>
        <div class="progress"><div style="width: {percent:.0}%; background: {color};"></div></div>"#,
    )
}

fn summary(overview: &Overview) -> String {
    let stats = &overview.stats;
    format!(
        r#"<div class="cards">
            <div class="card" data-stat="total"><h3>Total Devices</h3><p>{total}</p></div>
            <div class="card" data-stat="online"><h3>Online</h3><p>{online}</p></div>
            <div class="card" data-stat="offline"><h3>Offline</h3><p>{offline}</p></div>
            <div class="card" data-stat="alerts"><h3>Active Alerts</h3><p>{alerts}</p></div>
            <div class="card" data-stat="readings"><h3>Total Readings</h3><p>{readings}</p></div>
        </div>
        <div class="card">
            <h3>Device Status</h3>
            {online_bar}
            {offline_bar}
        </div>"#,
        total = stats.total,
        online = stats.online,
        offline = stats.offline,
        alerts = overview.active_alerts,
        readings = overview.total_readings,
        online_bar = progress("Online", stats.online, stats.online_percent(), "#198754"),
        offline_bar = progress("Offline", stats.offline, stats.offline_percent(), "#dc3545"),
    )
}

fn devices_tab(overview: &Overview) -> String {
    if overview.devices.is_empty() {
        return "<p>No devices found</p>".to_string();
    }
    let rows: String = overview
        .devices
        .iter()
        .map(|d| {
            format!(
                r#"<tr><td><a href="/devices/{id}">{name}</a></td><td>{location}</td><td>{status}</td><td>{last_seen}</td></tr>"#,
                id = escape(&d.id),
                name = escape(&d.name),
                location = escape(&d.location),
                status = status_badge(d.status),
                last_seen = format_timestamp(d.last_seen),
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>Name</th><th>Location</th><th>Status</th><th>Last Seen</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

/// Read-only; resolving happens on the alerts page
fn alerts_tab(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "<p>No alerts found</p>".to_string();
    }
    let rows: String = alerts
        .iter()
        .map(|a| {
            format!(
                "<tr><td>{device}</td><td>{kind}</td><td>{message}</td><td>{time}</td><td>{status}</td></tr>",
                device = escape(&a.device_id),
                kind = escape(&a.kind),
                message = escape(&a.message),
                time = format_timestamp(a.timestamp),
                status = alert_badge(a.resolved),
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>Device</th><th>Type</th><th>Message</th><th>Time</th><th>Status</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

pub fn render(page: &HomePage) -> String {
    let (devices_class, alerts_class) = match page.tab {
        HomeTab::Devices => (r#" class="active""#, ""),
        HomeTab::Alerts => ("", r#" class="active""#),
    };
    let body = render_state(&page.overview, |overview| {
        let tab = match page.tab {
            HomeTab::Devices => devices_tab(overview),
            HomeTab::Alerts => alerts_tab(&overview.alerts),
        };
        format!(
            r#"{summary}
            <nav class="tabs">
                <a href="/?tab=devices"{devices_class}>Devices</a>
                <a href="/?tab=alerts"{alerts_class}>Alerts</a>
            </nav>
            {tab}"#,
            summary = summary(overview),
        )
    });

    layout::page(
        "Dashboard",
        &page.session,
        "/",
        &format!("<h1>Dashboard</h1>{}{}", identity_card(page), body),
    )
}
