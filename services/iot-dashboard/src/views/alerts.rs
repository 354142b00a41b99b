use crate::model::Alert;
use crate::pages::alerts::{AlertListPage, RESOLVE_FAILED};
use crate::session::Session;
use crate::views::{alert_badge, escape, format_timestamp, layout, render_state};

/// Resolves through the JSON endpoint and flips the row without a reload
const RESOLVE_SCRIPT: &str = r#"
<script>
document.addEventListener('submit', function (event) {
    const form = event.target;
    if (!form.classList.contains('resolve-form')) { return; }
    event.preventDefault();
    const id = form.dataset.alertId;
    fetch('/api/alerts/' + encodeURIComponent(id) + '/resolve', { method: 'POST', credentials: 'same-origin' })
        .then(function (r) { if (!r.ok) { throw new Error(r.status); } return r.json(); })
        .then(function () {
            const row = document.getElementById('alert-' + id);
            row.querySelector('.alert-status').innerHTML = '<span class="badge badge-success">Resolved</span>';
            form.remove();
        })
        .catch(function () {
            const banner = document.getElementById('resolve-banner');
            banner.textContent = banner.dataset.message;
            banner.hidden = false;
        });
});
</script>
"#;

fn alert_row(alert: &Alert, can_resolve: bool) -> String {
    let action = if can_resolve && !alert.resolved {
        format!(
            r#"<form class="resolve-form inline" method="post" action="/alerts/{id}/resolve" data-alert-id="{id}">
                <button class="btn btn-sm" type="submit">Resolve</button>
            </form>"#,
            id = escape(&alert.id),
        )
    } else {
        String::new()
    };
    format!(
        r#"<tr id="alert-{id}">
            <td>{device}</td><td>{kind}</td><td>{message}</td><td>{time}</td>
            <td class="alert-status">{status}</td><td>{action}</td>
        </tr>"#,
        id = escape(&alert.id),
        device = escape(&alert.device_id),
        kind = escape(&alert.kind),
        message = escape(&alert.message),
        time = format_timestamp(alert.timestamp),
        status = alert_badge(alert.resolved),
    )
}

pub fn render(page: &AlertListPage, session: &Session) -> String {
    let banner = format!(
        r#"<div id="resolve-banner" class="alert alert-danger" role="alert" data-message="{}"{}>{}</div>"#,
        RESOLVE_FAILED,
        if page.banner.is_some() { "" } else { " hidden" },
        escape(page.banner.as_deref().unwrap_or("")),
    );
    let body = render_state(&page.alerts, |alerts| {
        if alerts.is_empty() {
            return "<p>No alerts found</p>".to_string();
        }
        let rows: String = alerts
            .iter()
            .map(|a| alert_row(a, page.can_resolve))
            .collect();
        format!(
            "<table><thead><tr><th>Device</th><th>Type</th><th>Message</th><th>Time</th><th>Status</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    });
    let script = if page.can_resolve { RESOLVE_SCRIPT } else { "" };

    layout::page(
        "Alerts",
        session,
        "/alerts",
        &format!("<h1>Alerts</h1>{}{}{}", banner, body, script),
    )
}
