//! HTML rendering for every page
//!
//! Views are plain functions from page state to markup. All user-supplied
//! text passes through [`escape`] before it lands in the document.

pub mod admin;
pub mod alerts;
pub mod auth;
pub mod chart;
pub mod devices;
pub mod home;
pub mod layout;
pub mod profile;
pub mod readings;

use chrono::{DateTime, Utc};

use crate::load_state::LoadState;
use crate::model::{DeviceStatus, Role};

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Never".to_string())
}

pub fn status_badge(status: DeviceStatus) -> String {
    let class = match status {
        DeviceStatus::Online => "badge-success",
        DeviceStatus::Offline => "badge-danger",
    };
    format!(r#"<span class="badge {}">{}</span>"#, class, status)
}

pub fn alert_badge(resolved: bool) -> String {
    if resolved {
        r#"<span class="badge badge-success">Resolved</span>"#.to_string()
    } else {
        r#"<span class="badge badge-warning">Active</span>"#.to_string()
    }
}

pub fn role_badge(role: Role) -> String {
    let class = match role {
        Role::Admin => "badge-primary",
        Role::User => "badge-secondary",
    };
    format!(r#"<span class="badge {}">{}</span>"#, class, role)
}

pub fn error_banner(message: &str) -> String {
    format!(
        r#"<div class="alert alert-danger" role="alert">{}</div>"#,
        escape(message)
    )
}

pub fn success_banner(message: &str) -> String {
    format!(
        r#"<div class="alert alert-success" role="status">{}</div>"#,
        escape(message)
    )
}

pub fn optional_banners(error: Option<&str>, success: Option<&str>) -> String {
    let mut html = String::new();
    if let Some(message) = error {
        html.push_str(&error_banner(message));
    }
    if let Some(message) = success {
        html.push_str(&success_banner(message));
    }
    html
}

/// Spinner, error banner or the ready content
pub fn render_state<T>(state: &LoadState<T>, ready: impl FnOnce(&T) -> String) -> String {
    match state {
        LoadState::Idle | LoadState::Loading => {
            r#"<div class="loading">Loading...</div>"#.to_string()
        }
        LoadState::Failed(message) => error_banner(message),
        LoadState::Ready(data) => ready(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn timestamps() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(Some(t)), "2024-05-01 12:00:00 UTC");
        assert_eq!(format_timestamp(None), "Never");
    }

    #[test]
    fn state_rendering() {
        let failed: LoadState<u8> = LoadState::Failed("Failed to fetch devices".to_string());
        assert!(render_state(&failed, |_| String::new()).contains("alert-danger"));
        assert!(render_state(&LoadState::<u8>::Loading, |_| String::new()).contains("Loading"));
        assert_eq!(render_state(&LoadState::Ready(3u8), |n| n.to_string()), "3");
    }
}
