//! Home: session card, device status and the devices/alerts overview

use serde::Deserialize;

use crate::api::ApiClient;
use crate::load_state::LoadState;
use crate::model::{Alert, Device};
use crate::session::Session;

/// Online/offline split of a device collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
}

impl DeviceStats {
    pub fn from_devices(devices: &[Device]) -> Self {
        let online = devices.iter().filter(|d| d.is_online()).count();
        Self {
            total: devices.len(),
            online,
            offline: devices.len() - online,
        }
    }

    pub fn online_percent(&self) -> f64 {
        percent(self.online, self.total)
    }

    pub fn offline_percent(&self) -> f64 {
        percent(self.offline, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

pub fn unresolved_alerts(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|a| !a.resolved).count()
}

/// Sum of the reading arrays embedded in device records, where present
pub fn total_readings(devices: &[Device]) -> usize {
    devices
        .iter()
        .map(|d| d.readings.as_ref().map_or(0, Vec::len))
        .sum()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeTab {
    Alerts,
    #[default]
    #[serde(other)]
    Devices,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub tab: HomeTab,
}

/// Everything derived from one devices + alerts fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub devices: Vec<Device>,
    pub alerts: Vec<Alert>,
    pub stats: DeviceStats,
    pub active_alerts: usize,
    pub total_readings: usize,
}

impl Overview {
    pub fn summarize(devices: Vec<Device>, alerts: Vec<Alert>) -> Self {
        Self {
            stats: DeviceStats::from_devices(&devices),
            active_alerts: unresolved_alerts(&alerts),
            total_readings: total_readings(&devices),
            devices,
            alerts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub session: Session,
    pub tab: HomeTab,
    pub overview: LoadState<Overview>,
}

impl HomePage {
    /// Fetch devices and alerts concurrently, then reduce to counts
    pub async fn load(api: &ApiClient, session: Session, tab: HomeTab) -> Self {
        let overview = LoadState::load(
            async {
                let devices = api.devices();
                let alerts = api.alerts();
                let (devices, alerts) = tokio::try_join!(devices.list(), alerts.list())?;
                Ok(Overview::summarize(devices, alerts))
            },
            "Failed to fetch dashboard data",
        )
        .await;

        Self {
            session,
            tab,
            overview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::*;
    use crate::io::MockHttpClient;
    use crate::model::Reading;

    fn device(id: &str, status: &str) -> Device {
        serde_json::from_value(device_json(id, status)).unwrap()
    }

    fn alert(id: &str, resolved: bool) -> Alert {
        serde_json::from_value(alert_json(id, resolved)).unwrap()
    }

    #[test]
    fn stats_split_online_and_offline() {
        let devices = vec![
            device("1", "online"),
            device("2", "offline"),
            device("3", "online"),
        ];
        let stats = DeviceStats::from_devices(&devices);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.online, 2);
        assert_eq!(stats.offline, 1);
        assert!((stats.online_percent() - 66.666).abs() < 0.01);
    }

    #[test]
    fn empty_collections_reduce_to_zero() {
        let overview = Overview::summarize(vec![], vec![]);
        assert_eq!(overview.stats, DeviceStats::default());
        assert_eq!(overview.active_alerts, 0);
        assert_eq!(overview.total_readings, 0);
        assert_eq!(overview.stats.online_percent(), 0.0);
    }

    #[test]
    fn readings_counted_only_when_embedded() {
        let mut with_readings = device("1", "online");
        with_readings.readings = Some(vec![
            Reading {
                id: "r1".to_string(),
                device_id: "1".to_string(),
                timestamp: chrono::Utc::now(),
                temperature: 20.0,
                humidity: 40.0,
            };
            3
        ]);
        let devices = vec![with_readings, device("2", "offline")];
        assert_eq!(total_readings(&devices), 3);
    }

    #[test]
    fn unresolved_alert_count() {
        let alerts = vec![alert("a", false), alert("b", true), alert("c", false)];
        assert_eq!(unresolved_alerts(&alerts), 2);
    }

    #[tokio::test]
    async fn load_joins_devices_and_alerts() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/devices"))
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok(json_response(
                        200,
                        serde_json::json!([device_json("1", "online"), device_json("2", "offline")]),
                    ))
                })
            });
        mock.expect_send()
            .withf(|req| req.url.ends_with("/alerts"))
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok(json_response(
                        200,
                        serde_json::json!({"alerts": [alert_json("a1", false)]}),
                    ))
                })
            });

        let page = HomePage::load(&client(mock), Session::anonymous(), HomeTab::Devices).await;
        let overview = page.overview.ready().unwrap();
        assert_eq!(overview.stats.online, 1);
        assert_eq!(overview.stats.offline, 1);
        assert_eq!(overview.active_alerts, 1);
    }

    #[tokio::test]
    async fn either_fetch_failing_fails_the_page() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/devices"))
            .returning(|_| Box::pin(async { Ok(json_response(200, serde_json::json!([]))) }));
        mock.expect_send()
            .withf(|req| req.url.ends_with("/alerts"))
            .returning(|_| Box::pin(async { Ok(json_response(500, serde_json::json!({}))) }));

        let page = HomePage::load(&client(mock), Session::anonymous(), HomeTab::Alerts).await;
        assert_eq!(page.overview.error(), Some("Failed to fetch dashboard data"));
    }

    #[test]
    fn tab_query_parses() {
        let query: HomeQuery = serde_json::from_str(r#"{"tab": "alerts"}"#).unwrap();
        assert_eq!(query.tab, HomeTab::Alerts);
        let default: HomeQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(default.tab, HomeTab::Devices);
    }

    #[test]
    fn unknown_tab_falls_back_to_devices() {
        let query: HomeQuery = serde_json::from_str(r#"{"tab": "charts"}"#).unwrap();
        assert_eq!(query.tab, HomeTab::Devices);
    }
}
