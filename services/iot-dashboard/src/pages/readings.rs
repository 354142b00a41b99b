//! Per-device readings history

use crate::api::ApiClient;
use crate::load_state::LoadState;
use crate::model::{Device, Reading};

/// Latest values and averages over a reading set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingStats {
    pub count: usize,
    pub latest_temperature: f64,
    pub latest_humidity: f64,
    pub average_temperature: f64,
    pub average_humidity: f64,
}

impl ReadingStats {
    /// `None` for an empty set; `readings` must be newest first
    pub fn from_readings(readings: &[Reading]) -> Option<Self> {
        let latest = readings.first()?;
        let count = readings.len();
        let mean = |f: fn(&Reading) -> f64| round1(readings.iter().map(f).sum::<f64>() / count as f64);
        Some(Self {
            count,
            latest_temperature: latest.temperature,
            latest_humidity: latest.humidity,
            average_temperature: mean(|r| r.temperature),
            average_humidity: mean(|r| r.humidity),
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A device with its readings, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReadings {
    pub device: Device,
    pub readings: Vec<Reading>,
}

impl DeviceReadings {
    pub fn new(device: Device, mut readings: Vec<Reading>) -> Self {
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self { device, readings }
    }

    pub fn stats(&self) -> Option<ReadingStats> {
        ReadingStats::from_readings(&self.readings)
    }

    /// Oldest first, the order the chart plots in
    pub fn chronological(&self) -> Vec<&Reading> {
        self.readings.iter().rev().collect()
    }
}

#[derive(Debug, Clone)]
pub struct ReadingsPage {
    pub id: String,
    pub data: LoadState<DeviceReadings>,
}

impl ReadingsPage {
    /// Fetch the device record and its readings concurrently
    pub async fn load(api: &ApiClient, id: &str) -> Self {
        let devices = api.devices();
        let data = LoadState::load(
            async {
                let (device, readings) = tokio::try_join!(devices.get(id), devices.readings(id))?;
                Ok(DeviceReadings::new(device, readings))
            },
            "Failed to fetch device readings",
        )
        .await;

        Self {
            id: id.to_string(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::*;
    use crate::io::MockHttpClient;
    use chrono::{TimeZone, Utc};

    fn reading(minute: u32, temperature: f64, humidity: f64) -> Reading {
        Reading {
            id: format!("r{}", minute),
            device_id: "sensor-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            temperature,
            humidity,
        }
    }

    fn device() -> Device {
        serde_json::from_value(device_json("1", "online")).unwrap()
    }

    #[test]
    fn readings_sorted_newest_first() {
        let data = DeviceReadings::new(
            device(),
            vec![reading(1, 20.0, 40.0), reading(3, 22.0, 44.0), reading(2, 21.0, 42.0)],
        );
        let ids: Vec<_> = data.readings.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r3", "r2", "r1"]);

        let chart: Vec<_> = data.chronological().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(chart, ["r1", "r2", "r3"]);
    }

    #[test]
    fn stats_use_latest_and_rounded_average() {
        let data = DeviceReadings::new(
            device(),
            vec![reading(1, 20.0, 40.0), reading(2, 21.0, 41.0), reading(3, 21.5, 45.5)],
        );
        let stats = data.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.latest_temperature, 21.5);
        assert_eq!(stats.latest_humidity, 45.5);
        assert_eq!(stats.average_temperature, 20.8);
        assert_eq!(stats.average_humidity, 42.2);
    }

    #[test]
    fn no_readings_no_stats() {
        assert!(DeviceReadings::new(device(), vec![]).stats().is_none());
    }

    #[tokio::test]
    async fn load_fetches_device_and_readings() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/devices/1"))
            .times(1)
            .returning(|_| Box::pin(async { Ok(json_response(200, device_json("1", "online"))) }));
        mock.expect_send()
            .withf(|req| req.url.ends_with("/devices/1/readings"))
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok(json_response(
                        200,
                        serde_json::json!([{
                            "id": "r1", "deviceId": "sensor-1",
                            "timestamp": "2024-05-01T12:00:00Z",
                            "temperature": 21.0, "humidity": 40.0
                        }]),
                    ))
                })
            });

        let page = ReadingsPage::load(&client(mock), "1").await;
        let data = page.data.ready().unwrap();
        assert_eq!(data.device.id, "1");
        assert_eq!(data.readings.len(), 1);
    }

    #[tokio::test]
    async fn readings_failure_fails_the_page() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/devices/1"))
            .returning(|_| Box::pin(async { Ok(json_response(200, device_json("1", "online"))) }));
        mock.expect_send()
            .withf(|req| req.url.ends_with("/readings"))
            .returning(|_| Box::pin(async { Ok(json_response(503, serde_json::json!({}))) }));

        let page = ReadingsPage::load(&client(mock), "1").await;
        assert_eq!(page.data.error(), Some("Failed to fetch device readings"));
    }
}
