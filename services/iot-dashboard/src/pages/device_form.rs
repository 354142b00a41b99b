//! Device create and edit forms
//!
//! [`DeviceFormInput`] holds the raw strings the browser posts so a rejected
//! submission can be shown again exactly as typed. [`DeviceForm`] is the
//! validated mirror of the device that is sent to the backend.

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::load_state::LoadState;
use crate::model::{Device, DeviceDraft, DeviceSettings, DeviceUpdate, Threshold};
use crate::pages::SubmitOutcome;
use crate::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// Validated form state
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceForm {
    pub device_id: String,
    pub name: String,
    pub location: String,
    pub settings: DeviceSettings,
}

impl DeviceForm {
    pub fn from_device(device: &Device) -> Self {
        Self {
            device_id: device.device_id.clone(),
            name: device.name.clone(),
            location: device.location.clone(),
            settings: device.settings,
        }
    }

    pub fn threshold(&self, metric: Metric) -> Threshold {
        match metric {
            Metric::Temperature => self.settings.temperature_threshold,
            Metric::Humidity => self.settings.humidity_threshold,
        }
    }

    /// Change one bound, leaving the rest of `settings` untouched
    pub fn set_threshold(&mut self, metric: Metric, bound: Bound, value: i32) {
        let threshold = match metric {
            Metric::Temperature => &mut self.settings.temperature_threshold,
            Metric::Humidity => &mut self.settings.humidity_threshold,
        };
        match bound {
            Bound::Min => threshold.min = value,
            Bound::Max => threshold.max = value,
        }
    }

    pub fn to_update(&self) -> DeviceUpdate {
        DeviceUpdate {
            name: self.name.clone(),
            location: self.location.clone(),
            settings: self.settings,
        }
    }

    pub fn to_draft(&self) -> DeviceDraft {
        DeviceDraft {
            device_id: self.device_id.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            settings: self.settings,
        }
    }
}

/// Form fields as posted by the browser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceFormInput {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub temperature_min: String,
    #[serde(default)]
    pub temperature_max: String,
    #[serde(default)]
    pub humidity_min: String,
    #[serde(default)]
    pub humidity_max: String,
}

impl DeviceFormInput {
    pub fn from_form(form: &DeviceForm) -> Self {
        let temperature = form.threshold(Metric::Temperature);
        let humidity = form.threshold(Metric::Humidity);
        Self {
            device_id: form.device_id.clone(),
            name: form.name.clone(),
            location: form.location.clone(),
            temperature_min: temperature.min.to_string(),
            temperature_max: temperature.max.to_string(),
            humidity_min: humidity.min.to_string(),
            humidity_max: humidity.max.to_string(),
        }
    }

    /// Blank creation form with the default thresholds
    pub fn new_device() -> Self {
        Self::from_form(&DeviceForm {
            device_id: String::new(),
            name: String::new(),
            location: String::new(),
            settings: DeviceSettings::new_device_defaults(),
        })
    }

    /// Check required fields and merge each threshold bound into the settings
    pub fn parse(&self, require_device_id: bool) -> crate::Result<DeviceForm> {
        if require_device_id && self.device_id.trim().is_empty() {
            return Err(required("Device ID"));
        }
        if self.name.trim().is_empty() {
            return Err(required("Device name"));
        }
        if self.location.trim().is_empty() {
            return Err(required("Location"));
        }

        let mut form = DeviceForm {
            device_id: self.device_id.clone(),
            name: self.name.clone(),
            location: self.location.clone(),
            settings: DeviceSettings::default(),
        };
        let fields = [
            (Metric::Temperature, Bound::Min, &self.temperature_min, "Temperature minimum"),
            (Metric::Temperature, Bound::Max, &self.temperature_max, "Temperature maximum"),
            (Metric::Humidity, Bound::Min, &self.humidity_min, "Humidity minimum"),
            (Metric::Humidity, Bound::Max, &self.humidity_max, "Humidity maximum"),
        ];
        for (metric, bound, raw, label) in fields {
            form.set_threshold(metric, bound, parse_bound(raw, label)?);
        }
        Ok(form)
    }
}

fn required(field: &str) -> DashboardError {
    DashboardError::Validation(format!("{} is required", field))
}

/// Whole numbers only; a fractional entry is truncated toward zero
fn parse_bound(raw: &str, label: &str) -> crate::Result<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required(label));
    }
    raw.parse::<i32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && v.abs() <= i32::MAX as f64)
                .map(|v| v.trunc() as i32)
        })
        .ok_or_else(|| DashboardError::Validation(format!("{} must be a number", label)))
}

fn validation_message(e: &DashboardError, fallback: &str) -> String {
    match e {
        DashboardError::Validation(message) => message.clone(),
        _ => fallback.to_string(),
    }
}

/// Admin-only device edit screen
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEditPage {
    pub id: String,
    pub form: LoadState<DeviceFormInput>,
    pub error: Option<String>,
}

impl DeviceEditPage {
    pub async fn load(api: &ApiClient, id: &str) -> Self {
        let form = LoadState::load(api.devices().get(id), "Failed to fetch device details")
            .await
            .map(|device| DeviceFormInput::from_form(&DeviceForm::from_device(&device)));
        Self {
            id: id.to_string(),
            form,
            error: None,
        }
    }

    /// Send the edited device; on success continue to its detail view
    pub async fn submit(api: &ApiClient, id: &str, input: DeviceFormInput) -> SubmitOutcome<Self> {
        let rerender = |input: DeviceFormInput, error: String| {
            SubmitOutcome::Rerender(Self {
                id: id.to_string(),
                form: LoadState::Ready(input),
                error: Some(error),
            })
        };

        let form = match input.parse(false) {
            Ok(form) => form,
            Err(e) => {
                let message = validation_message(&e, "Invalid device");
                return rerender(input, message);
            }
        };

        match api.devices().update(id, &form.to_update()).await {
            Ok(_) => {
                tracing::info!("Updated device {}", id);
                SubmitOutcome::Navigate(format!("/devices/{}", id))
            }
            Err(e) => {
                tracing::warn!("Failed to update device {}: {}", id, e);
                rerender(input, "Failed to update device".to_string())
            }
        }
    }
}

/// Admin-only device creation screen
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevicePage {
    pub form: DeviceFormInput,
    pub error: Option<String>,
}

impl Default for NewDevicePage {
    fn default() -> Self {
        Self {
            form: DeviceFormInput::new_device(),
            error: None,
        }
    }
}

impl NewDevicePage {
    pub async fn submit(api: &ApiClient, input: DeviceFormInput) -> SubmitOutcome<Self> {
        let form = match input.parse(true) {
            Ok(form) => form,
            Err(e) => {
                return SubmitOutcome::Rerender(Self {
                    error: Some(validation_message(&e, "Invalid device")),
                    form: input,
                })
            }
        };

        match api.devices().create(&form.to_draft()).await {
            Ok(device) => {
                tracing::info!("Created device {} ({})", device.name, device.id);
                SubmitOutcome::Navigate("/devices".to_string())
            }
            Err(e) => {
                tracing::warn!("Failed to create device {}: {}", form.device_id, e);
                SubmitOutcome::Rerender(Self {
                    form: input,
                    error: Some("Failed to create device".to_string()),
                })
            }
        }
    }
}
