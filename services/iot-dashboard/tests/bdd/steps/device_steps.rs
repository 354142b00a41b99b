//! BDD step definitions for device listing, creation and editing

use cucumber::{given, then, when};

use iot_dashboard::model::Device;

use crate::world::DashboardWorld;

fn encode(value: &str) -> String {
    value.replace(' ', "+")
}

#[given("the backend has no devices")]
async fn no_devices(world: &mut DashboardWorld) {
    world.backend().clear_devices().await;
}

#[given(expr = "an offline device {string} named {string}")]
async fn offline_device(world: &mut DashboardWorld, id: String, name: String) {
    let device: Device = serde_json::from_value(serde_json::json!({
        "id": id,
        "deviceId": id,
        "name": name,
        "location": "Basement",
        "status": "offline"
    }))
    .unwrap();
    world.backend().add_device(device).await;
}

#[when(expr = "I create a device {string} named {string} at {string}")]
async fn create_device(world: &mut DashboardWorld, device_id: String, name: String, location: String) {
    let form = format!(
        "device_id={}&name={}&location={}&temperature_min=5&temperature_max=30&humidity_min=20&humidity_max=70",
        encode(&device_id),
        encode(&name),
        encode(&location)
    );
    world.post("/devices/new", &form).await;
}

#[when(expr = "I rename device {string} to {string}")]
async fn rename_device(world: &mut DashboardWorld, id: String, name: String) {
    let form = format!(
        "name={}&location=Greenhouse&temperature_min=10&temperature_max=28&humidity_min=30&humidity_max=65",
        encode(&name)
    );
    world.post(&format!("/devices/{}/edit", id), &form).await;
}

#[then(expr = "the backend has a device {string} named {string}")]
async fn backend_has_device(world: &mut DashboardWorld, id: String, name: String) {
    let device = world
        .backend()
        .device(&id)
        .await
        .unwrap_or_else(|| panic!("device {} not found", id));
    assert_eq!(device.name, name);
}

#[then(expr = "the backend has no device {string}")]
async fn backend_lacks_device(world: &mut DashboardWorld, id: String) {
    assert!(world.backend().device(&id).await.is_none());
}
