//! In-memory REST backend for local development and tests
//!
//! Serves the same endpoints the dashboard consumes over seeded collections.
//! Tokens are unsigned and only valid for the lifetime of the process.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::model::{
    Alert, Credentials, Device, DeviceDraft, DeviceSettings, DeviceStatus, DeviceUpdate,
    NewReading, Reading, Registration, Role, User, UserUpdate,
};
use crate::session::encode_token;

/// Secret the in-memory backend signs its tokens with
pub const DEV_SECRET: &[u8] = b"iot-dashboard-dev-secret";

/// Oldest tokens are forgotten once this many are live
const MAX_TOKENS: usize = 256;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MockData {
    accounts: Vec<Account>,
    devices: Vec<Device>,
    readings: Vec<Reading>,
    alerts: Vec<Alert>,
    tokens: VecDeque<(String, String)>,
    next_id: u64,
    fail_alert_resolution: bool,
}

impl MockData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.user.id == id)
    }

    fn issue_token(&mut self, user: &User) -> crate::Result<String> {
        let nonce = self.next_id("t");
        let token = encode_token(
            &serde_json::json!({
                "id": user.id,
                "username": user.username,
                "email": user.email,
                "role": user.role,
                "jti": nonce,
            }),
            DEV_SECRET,
        )?;
        self.tokens.push_back((token.clone(), user.id.clone()));
        while self.tokens.len() > MAX_TOKENS {
            self.tokens.pop_front();
        }
        Ok(token)
    }

    fn token_owner(&self, token: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(issued, _)| issued == token)
            .map(|(_, user)| user.as_str())
    }

    fn device_index(&self, id: &str) -> Option<usize> {
        self.devices
            .iter()
            .position(|d| d.id == id || d.device_id == id)
    }

    fn readings_for(&self, device: &Device) -> Vec<Reading> {
        self.readings
            .iter()
            .filter(|r| r.device_id == device.id || r.device_id == device.device_id)
            .cloned()
            .collect()
    }
}

/// In-memory backend shared between its router and the test that drives it
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    data: Arc<RwLock<MockData>>,
}

impl MockBackend {
    /// An empty backend with no accounts
    pub fn new() -> Self {
        Self::default()
    }

    /// Two accounts, three devices with readings, and a mix of alerts
    pub fn seeded() -> Self {
        let now = Utc::now();
        let mut data = MockData {
            next_id: 100,
            ..MockData::default()
        };

        for (id, username, email, password, role) in [
            ("u1", "admin", "admin@example.com", "admin123", Role::Admin),
            ("u2", "user", "user@example.com", "user123", Role::User),
        ] {
            data.accounts.push(Account {
                user: User {
                    id: id.to_string(),
                    username: username.to_string(),
                    email: email.to_string(),
                    role,
                    created_at: Some(now - Duration::days(30)),
                },
                password: password.to_string(),
            });
        }

        for (id, device_id, name, location, status) in [
            ("d1", "sensor-001", "Greenhouse Sensor", "Greenhouse", DeviceStatus::Online),
            ("d2", "sensor-002", "Warehouse Sensor", "Warehouse", DeviceStatus::Online),
            ("d3", "sensor-003", "Cold Storage Sensor", "Cold Storage", DeviceStatus::Offline),
        ] {
            data.devices.push(Device {
                id: id.to_string(),
                device_id: device_id.to_string(),
                name: name.to_string(),
                location: location.to_string(),
                status,
                last_seen: Some(now - Duration::minutes(5)),
                settings: DeviceSettings::new_device_defaults(),
                readings: None,
            });
        }

        for (device, base_temperature, base_humidity) in [("d1", 22.0, 55.0), ("d2", 19.5, 45.0)] {
            for step in 0..6i64 {
                data.readings.push(Reading {
                    id: format!("{}-r{}", device, step),
                    device_id: device.to_string(),
                    timestamp: now - Duration::hours(6 - step),
                    temperature: base_temperature + step as f64 * 0.5,
                    humidity: base_humidity - step as f64,
                });
            }
        }

        for (id, device, kind, message, resolved) in [
            ("a1", "d1", "temperature", "Temperature above threshold", false),
            ("a2", "d3", "connectivity", "Device offline", false),
            ("a3", "d2", "humidity", "Humidity below threshold", true),
        ] {
            data.alerts.push(Alert {
                id: id.to_string(),
                device_id: device.to_string(),
                kind: kind.to_string(),
                message: message.to_string(),
                timestamp: Some(now - Duration::hours(1)),
                resolved,
            });
        }

        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub async fn add_account(&self, username: &str, email: &str, password: &str, role: Role) -> User {
        let mut data = self.data.write().await;
        let user = User {
            id: data.next_id("u"),
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: Some(Utc::now()),
        };
        data.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    pub async fn add_device(&self, device: Device) {
        self.data.write().await.devices.push(device);
    }

    pub async fn add_alert(&self, alert: Alert) {
        self.data.write().await.alerts.push(alert);
    }

    pub async fn add_reading(&self, reading: Reading) {
        self.data.write().await.readings.push(reading);
    }

    /// Remove every device, reading and alert
    pub async fn clear_devices(&self) {
        let mut data = self.data.write().await;
        data.devices.clear();
        data.readings.clear();
        data.alerts.clear();
    }

    /// Make `PUT /alerts/:id/resolve` answer 500 until switched off
    pub async fn fail_alert_resolution(&self, fail: bool) {
        self.data.write().await.fail_alert_resolution = fail;
    }

    pub async fn devices(&self) -> Vec<Device> {
        self.data.read().await.devices.clone()
    }

    pub async fn device(&self, id: &str) -> Option<Device> {
        let data = self.data.read().await;
        data.device_index(id).map(|i| data.devices[i].clone())
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.data.read().await.alerts.clone()
    }

    pub async fn alert(&self, id: &str) -> Option<Alert> {
        self.data.read().await.alerts.iter().find(|a| a.id == id).cloned()
    }

    pub async fn users(&self) -> Vec<User> {
        self.data
            .read()
            .await
            .accounts
            .iter()
            .map(|a| a.user.clone())
            .collect()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/devices", get(list_devices).post(create_device))
            .route(
                "/devices/{id}",
                get(get_device).put(update_device).delete(delete_device),
            )
            .route("/devices/{id}/readings", get(device_readings))
            .route("/devices/{id}/alerts", get(device_alerts))
            .route("/alerts", get(list_alerts))
            .route("/alerts/{id}/resolve", put(resolve_alert))
            .route("/alerts/{id}", axum::routing::delete(delete_alert))
            .route("/readings", get(list_readings).post(create_reading))
            .route("/users", get(list_users))
            .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
            .with_state(self.clone())
    }
}

/// Serve `backend` on `addr`, returning the bound address
pub async fn spawn(backend: MockBackend, addr: SocketAddr) -> crate::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    let router = backend.router();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Mock backend stopped: {}", e);
        }
    });
    tracing::info!("Mock backend listening on http://{}", bound);
    Ok(bound)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

fn not_found(what: &str) -> Response {
    error(StatusCode::NOT_FOUND, &format!("{} not found", what))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// The user owning the request's bearer token
fn caller(data: &MockData, headers: &HeaderMap) -> Result<User, Response> {
    bearer(headers)
        .and_then(|token| data.token_owner(token))
        .and_then(|id| data.account(id))
        .map(|account| account.user.clone())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Authentication required"))
}

fn admin(data: &MockData, headers: &HeaderMap) -> Result<User, Response> {
    let user = caller(data, headers)?;
    if user.role == Role::Admin {
        Ok(user)
    } else {
        Err(error(StatusCode::FORBIDDEN, "Admin access required"))
    }
}

async fn login(State(backend): State<MockBackend>, Json(credentials): Json<Credentials>) -> Response {
    let mut data = backend.data.write().await;
    let user = data
        .accounts
        .iter()
        .find(|a| a.user.email == credentials.email && a.password == credentials.password)
        .map(|a| a.user.clone());
    match user {
        Some(user) => match data.issue_token(&user) {
            Ok(token) => {
                tracing::debug!("Mock backend issued token for {}", user.email);
                Json(serde_json::json!({ "token": token, "user": user })).into_response()
            }
            Err(e) => {
                tracing::error!("Mock backend could not sign a token: {}", e);
                error(StatusCode::INTERNAL_SERVER_ERROR, "Token signing failed")
            }
        },
        None => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register(
    State(backend): State<MockBackend>,
    Json(registration): Json<Registration>,
) -> Response {
    if registration.username.is_empty() || registration.email.is_empty() || registration.password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "All fields are required");
    }
    let mut data = backend.data.write().await;
    if data.accounts.iter().any(|a| a.user.email == registration.email) {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    let user = User {
        id: data.next_id("u"),
        username: registration.username,
        email: registration.email,
        role: Role::User,
        created_at: Some(Utc::now()),
    };
    data.accounts.push(Account {
        user: user.clone(),
        password: registration.password,
    });
    (
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "User registered", "user": user })),
    )
        .into_response()
}

async fn list_devices(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    let devices: Vec<Device> = data
        .devices
        .iter()
        .map(|d| Device {
            readings: Some(data.readings_for(d)),
            ..d.clone()
        })
        .collect();
    Json(devices).into_response()
}

async fn create_device(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(draft): Json<DeviceDraft>,
) -> Response {
    let mut data = backend.data.write().await;
    if let Err(rejection) = admin(&data, &headers) {
        return rejection;
    }
    if data.devices.iter().any(|d| d.device_id == draft.device_id) {
        return error(StatusCode::CONFLICT, "Device ID already exists");
    }
    let device = Device {
        id: data.next_id("d"),
        device_id: draft.device_id,
        name: draft.name,
        location: draft.location,
        status: DeviceStatus::Offline,
        last_seen: None,
        settings: draft.settings,
        readings: None,
    };
    data.devices.push(device.clone());
    (StatusCode::CREATED, Json(device)).into_response()
}

async fn get_device(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    match data.device_index(&id) {
        Some(i) => Json(&data.devices[i]).into_response(),
        None => not_found("Device"),
    }
}

async fn update_device(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<DeviceUpdate>,
) -> Response {
    let mut data = backend.data.write().await;
    if let Err(rejection) = admin(&data, &headers) {
        return rejection;
    }
    let Some(i) = data.device_index(&id) else {
        return not_found("Device");
    };
    let device = &mut data.devices[i];
    device.name = update.name;
    device.location = update.location;
    device.settings = update.settings;
    Json(device.clone()).into_response()
}

async fn delete_device(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = backend.data.write().await;
    if let Err(rejection) = admin(&data, &headers) {
        return rejection;
    }
    match data.device_index(&id) {
        Some(i) => {
            data.devices.remove(i);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found("Device"),
    }
}

async fn device_readings(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    match data.device_index(&id) {
        Some(i) => Json(data.readings_for(&data.devices[i])).into_response(),
        None => not_found("Device"),
    }
}

async fn device_alerts(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    let Some(i) = data.device_index(&id) else {
        return not_found("Device");
    };
    let device = &data.devices[i];
    let alerts: Vec<&Alert> = data
        .alerts
        .iter()
        .filter(|a| a.device_id == device.id || a.device_id == device.device_id)
        .collect();
    Json(alerts).into_response()
}

async fn list_alerts(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    Json(serde_json::json!({ "alerts": data.alerts })).into_response()
}

async fn resolve_alert(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = backend.data.write().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    if data.fail_alert_resolution {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Alert store unavailable");
    }
    match data.alerts.iter_mut().find(|a| a.id == id) {
        Some(alert) => {
            alert.resolved = true;
            Json(alert.clone()).into_response()
        }
        None => not_found("Alert"),
    }
}

async fn delete_alert(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = backend.data.write().await;
    if let Err(rejection) = admin(&data, &headers) {
        return rejection;
    }
    let before = data.alerts.len();
    data.alerts.retain(|a| a.id != id);
    if data.alerts.len() == before {
        return not_found("Alert");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_readings(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    Json(&data.readings).into_response()
}

async fn create_reading(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(reading): Json<NewReading>,
) -> Response {
    let mut data = backend.data.write().await;
    if let Err(rejection) = caller(&data, &headers) {
        return rejection;
    }
    let Some(i) = data.device_index(&reading.device_id) else {
        return not_found("Device");
    };
    let now = Utc::now();
    let device_id = data.devices[i].id.clone();
    data.devices[i].last_seen = Some(now);
    data.devices[i].status = DeviceStatus::Online;
    let reading = Reading {
        id: data.next_id("r"),
        device_id,
        timestamp: now,
        temperature: reading.temperature,
        humidity: reading.humidity,
    };
    data.readings.push(reading.clone());
    (StatusCode::CREATED, Json(reading)).into_response()
}

async fn list_users(State(backend): State<MockBackend>, headers: HeaderMap) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = admin(&data, &headers) {
        return rejection;
    }
    let users: Vec<&User> = data.accounts.iter().map(|a| &a.user).collect();
    Json(users).into_response()
}

/// Admins may act on anyone, everyone else only on themselves
fn self_or_admin(data: &MockData, headers: &HeaderMap, id: &str) -> Result<User, Response> {
    let user = caller(data, headers)?;
    if user.role == Role::Admin || user.id == id {
        Ok(user)
    } else {
        Err(error(StatusCode::FORBIDDEN, "Not allowed"))
    }
}

async fn get_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let data = backend.data.read().await;
    if let Err(rejection) = self_or_admin(&data, &headers, &id) {
        return rejection;
    }
    match data.account(&id) {
        Some(account) => Json(&account.user).into_response(),
        None => not_found("User"),
    }
}

async fn update_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Response {
    let mut data = backend.data.write().await;
    let acting = match self_or_admin(&data, &headers, &id) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    let Some(account) = data.accounts.iter_mut().find(|a| a.user.id == id) else {
        return not_found("User");
    };
    account.user.username = update.username;
    account.user.email = update.email;
    if let (Some(role), Role::Admin) = (update.role, acting.role) {
        account.user.role = role;
    }
    Json(account.user.clone()).into_response()
}

async fn delete_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = backend.data.write().await;
    let acting = match admin(&data, &headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    if acting.id == id {
        return error(StatusCode::BAD_REQUEST, "Cannot delete your own account");
    }
    let before = data.accounts.len();
    data.accounts.retain(|a| a.user.id != id);
    if data.accounts.len() == before {
        return not_found("User");
    }
    data.tokens.retain(|(_, user)| *user != id);
    StatusCode::NO_CONTENT.into_response()
}
