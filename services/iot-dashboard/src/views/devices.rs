use crate::model::{Device, Threshold};
use crate::pages::device_form::{DeviceEditPage, DeviceFormInput, NewDevicePage};
use crate::pages::devices::{DeviceDetailPage, DeviceListPage};
use crate::session::Session;
use crate::views::{error_banner, escape, format_timestamp, layout, render_state, status_badge};

fn device_card(device: &Device) -> String {
    format!(
        r#"<div class="card device-card">
            <h3>{name}</h3>
            <p>{location}</p>
            <p>{status}</p>
            <p>Last seen: {last_seen}</p>
            <a class="btn btn-sm" href="/devices/{id}">Details</a>
            <a class="btn btn-sm btn-secondary" href="/devices/{id}/readings">Readings</a>
        </div>"#,
        name = escape(&device.name),
        location = escape(&device.location),
        status = status_badge(device.status),
        last_seen = format_timestamp(device.last_seen),
        id = escape(&device.id),
    )
}

pub fn render_list(page: &DeviceListPage, session: &Session) -> String {
    let add = if page.can_manage {
        r#"<a class="btn" href="/devices/new">Add Device</a>"#
    } else {
        ""
    };
    let body = render_state(&page.devices, |devices| {
        if devices.is_empty() {
            return "<p>No devices found</p>".to_string();
        }
        let cards: String = devices.iter().map(device_card).collect();
        format!(r#"<div class="cards">{}</div>"#, cards)
    });
    layout::page(
        "Devices",
        session,
        "/devices",
        &format!("<h1>Devices</h1>{}{}", add, body),
    )
}

fn threshold_card(title: &str, unit: &str, threshold: Threshold) -> String {
    format!(
        r#"<div class="card"><h3>{title}</h3><p>Min: {min}{unit}</p><p>Max: {max}{unit}</p></div>"#,
        min = threshold.min,
        max = threshold.max,
    )
}

pub fn render_detail(page: &DeviceDetailPage, session: &Session) -> String {
    let body = render_state(&page.device, |device| {
        let edit = if page.can_edit {
            format!(
                r#"<a class="btn" href="/devices/{}/edit">Edit</a>"#,
                escape(&device.id)
            )
        } else {
            String::new()
        };
        format!(
            r#"<h1>{name}</h1>
            <div class="card">
                <p>Device ID: {device_id}</p>
                <p>Location: {location}</p>
                <p>Status: {status}</p>
                <p>Last seen: {last_seen}</p>
            </div>
            <h2>Thresholds</h2>
            <div class="cards">{temperature}{humidity}</div>
            <p>
                <a class="btn btn-secondary" href="/devices/{id}/readings">View Readings</a>
                {edit}
                <a class="btn btn-secondary" href="/devices">Back to Devices</a>
            </p>"#,
            name = escape(&device.name),
            device_id = escape(&device.device_id),
            location = escape(&device.location),
            status = status_badge(device.status),
            last_seen = format_timestamp(device.last_seen),
            temperature = threshold_card(
                "Temperature",
                " &deg;C",
                device.settings.temperature_threshold
            ),
            humidity = threshold_card("Humidity", " %", device.settings.humidity_threshold),
            id = escape(&device.id),
        )
    });
    layout::page("Device", session, "/devices", &body)
}

fn text_input(name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" value="{value}" required>"#,
        value = escape(value),
    )
}

fn number_input(name: &str, label: &str, value: &str) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" type="number" step="1" value="{value}" required>"#,
        value = escape(value),
    )
}

fn device_form(action: &str, form: &DeviceFormInput, with_device_id: bool, submit: &str, cancel: &str) -> String {
    let device_id = if with_device_id {
        text_input("device_id", "Device ID", &form.device_id)
    } else {
        String::new()
    };
    format!(
        r#"<form class="card" method="post" action="{action}">
            {device_id}
            {name}
            {location}
            <h3>Temperature Threshold (&deg;C)</h3>
            {temperature_min}
            {temperature_max}
            <h3>Humidity Threshold (%)</h3>
            {humidity_min}
            {humidity_max}
            <p>
                <button class="btn" type="submit">{submit}</button>
                <a class="btn btn-secondary" href="{cancel}">Cancel</a>
            </p>
        </form>"#,
        name = text_input("name", "Name", &form.name),
        location = text_input("location", "Location", &form.location),
        temperature_min = number_input("temperature_min", "Minimum", &form.temperature_min),
        temperature_max = number_input("temperature_max", "Maximum", &form.temperature_max),
        humidity_min = number_input("humidity_min", "Minimum", &form.humidity_min),
        humidity_max = number_input("humidity_max", "Maximum", &form.humidity_max),
    )
}

pub fn render_edit(page: &DeviceEditPage, session: &Session) -> String {
    let id = escape(&page.id);
    let banner = page.error.as_deref().map(error_banner).unwrap_or_default();
    let body = render_state(&page.form, |form| {
        device_form(
            &format!("/devices/{}/edit", id),
            form,
            false,
            "Save Changes",
            &format!("/devices/{}", id),
        )
    });
    layout::page(
        "Edit Device",
        session,
        "/devices",
        &format!("<h1>Edit Device</h1>{}{}", banner, body),
    )
}

pub fn render_new(page: &NewDevicePage, session: &Session) -> String {
    let banner = page.error.as_deref().map(error_banner).unwrap_or_default();
    layout::page(
        "New Device",
        session,
        "/devices",
        &format!(
            "<h1>Add New Device</h1>{}{}",
            banner,
            device_form("/devices/new", &page.form, true, "Create Device", "/devices")
        ),
    )
}
