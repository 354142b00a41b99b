//! BDD step definitions for alert resolution

use cucumber::{given, then, when};

use crate::world::DashboardWorld;

#[given("the backend refuses to resolve alerts")]
async fn resolution_fails(world: &mut DashboardWorld) {
    world.backend().fail_alert_resolution(true).await;
}

#[when(expr = "I resolve alert {string}")]
async fn resolve_from_form(world: &mut DashboardWorld, id: String) {
    world.post(&format!("/alerts/{}/resolve", id), "").await;
}

#[when(expr = "I resolve alert {string} from the page script")]
async fn resolve_from_script(world: &mut DashboardWorld, id: String) {
    world.post(&format!("/api/alerts/{}/resolve", id), "").await;
}

#[then(expr = "alert {string} is resolved in the backend")]
async fn alert_resolved(world: &mut DashboardWorld, id: String) {
    let alert = world.backend().alert(&id).await.expect("alert missing");
    assert!(alert.resolved, "alert {} is still active", id);
}

#[then(expr = "alert {string} is still active in the backend")]
async fn alert_active(world: &mut DashboardWorld, id: String) {
    let alert = world.backend().alert(&id).await.expect("alert missing");
    assert!(!alert.resolved, "alert {} was resolved", id);
}

#[then(expr = "the page offers to resolve alert {string}")]
fn offers_resolve(world: &mut DashboardWorld, id: String) {
    let action = format!(r#"action="/alerts/{}/resolve""#, id);
    assert!(
        world.response().body.contains(&action),
        "no resolve form for {}",
        id
    );
}

#[then(expr = "the page does not offer to resolve alert {string}")]
fn does_not_offer_resolve(world: &mut DashboardWorld, id: String) {
    let action = format!(r#"action="/alerts/{}/resolve""#, id);
    assert!(
        !world.response().body.contains(&action),
        "unexpected resolve form for {}",
        id
    );
}

#[then("the script response reports the alert as resolved")]
fn script_reports_resolved(world: &mut DashboardWorld) {
    let json: serde_json::Value = serde_json::from_str(&world.response().body).unwrap();
    assert_eq!(json["alert"]["resolved"], serde_json::Value::Bool(true));
}

#[then(expr = "the script response carries the error {string}")]
fn script_reports_error(world: &mut DashboardWorld, message: String) {
    let json: serde_json::Value = serde_json::from_str(&world.response().body).unwrap();
    assert_eq!(json["error"], serde_json::Value::String(message));
}
