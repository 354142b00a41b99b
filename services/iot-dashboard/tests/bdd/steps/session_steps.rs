//! BDD step definitions for sign-in, sign-out and route guards

use cucumber::{given, then, when};

use iot_dashboard::mock::MockBackend;

use crate::world::DashboardWorld;

fn token_cookie(set_cookie: &[String]) -> Option<String> {
    set_cookie
        .iter()
        .filter_map(|c| c.split(';').next())
        .find(|pair| pair.starts_with("token="))
        .map(str::to_string)
}

#[given("a seeded backend")]
async fn seeded_backend(world: &mut DashboardWorld) {
    world.start_backend(MockBackend::seeded()).await;
}

#[given("I am not signed in")]
fn not_signed_in(world: &mut DashboardWorld) {
    world.cookie = None;
}

#[given(expr = "I am signed in as {string} with password {string}")]
async fn signed_in(world: &mut DashboardWorld, email: String, password: String) {
    sign_in(world, email, password).await;
    assert!(
        world.cookie.is_some(),
        "signing in did not set a token cookie: {:?}",
        world.response().set_cookie
    );
}

#[when(expr = "I sign in with email {string} and password {string}")]
async fn sign_in(world: &mut DashboardWorld, email: String, password: String) {
    let form = format!("email={}&password={}", email.replace('@', "%40"), password);
    world.post("/login", &form).await;
    if let Some(cookie) = token_cookie(&world.response().set_cookie) {
        world.cookie = Some(cookie);
    }
}

#[when("I sign out")]
async fn sign_out(world: &mut DashboardWorld) {
    world.post("/logout", "").await;
    if token_cookie(&world.response().set_cookie).as_deref() == Some("token=") {
        world.cookie = None;
    }
}

#[when(expr = "I visit {string}")]
async fn visit(world: &mut DashboardWorld, path: String) {
    world.get(&path).await;
}

#[then(expr = "I am redirected to {string}")]
fn redirected_to(world: &mut DashboardWorld, path: String) {
    let response = world.response();
    assert!(
        response.status.is_redirection(),
        "expected a redirect, got {}",
        response.status
    );
    assert_eq!(response.location.as_deref(), Some(path.as_str()));
}

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut DashboardWorld, status: u16) {
    assert_eq!(world.response().status.as_u16(), status);
}

#[then(expr = "the page contains {string}")]
fn page_contains(world: &mut DashboardWorld, expected: String) {
    let body = &world.response().body;
    assert!(
        body.contains(&expected),
        "Expected page to contain '{}'.\nPage:\n{}",
        expected,
        body
    );
}

#[then(expr = "the page does not contain {string}")]
fn page_lacks(world: &mut DashboardWorld, unexpected: String) {
    let body = &world.response().body;
    assert!(
        !body.contains(&unexpected),
        "Expected page not to contain '{}'.\nPage:\n{}",
        unexpected,
        body
    );
}

#[then("a session token is stored")]
fn token_stored(world: &mut DashboardWorld) {
    let cookie = world.cookie.as_deref().expect("no token cookie");
    assert!(cookie.len() > "token=".len());
}

#[then("no session token is stored")]
fn token_cleared(world: &mut DashboardWorld) {
    assert!(world.cookie.is_none(), "cookie still set: {:?}", world.cookie);
}

#[when(expr = "I post {string} to {string}")]
async fn post_form(world: &mut DashboardWorld, form: String, path: String) {
    world.post(&path, &form).await;
}

#[then(expr = "the backend has no user {string}")]
async fn backend_lacks_user(world: &mut DashboardWorld, id: String) {
    let users = world.backend().users().await;
    assert!(users.iter().all(|u| u.id != id), "user {} still exists", id);
}

#[then(expr = "the backend still has user {string}")]
async fn backend_has_user(world: &mut DashboardWorld, id: String) {
    let users = world.backend().users().await;
    assert!(users.iter().any(|u| u.id == id), "user {} is gone", id);
}
