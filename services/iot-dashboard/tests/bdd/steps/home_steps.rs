//! BDD step definitions for the home summary

use cucumber::then;

use crate::world::DashboardWorld;

fn stat(body: &str, key: &str) -> Option<u64> {
    let marker = format!(r#"data-stat="{}">"#, key);
    let rest = &body[body.find(&marker)? + marker.len()..];
    let start = rest.find("<p>")? + 3;
    let end = rest[start..].find("</p>")? + start;
    rest[start..end].trim().parse().ok()
}

#[then(expr = "the summary shows {int} {word}")]
fn summary_shows(world: &mut DashboardWorld, expected: u64, key: String) {
    let body = &world.response().body;
    assert_eq!(
        stat(body, &key),
        Some(expected),
        "summary card '{}' mismatch.\nPage:\n{}",
        key,
        body
    );
}

#[then("the online and offline counts add up to the total")]
fn counts_add_up(world: &mut DashboardWorld) {
    let body = &world.response().body;
    let total = stat(body, "total").expect("total card");
    let online = stat(body, "online").expect("online card");
    let offline = stat(body, "offline").expect("offline card");
    assert_eq!(online + offline, total);
}
