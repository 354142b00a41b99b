//! Page shell and navigation bar

use crate::guard::{allows, Capability};
use crate::session::Session;
use crate::views::escape;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #212529; }
.navbar { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1.5rem; background: #212529; }
.navbar a, .navbar button { color: #f8f9fa; text-decoration: none; }
.navbar .brand { font-weight: 700; margin-right: 1rem; }
.navbar .active { border-bottom: 2px solid #f8f9fa; }
.navbar .spacer { flex: 1; }
.navbar form { margin: 0; }
.navbar button { background: none; border: 1px solid #f8f9fa; border-radius: 0.25rem; padding: 0.25rem 0.75rem; cursor: pointer; }
.avatar { display: inline-flex; align-items: center; justify-content: center; width: 2rem; height: 2rem; border-radius: 50%; background: #0d6efd; color: #fff; font-weight: 700; }
main { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(250px, 1fr)); gap: 1rem; }
.card { background: #fff; border: 1px solid #dee2e6; border-radius: 0.5rem; padding: 1rem; }
.badge { display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; }
.badge-success { color: #155724; background: #d4edda; }
.badge-danger { color: #721c24; background: #f8d7da; }
.badge-warning { color: #856404; background: #fff3cd; }
.badge-primary { color: #fff; background: #0d6efd; }
.badge-secondary { color: #fff; background: #6c757d; }
.alert { padding: 0.75rem 1rem; border-radius: 0.25rem; margin-bottom: 1rem; }
.alert-danger { color: #721c24; background: #f8d7da; }
.alert-success { color: #155724; background: #d4edda; }
.alert-info { color: #0c5460; background: #d1ecf1; }
.loading { padding: 2rem; text-align: center; color: #6c757d; }
.btn { display: inline-block; padding: 0.375rem 0.75rem; border-radius: 0.25rem; border: 1px solid #0d6efd; background: #0d6efd; color: #fff; text-decoration: none; cursor: pointer; }
.btn-secondary { border-color: #6c757d; background: #6c757d; }
.btn-danger { border-color: #dc3545; background: #dc3545; }
.btn-sm { padding: 0.2rem 0.5rem; font-size: 0.85em; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: 0.5rem; text-align: left; border-bottom: 1px solid #dee2e6; }
label { display: block; margin-top: 0.75rem; font-weight: 600; }
input, select { width: 100%; box-sizing: border-box; padding: 0.375rem; margin-top: 0.25rem; }
.progress { height: 0.75rem; background: #e9ecef; border-radius: 0.25rem; overflow: hidden; }
.progress > div { height: 100%; }
.tabs { display: flex; gap: 1rem; margin: 1rem 0; }
.tabs a { text-decoration: none; padding-bottom: 0.25rem; }
.tabs a.active { border-bottom: 2px solid #0d6efd; }
.inline { display: inline; }
"#;

fn nav_link(href: &str, label: &str, current: &str) -> String {
    let active = current.starts_with(href);
    format!(
        r#"<a href="{}"{}>{}</a>"#,
        href,
        if active { r#" class="active""# } else { "" },
        label
    )
}

/// Navigation bar reflecting the session and the current route
pub fn navbar(session: &Session, current: &str) -> String {
    let mut links = vec![r#"<a class="brand" href="/">IoT Dashboard</a>"#.to_string()];
    if allows(session, Capability::Authenticated) {
        links.push(nav_link("/devices", "Devices", current));
        links.push(nav_link("/alerts", "Alerts", current));
        if allows(session, Capability::Admin) {
            links.push(nav_link("/admin/users", "Users", current));
        } else {
            links.push(nav_link("/profile", "Profile", current));
        }
    }

    let right = if allows(session, Capability::Authenticated) {
        format!(
            r#"<span class="avatar" title="{name}">{initial}</span>
            <form method="post" action="/logout"><button type="submit">Logout</button></form>"#,
            name = escape(session.username.as_deref().unwrap_or("User")),
            initial = escape(&session.initial().to_string()),
        )
    } else {
        format!(
            "{}{}",
            nav_link("/login", "Login", current),
            nav_link("/register", "Register", current)
        )
    };

    format!(
        r#"<nav class="navbar">{links}<span class="spacer"></span>{right}</nav>"#,
        links = links.join(""),
        right = right,
    )
}

/// Complete HTML document around a page body
pub fn page(title: &str, session: &Session, current: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | IoT Dashboard</title>
    <style>{style}</style>
</head>
<body>
    {nav}
    <main>
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
        style = STYLE,
        nav = navbar(session, current),
        body = body,
    )
}
