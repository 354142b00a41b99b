use crate::model::{Role, User};
use crate::pages::admin::{AdminPage, UserForm, UserManagement};
use crate::session::Session;
use crate::views::{escape, format_timestamp, layout, optional_banners, render_state, role_badge};

fn own_profile(data: &UserManagement) -> String {
    match &data.profile {
        Some(profile) => format!(
            r#"<div class="card"><h2>My Profile</h2><p>{username}</p><p>{email}</p><p>{role}</p></div>"#,
            username = escape(&profile.username),
            email = escape(&profile.email),
            role = role_badge(profile.role),
        ),
        None => String::new(),
    }
}

fn query_link(search: &str, extra: &str) -> String {
    let mut params = Vec::new();
    if !search.is_empty() {
        params.push(format!("search={}", escape(&url_encode(search))));
    }
    if !extra.is_empty() {
        params.push(extra.to_string());
    }
    if params.is_empty() {
        "/admin/users".to_string()
    } else {
        format!("/admin/users?{}", params.join("&amp;"))
    }
}

fn url_encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn user_row(page: &AdminPage, user: &User) -> String {
    let id = escape(&user.id);
    let selected = page.selected.as_deref() == Some(user.id.as_str());
    let delete = if page.is_self(&user.id) {
        "<em>You</em>".to_string()
    } else if page.confirm_delete.as_deref() == Some(user.id.as_str()) {
        format!(
            r#"<form class="inline" method="post" action="/admin/users/{id}/delete">
                <input type="hidden" name="confirm" value="true">
                <button class="btn btn-sm btn-danger" type="submit">Confirm Delete</button>
            </form>
            <a class="btn btn-sm btn-secondary" href="{cancel}">Cancel</a>"#,
            cancel = query_link(&page.search, ""),
        )
    } else {
        format!(
            r#"<form class="inline" method="post" action="/admin/users/{id}/delete">
                <button class="btn btn-sm btn-danger" type="submit">Delete</button>
            </form>"#
        )
    };
    format!(
        r#"<tr{class}><td>{username}</td><td>{email}</td><td>{role}</td><td>{created}</td>
            <td><a class="btn btn-sm" href="{select}">Select</a> {delete}</td></tr>"#,
        class = if selected { r#" class="selected""# } else { "" },
        username = escape(&user.username),
        email = escape(&user.email),
        role = role_badge(user.role),
        created = format_timestamp(user.created_at),
        select = query_link(&page.search, &format!("selected={}", id)),
    )
}

fn role_option(role: Role, current: &str) -> String {
    let value = role.to_string();
    format!(
        r#"<option value="{value}"{selected}>{value}</option>"#,
        selected = if value == current { " selected" } else { "" },
    )
}

fn selected_panel(page: &AdminPage) -> String {
    let (Some(user), Some(form)) = (page.selected_user(), page.form.as_ref()) else {
        return String::new();
    };
    let id = escape(&user.id);
    if page.editing {
        edit_form(&id, form, &query_link(&page.search, &format!("selected={}", id)))
    } else {
        format!(
            r#"<div class="card"><h2>{username}</h2><p>{email}</p><p>{role}</p>
                <a class="btn" href="{edit}">Edit User</a></div>"#,
            username = escape(&user.username),
            email = escape(&user.email),
            role = role_badge(user.role),
            edit = query_link(&page.search, &format!("selected={}&amp;edit=true", id)),
        )
    }
}

fn edit_form(id: &str, form: &UserForm, cancel: &str) -> String {
    format!(
        r#"<form class="card" method="post" action="/admin/users/{id}">
            <label for="username">Username</label>
            <input id="username" name="username" value="{username}" required>
            <label for="email">Email</label>
            <input id="email" name="email" type="email" value="{email}" required>
            <label for="role">Role</label>
            <select id="role" name="role">{user_option}{admin_option}</select>
            <p>
                <button class="btn" type="submit">Save</button>
                <a class="btn btn-secondary" href="{cancel}">Cancel</a>
            </p>
        </form>"#,
        username = escape(&form.username),
        email = escape(&form.email),
        user_option = role_option(Role::User, &form.role),
        admin_option = role_option(Role::Admin, &form.role),
    )
}

pub fn render(page: &AdminPage, session: &Session) -> String {
    let banners = optional_banners(page.error.as_deref(), page.success.as_deref());
    let body = render_state(&page.data, |data| {
        let users = page.visible_users();
        let table = if users.is_empty() {
            "<p>No users found</p>".to_string()
        } else {
            let rows: String = users.iter().map(|u| user_row(page, u)).collect();
            format!(
                "<table><thead><tr><th>Username</th><th>Email</th><th>Role</th><th>Created</th><th></th></tr></thead><tbody>{}</tbody></table>",
                rows
            )
        };
        format!(
            r#"{profile}
            <form method="get" action="/admin/users">
                <label for="search">Search users</label>
                <input id="search" name="search" value="{search}" placeholder="Username or email">
            </form>
            {selected}
            {table}"#,
            profile = own_profile(data),
            search = escape(&page.search),
            selected = selected_panel(page),
        )
    });
    layout::page(
        "User Management",
        session,
        "/admin/users",
        &format!("<h1>User Management</h1>{}{}", banners, body),
    )
}
