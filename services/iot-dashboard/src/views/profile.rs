use crate::pages::profile::ProfilePage;
use crate::session::Session;
use crate::views::{escape, format_timestamp, layout, optional_banners, render_state, role_badge};

pub fn render(page: &ProfilePage, session: &Session) -> String {
    let banners = optional_banners(page.error.as_deref(), page.success.as_deref());
    let body = render_state(&page.user, |user| {
        if page.editing {
            format!(
                r#"<form class="card" method="post" action="/profile">
                    <label for="username">Username</label>
                    <input id="username" name="username" value="{username}" required>
                    <label for="email">Email</label>
                    <input id="email" name="email" type="email" value="{email}" required>
                    <p>
                        <button class="btn" type="submit">Save</button>
                        <a class="btn btn-secondary" href="/profile">Cancel</a>
                    </p>
                </form>"#,
                username = escape(&page.form.username),
                email = escape(&page.form.email),
            )
        } else {
            format!(
                r#"<div class="card">
                    <p>Username: {username}</p>
                    <p>Email: {email}</p>
                    <p>Role: {role}</p>
                    <p>Member since: {created}</p>
                    <a class="btn" href="/profile?edit=true">Edit Profile</a>
                </div>"#,
                username = escape(&user.username),
                email = escape(&user.email),
                role = role_badge(user.role),
                created = format_timestamp(user.created_at),
            )
        }
    });
    layout::page(
        "Profile",
        session,
        "/profile",
        &format!("<h1>My Profile</h1>{}{}", banners, body),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_state::LoadState;
    use crate::model::User;
    use crate::pages::profile::{ProfileForm, UPDATED};

    fn page(editing: bool) -> ProfilePage {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1", "username": "sam", "email": "sam@example.com"
        }))
        .unwrap();
        ProfilePage {
            form: ProfileForm::from_user(&user),
            user: LoadState::Ready(user),
            editing,
            error: None,
            success: None,
        }
    }

    #[test]
    fn read_mode_offers_edit() {
        let html = render(&page(false), &Session::anonymous());
        assert!(html.contains("Username: sam"));
        assert!(html.contains("/profile?edit=true"));
        assert!(!html.contains("<form class=\"card\""));
    }

    #[test]
    fn edit_mode_shows_form_and_messages() {
        let mut page = page(true);
        page.success = Some(UPDATED.to_string());
        let html = render(&page, &Session::anonymous());
        assert!(html.contains(r#"name="username" value="sam""#));
        assert!(html.contains(UPDATED));
    }
}
