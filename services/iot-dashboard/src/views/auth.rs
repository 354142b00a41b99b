use crate::pages::auth::{LoginPage, RegisterPage};
use crate::session::Session;
use crate::views::{error_banner, escape, layout};

pub fn render_login(page: &LoginPage) -> String {
    let notice = page
        .notice
        .as_deref()
        .map(|n| format!(r#"<div class="alert alert-info">{}</div>"#, escape(n)))
        .unwrap_or_default();
    let error = page.error.as_deref().map(error_banner).unwrap_or_default();
    layout::page(
        "Login",
        &Session::anonymous(),
        "/login",
        &format!(
            r#"<h1>Login</h1>
            {notice}{error}
            <form class="card" method="post" action="/login">
                <label for="email">Email</label>
                <input id="email" name="email" type="email" value="{email}" required>
                <label for="password">Password</label>
                <input id="password" name="password" type="password" required>
                <p><button class="btn" type="submit">Login</button></p>
                <p>No account yet? <a href="/register">Register</a></p>
            </form>"#,
            email = escape(&page.email),
        ),
    )
}

pub fn render_register(page: &RegisterPage) -> String {
    let error = page.error.as_deref().map(error_banner).unwrap_or_default();
    layout::page(
        "Register",
        &Session::anonymous(),
        "/register",
        &format!(
            r#"<h1>Register</h1>
            {error}
            <form class="card" method="post" action="/register">
                <label for="username">Username</label>
                <input id="username" name="username" value="{username}" required>
                <label for="email">Email</label>
                <input id="email" name="email" type="email" value="{email}" required>
                <label for="password">Password</label>
                <input id="password" name="password" type="password" required>
                <p><button class="btn" type="submit">Register</button></p>
                <p>Already registered? <a href="/login">Login</a></p>
            </form>"#,
            username = escape(&page.username),
            email = escape(&page.email),
        ),
    )
}
