//! Browser-facing router: guards, page handlers and the JSON resolve endpoint

use axum::extract::{FromRef, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::api::ApiClient;
use crate::config::SessionConfig;
use crate::guard::{allows, AdminGuard, AuthGuard, Capability, HOME_ROUTE, LOGIN_ROUTE};
use crate::model::{Credentials, Registration};
use crate::pages::admin::{AdminPage, AdminQuery, UserForm};
use crate::pages::alerts::{AlertListPage, RESOLVE_FAILED};
use crate::pages::auth::{LoginFailure, LoginPage, LoginQuery, RegisterPage};
use crate::pages::device_form::{DeviceEditPage, DeviceFormInput, NewDevicePage};
use crate::pages::devices::{DeviceDetailPage, DeviceListPage};
use crate::pages::home::{HomePage, HomeQuery};
use crate::pages::profile::{ProfileForm, ProfilePage, ProfileQuery};
use crate::pages::readings::ReadingsPage;
use crate::pages::SubmitOutcome;
use crate::session::SessionContext;
use crate::views;

const ADMIN_ROUTE: &str = "/admin/users";

/// Dashboard application state
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub session: SessionConfig,
}

impl FromRef<AppState> for SessionConfig {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}

/// Build the dashboard axum router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(register_page).post(register_submit))
        .route("/logout", get(logout).post(logout))
        .route("/", get(home_handler))
        .route("/dashboard", get(home_handler))
        .route("/devices", get(devices_handler))
        .route("/devices/new", get(new_device_page).post(new_device_submit))
        .route("/devices/{id}", get(device_detail_handler))
        .route("/devices/{id}/edit", get(device_edit_page).post(device_edit_submit))
        .route("/devices/{id}/readings", get(readings_handler))
        .route("/alerts", get(alerts_handler))
        .route("/alerts/{id}/resolve", post(resolve_alert_form))
        .route("/api/alerts/{id}/resolve", post(resolve_alert_json))
        .route("/profile", get(profile_page).post(profile_submit))
        .route(ADMIN_ROUTE, get(admin_page))
        .route("/admin/users/{id}", get(admin_select).post(admin_update))
        .route("/admin/users/{id}/delete", post(admin_delete))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn navigate<P>(outcome: SubmitOutcome<P>, render: impl FnOnce(&P) -> String) -> Response {
    match outcome {
        SubmitOutcome::Navigate(to) => Redirect::to(&to).into_response(),
        SubmitOutcome::Rerender(page) => Html(render(&page)).into_response(),
    }
}

async fn login_page(ctx: SessionContext, Query(query): Query<LoginQuery>) -> Response {
    if ctx.session().is_authenticated {
        return Redirect::to(HOME_ROUTE).into_response();
    }
    Html(views::auth::render_login(&LoginPage::new(&query))).into_response()
}

async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    match LoginPage::submit(&state.api, credentials).await {
        Ok(ctx) => {
            let jar = ctx.persist(jar, &state.session);
            (jar, Redirect::to(HOME_ROUTE)).into_response()
        }
        Err(page) => {
            let status = match page.failure {
                Some(LoginFailure::Credentials) => StatusCode::UNAUTHORIZED,
                Some(LoginFailure::Input) => StatusCode::BAD_REQUEST,
                Some(LoginFailure::Backend) => StatusCode::BAD_GATEWAY,
                None => StatusCode::OK,
            };
            (status, Html(views::auth::render_login(&page))).into_response()
        }
    }
}

async fn register_page() -> Html<String> {
    Html(views::auth::render_register(&RegisterPage::default()))
}

async fn register_submit(
    State(state): State<AppState>,
    Form(registration): Form<Registration>,
) -> Response {
    let outcome = RegisterPage::submit(&state.api, registration).await;
    navigate(outcome, views::auth::render_register)
}

async fn logout(State(state): State<AppState>, ctx: SessionContext, jar: CookieJar) -> Response {
    let (_, jar) = ctx.logout(jar, &state.session);
    (jar, Redirect::to(LOGIN_ROUTE)).into_response()
}

async fn home_handler(
    State(state): State<AppState>,
    AuthGuard(ctx): AuthGuard,
    Query(query): Query<HomeQuery>,
) -> Html<String> {
    let api = ctx.api(&state.api);
    let page = HomePage::load(&api, ctx.session().clone(), query.tab).await;
    Html(views::home::render(&page))
}

async fn devices_handler(State(state): State<AppState>, AuthGuard(ctx): AuthGuard) -> Html<String> {
    let page = DeviceListPage::load(&ctx.api(&state.api), ctx.session()).await;
    Html(views::devices::render_list(&page, ctx.session()))
}

async fn device_detail_handler(
    State(state): State<AppState>,
    AuthGuard(ctx): AuthGuard,
    Path(id): Path<String>,
) -> Html<String> {
    let page = DeviceDetailPage::load(&ctx.api(&state.api), ctx.session(), &id).await;
    Html(views::devices::render_detail(&page, ctx.session()))
}

async fn new_device_page(AdminGuard(ctx): AdminGuard) -> Html<String> {
    Html(views::devices::render_new(&NewDevicePage::default(), ctx.session()))
}

async fn new_device_submit(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Form(input): Form<DeviceFormInput>,
) -> Response {
    let outcome = NewDevicePage::submit(&ctx.api(&state.api), input).await;
    navigate(outcome, |page| views::devices::render_new(page, ctx.session()))
}

async fn device_edit_page(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Path(id): Path<String>,
) -> Html<String> {
    let page = DeviceEditPage::load(&ctx.api(&state.api), &id).await;
    Html(views::devices::render_edit(&page, ctx.session()))
}

async fn device_edit_submit(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Path(id): Path<String>,
    Form(input): Form<DeviceFormInput>,
) -> Response {
    let outcome = DeviceEditPage::submit(&ctx.api(&state.api), &id, input).await;
    navigate(outcome, |page| views::devices::render_edit(page, ctx.session()))
}

async fn readings_handler(
    State(state): State<AppState>,
    AuthGuard(ctx): AuthGuard,
    Path(id): Path<String>,
) -> Html<String> {
    let page = ReadingsPage::load(&ctx.api(&state.api), &id).await;
    Html(views::readings::render(&page, ctx.session()))
}

async fn alerts_handler(State(state): State<AppState>, AuthGuard(ctx): AuthGuard) -> Html<String> {
    let page = AlertListPage::load(&ctx.api(&state.api), ctx.session()).await;
    Html(views::alerts::render(&page, ctx.session()))
}

/// Form fallback for browsers without script: resolve, merge and re-render
async fn resolve_alert_form(
    State(state): State<AppState>,
    AuthGuard(ctx): AuthGuard,
    Path(id): Path<String>,
) -> Html<String> {
    let api = ctx.api(&state.api);
    let mut page = AlertListPage::load(&api, ctx.session()).await;
    page.resolve(&api, &id).await;
    Html(views::alerts::render(&page, ctx.session()))
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn resolve_alert_json(
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
) -> Response {
    if !allows(ctx.session(), Capability::Authenticated) {
        return json_error(StatusCode::UNAUTHORIZED, "Not authenticated");
    }

    match ctx.api(&state.api).alerts().resolve(&id).await {
        Ok(Some(alert)) => Json(serde_json::json!({ "alert": alert })).into_response(),
        Ok(None) => Json(serde_json::json!({ "alert": { "id": id, "resolved": true } })).into_response(),
        Err(e) => {
            tracing::warn!("Failed to resolve alert {}: {}", id, e);
            json_error(StatusCode::BAD_GATEWAY, RESOLVE_FAILED)
        }
    }
}

async fn profile_page(
    State(state): State<AppState>,
    AuthGuard(ctx): AuthGuard,
    Query(query): Query<ProfileQuery>,
) -> Response {
    if allows(ctx.session(), Capability::Admin) {
        return Redirect::to(ADMIN_ROUTE).into_response();
    }
    let editing = query.edit.unwrap_or(false);
    let page = ProfilePage::load(&ctx.api(&state.api), ctx.session(), editing).await;
    Html(views::profile::render(&page, ctx.session())).into_response()
}

async fn profile_submit(
    State(state): State<AppState>,
    AuthGuard(ctx): AuthGuard,
    Form(form): Form<ProfileForm>,
) -> Response {
    if allows(ctx.session(), Capability::Admin) {
        return Redirect::to(ADMIN_ROUTE).into_response();
    }
    let page = ProfilePage::submit(&ctx.api(&state.api), ctx.session(), form).await;
    Html(views::profile::render(&page, ctx.session())).into_response()
}

async fn admin_page(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Query(query): Query<AdminQuery>,
) -> Html<String> {
    let page = AdminPage::load(&ctx.api(&state.api), ctx.session(), query).await;
    Html(views::admin::render(&page, ctx.session()))
}

async fn admin_select(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Path(id): Path<String>,
    Query(query): Query<AdminQuery>,
) -> Html<String> {
    let query = AdminQuery {
        selected: Some(id),
        ..query
    };
    let page = AdminPage::load(&ctx.api(&state.api), ctx.session(), query).await;
    Html(views::admin::render(&page, ctx.session()))
}

async fn admin_update(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Path(id): Path<String>,
    Form(form): Form<UserForm>,
) -> Html<String> {
    let api = ctx.api(&state.api);
    let mut page = AdminPage::load(&api, ctx.session(), AdminQuery::default()).await;
    page.update_user(&api, &id, form).await;
    Html(views::admin::render(&page, ctx.session()))
}

#[derive(Debug, Default, Deserialize)]
struct DeleteForm {
    #[serde(default)]
    confirm: Option<String>,
}

async fn admin_delete(
    State(state): State<AppState>,
    AdminGuard(ctx): AdminGuard,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Html<String> {
    let confirmed = form.confirm.as_deref() == Some("true");
    let api = ctx.api(&state.api);
    let mut page = AdminPage::load(&api, ctx.session(), AdminQuery::default()).await;
    page.delete_user(&api, &id, confirmed).await;
    Html(views::admin::render(&page, ctx.session()))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::api::test_support::*;
    use crate::io::MockHttpClient;
    use crate::mock::DEV_SECRET;
    use crate::session::encode_token;

    fn app(mock: MockHttpClient) -> Router {
        build_router(AppState {
            api: ApiClient::new(Arc::new(mock), BASE),
            session: SessionConfig::default(),
        })
    }

    fn cookie(role: &str) -> String {
        let claims = serde_json::json!({
            "id": format!("{}-1", role), "username": role, "role": role
        });
        let token = encode_token(&claims, DEV_SECRET).unwrap();
        format!("token={}", token)
    }

    async fn get(app: Router, uri: &str, cookie: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = get(app(MockHttpClient::new()), "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn guarded_routes_redirect_anonymous_to_login() {
        for uri in [
            "/",
            "/dashboard",
            "/devices",
            "/devices/new",
            "/devices/1",
            "/devices/1/edit",
            "/devices/1/readings",
            "/alerts",
            "/profile",
            "/admin/users",
            "/admin/users/u1",
        ] {
            let response = get(app(MockHttpClient::new()), uri, None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), LOGIN_ROUTE, "{uri}");
        }
    }

    #[tokio::test]
    async fn admin_routes_redirect_plain_users_home() {
        let user = cookie("user");
        for uri in ["/devices/new", "/devices/1/edit", "/admin/users", "/admin/users/u1"] {
            let response = get(app(MockHttpClient::new()), uri, Some(&user)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), HOME_ROUTE, "{uri}");
        }
    }

    #[tokio::test]
    async fn empty_device_list_renders() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/devices") && req.bearer.is_some())
            .returning(|_| Box::pin(async { Ok(json_response(200, serde_json::json!([]))) }));

        let response = get(app(mock), "/devices", Some(&cookie("user"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("No devices found"));
        assert!(!html.contains(r#"class="alert alert-danger""#));
    }

    #[tokio::test]
    async fn admin_visiting_profile_goes_to_user_management() {
        let response = get(app(MockHttpClient::new()), "/profile", Some(&cookie("admin"))).await;
        assert_eq!(location(&response), ADMIN_ROUTE);
    }

    #[tokio::test]
    async fn unknown_home_tab_renders_devices_tab() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .returning(|_| Box::pin(async { Ok(json_response(200, serde_json::json!([]))) }));

        let response = get(app(mock), "/?tab=charts", Some(&cookie("user"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_sets_cookie_and_redirects_home() {
        let claims = serde_json::json!({"id": "u1", "role": "user"});
        let token = encode_token(&claims, DEV_SECRET).unwrap();
        let expected = token.clone();
        let mut mock = MockHttpClient::new();
        mock.expect_send().returning(move |_| {
            let token = token.clone();
            Box::pin(async move { Ok(json_response(200, serde_json::json!({"token": token}))) })
        });

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=user%40example.com&password=user123"))
            .unwrap();
        let response = app(mock).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), HOME_ROUTE);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("token={}", expected)));
        assert!(set_cookie.contains("HttpOnly"));
    }

    async fn post_login(app: Router) -> axum::response::Response {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=user%40example.com&password=user123"))
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn rejected_credentials_answer_unauthorized() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .returning(|_| Box::pin(async { Ok(json_response(401, serde_json::json!({}))) }));

        let response = post_login(app(mock)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unreachable_backend_is_not_unauthorized() {
        let mut mock = MockHttpClient::new();
        mock.expect_send().returning(|_| {
            Box::pin(async { Err(crate::DashboardError::Http("connection refused".to_string())) })
        });

        let response = post_login(app(mock)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_text(response).await;
        assert!(body.contains("Login failed. Please try again."));
        assert!(!body.contains("Invalid email or password"));
    }

    #[tokio::test]
    async fn login_page_redirects_authenticated_sessions() {
        let response = get(app(MockHttpClient::new()), "/login", Some(&cookie("user"))).await;
        assert_eq!(location(&response), HOME_ROUTE);
    }

    async fn post_json_resolve(app: Router, cookie: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().method("POST").uri("/api/alerts/a1/resolve");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn json_resolve_requires_session() {
        let anonymous = post_json_resolve(app(MockHttpClient::new()), None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn plain_user_resolves_through_json() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/alerts/a1/resolve") && req.bearer.is_some())
            .returning(|_| Box::pin(async { Ok(json_response(200, alert_json("a1", true))) }));

        let response = post_json_resolve(app(mock), Some(&cookie("user"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn plain_user_resolves_through_form() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.method == reqwest::Method::GET && req.url.ends_with("/alerts"))
            .returning(|_| {
                Box::pin(async { Ok(json_response(200, serde_json::json!([alert_json("a1", false)]))) })
            });
        mock.expect_send()
            .withf(|req| req.method == reqwest::Method::PUT && req.url.ends_with("/alerts/a1/resolve"))
            .returning(|_| Box::pin(async { Ok(json_response(200, alert_json("a1", true))) }));

        let request = Request::builder()
            .method("POST")
            .uri("/alerts/a1/resolve")
            .header(header::COOKIE, cookie("user"))
            .body(Body::empty())
            .unwrap();
        let response = app(mock).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(!html.contains(r#"action="/alerts/a1/resolve""#));
        assert!(html.contains("Resolved"));
    }

    #[tokio::test]
    async fn json_resolve_reports_backend_failure() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .returning(|_| Box::pin(async { Ok(json_response(500, serde_json::json!({}))) }));

        let response = post_json_resolve(app(mock), Some(&cookie("admin"))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], RESOLVE_FAILED);
    }

    #[tokio::test]
    async fn json_resolve_echoes_alert() {
        let mut mock = MockHttpClient::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/alerts/a1/resolve"))
            .returning(|_| Box::pin(async { Ok(json_response(200, alert_json("a1", true))) }));

        let response = post_json_resolve(app(mock), Some(&cookie("admin"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["alert"]["resolved"], true);
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::COOKIE, cookie("user"))
            .body(Body::empty())
            .unwrap();
        let response = app(MockHttpClient::new()).oneshot(request).await.unwrap();
        assert_eq!(location(&response), LOGIN_ROUTE);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("token=;"));
    }
}
