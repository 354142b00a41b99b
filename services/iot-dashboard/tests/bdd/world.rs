//! BDD test world for the IoT dashboard

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use cucumber::World;
use tower::ServiceExt;

use iot_dashboard::api::ApiClient;
use iot_dashboard::config::SessionConfig;
use iot_dashboard::dashboard::{build_router, AppState};
use iot_dashboard::io::ReqwestHttpClient;
use iot_dashboard::mock::{self, MockBackend};

/// Last response the dashboard produced
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
    pub body: String,
}

#[derive(Debug, Default, World)]
pub struct DashboardWorld {
    pub backend: Option<MockBackend>,
    pub backend_url: Option<String>,
    pub cookie: Option<String>,
    pub response: Option<PageResponse>,
}

impl DashboardWorld {
    /// Start a backend and remember where the dashboard should reach it
    pub async fn start_backend(&mut self, backend: MockBackend) {
        let addr = mock::spawn(backend.clone(), SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("mock backend failed to start");
        self.backend = Some(backend);
        self.backend_url = Some(format!("http://{}", addr));
    }

    pub fn backend(&self) -> &MockBackend {
        self.backend.as_ref().expect("backend not started")
    }

    pub fn response(&self) -> &PageResponse {
        self.response.as_ref().expect("no request made")
    }

    fn app(&self) -> axum::Router {
        let http = ReqwestHttpClient::new(Duration::from_secs(5)).expect("http client");
        build_router(AppState {
            api: ApiClient::new(
                Arc::new(http),
                self.backend_url.clone().expect("backend not started"),
            ),
            session: SessionConfig::default(),
        })
    }

    /// Send a request through the dashboard router with the current cookie
    pub async fn send(&mut self, method: Method, uri: &str, form: Option<&str>) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie.as_str());
        }
        let body = match form {
            Some(form) => {
                request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        self.response = Some(PageResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8(body.to_vec()).unwrap(),
        });
    }

    pub async fn get(&mut self, uri: &str) {
        self.send(Method::GET, uri, None).await;
    }

    pub async fn post(&mut self, uri: &str, form: &str) {
        self.send(Method::POST, uri, Some(form)).await;
    }
}
