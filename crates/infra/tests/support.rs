#![allow(dead_code)]

use std::sync::Arc;

use gatehouse_core::testing::{RecordingNavigator, RecordingNotifier};
use gatehouse_domain::{GatehouseConfig, HttpConfig};
use gatehouse_infra::SessionController;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Controller wired against a mock server, with recording ports.
pub struct Harness {
    pub controller: Arc<SessionController>,
    pub notifier: RecordingNotifier,
    pub navigator: RecordingNavigator,
}

impl Harness {
    pub fn new(server: &MockServer) -> Self {
        Self::with_config(test_config(server), "/dashboard")
    }

    pub fn at(server: &MockServer, current_path: &str) -> Self {
        Self::with_config(test_config(server), current_path)
    }

    pub fn with_config(config: GatehouseConfig, current_path: &str) -> Self {
        let notifier = RecordingNotifier::new();
        let navigator = RecordingNavigator::at(current_path);
        let controller = SessionController::from_config(
            &config,
            Arc::new(notifier.clone()),
            Arc::new(navigator.clone()),
        )
        .expect("controller should build");
        Self { controller: Arc::new(controller), notifier, navigator }
    }
}

/// Defaults with the mock server as base URL and a short retry delay.
pub fn test_config(server: &MockServer) -> GatehouseConfig {
    GatehouseConfig {
        http: HttpConfig { base_url: server.uri(), retry_delay_ms: 10, ..HttpConfig::default() },
        ..GatehouseConfig::default()
    }
}

pub fn profile_json() -> Value {
    json!({
        "id": "u-1",
        "displayName": "Ada Lovelace",
        "email": "ada@example.com",
        "roles": ["admin"],
        "permissions": ["users:read", "users:write"]
    })
}

/// Mount a successful login that hands out `access` (and `refresh`, if any).
pub async fn mount_login(server: &MockServer, access: &str, refresh: Option<&str>) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profile": profile_json(),
            "token": { "accessToken": access, "refreshToken": refresh, "expiresIn": 3600 }
        })))
        .mount(server)
        .await;
}

/// Mount the refresh exchange for `refresh`, answering with `new_access`.
pub async fn mount_refresh(
    server: &MockServer,
    refresh: &str,
    new_access: &str,
    delay_ms: u64,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refresh_token": refresh })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "accessToken": new_access,
                    "refreshToken": format!("{refresh}-next"),
                    "tokenType": "Bearer",
                    "expiresIn": 3600
                }))
                .set_delay(std::time::Duration::from_millis(delay_ms)),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount a protected resource: `stale` gets a 401, `fresh` gets data.
pub async fn mount_protected(server: &MockServer, route: &str, stale: &str, fresh: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {stale}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "token expired"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {fresh}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": [1, 2, 3]})))
        .mount(server)
        .await;
}

/// Requests received on `route`.
pub async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == route)
        .collect()
}

pub fn authorization(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
