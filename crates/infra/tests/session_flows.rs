mod support;

use std::sync::Arc;
use std::time::Duration;

use gatehouse_core::PermissionQuery;
use gatehouse_domain::constants::{KEY_AUTH_TOKEN, KEY_REFRESH_TOKEN, KEY_REFRESH_TOKEN_EXPIRY};
use gatehouse_domain::{ApiErrorKind, LoginCredentials, StorageScope};
use gatehouse_infra::{ApiRequest, ProgressFn, UploadRequest};
use support::{
    authorization, mount_login, mount_protected, mount_refresh, profile_json, requests_to,
    test_config, Harness,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(remember_me: bool) -> LoginCredentials {
    LoginCredentials::new("ada@example.com", "correct horse", remember_me)
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh_exchange() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    mount_protected(&server, "/reports", "a1", "a2").await;
    mount_refresh(&server, "r1", "a2", 300, 1).await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let controller = Arc::clone(&harness.controller);
        handles.push(tokio::spawn(async move {
            controller.pipeline().execute(ApiRequest::get("/reports")).await
        }));
    }
    for handle in handles {
        let response = handle.await??;
        assert_eq!(response.status, 200);
    }

    assert_eq!(requests_to(&server, "/auth/refresh").await.len(), 1);
    assert_eq!(harness.controller.store().get_token()?.as_deref(), Some("a2"));
    assert!(harness.navigator.redirects().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_shared_refresh_ends_session_once() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    mount_protected(&server, "/reports", "a1", "a2").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let controller = Arc::clone(&harness.controller);
        handles.push(tokio::spawn(async move {
            controller.pipeline().execute(ApiRequest::get("/reports")).await
        }));
    }
    for handle in handles {
        let err = handle.await?.unwrap_err();
        assert!(err.is_unauthorized());
    }

    assert_eq!(requests_to(&server, "/auth/refresh").await.len(), 1);
    assert_eq!(harness.notifier.titles(), vec!["Session expired".to_string()]);
    assert_eq!(harness.navigator.redirects(), vec!["/login".to_string()]);
    assert!(!harness.controller.is_authenticated()?);
    Ok(())
}

#[tokio::test]
async fn concurrent_current_user_calls_share_one_fetch() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_json())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await?;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let controller = Arc::clone(&harness.controller);
        handles.push(tokio::spawn(async move { controller.get_current_user().await }));
    }

    let mut profiles = Vec::new();
    for handle in handles {
        profiles.push(handle.await??);
    }
    assert!(profiles.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(profiles[0].display_name, "Ada Lovelace");
    assert_eq!(requests_to(&server, "/auth/me").await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn server_errors_are_attempted_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let err = harness.controller.pipeline().execute(ApiRequest::get("/flaky")).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Server);
    assert_eq!(err.code, 502);
    assert_eq!(harness.notifier.titles(), vec!["Server error".to_string()]);
}

#[tokio::test]
async fn client_errors_are_never_retried() {
    for status in [400u16, 403, 404] {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/7"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let harness = Harness::new(&server);
        let err = harness
            .controller
            .pipeline()
            .execute(ApiRequest::delete("/users/7"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Client);
        assert_eq!(err.code, status);
        assert_eq!(requests_to(&server, "/users/7").await.len(), 1);
    }
}

#[tokio::test]
async fn remember_me_login_keeps_tokens_out_of_session_scope() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    let harness = Harness::new(&server);
    let store = harness.controller.store();

    harness.controller.login(&credentials(true)).await?;
    assert_eq!(store.backend(StorageScope::Session).get(KEY_AUTH_TOKEN)?, None);
    assert_eq!(store.backend(StorageScope::Persistent).get(KEY_AUTH_TOKEN)?.as_deref(), Some("a1"));
    assert_eq!(store.get_refresh_token()?.as_deref(), Some("r1"));

    harness.controller.login(&credentials(false)).await?;
    assert_eq!(store.backend(StorageScope::Persistent).get(KEY_AUTH_TOKEN)?, None);
    assert_eq!(store.backend(StorageScope::Persistent).get(KEY_REFRESH_TOKEN)?, None);
    assert_eq!(store.backend(StorageScope::Session).get(KEY_AUTH_TOKEN)?.as_deref(), Some("a1"));
    assert_eq!(store.get_refresh_token()?, None);
    assert!(harness.controller.is_authenticated()?);
    Ok(())
}

#[tokio::test]
async fn expired_refresh_token_is_purged_before_use() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    mount_refresh(&server, "r1", "a2", 0, 0).await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    let store = harness.controller.store();
    let past = chrono::Utc::now() - chrono::Duration::hours(1);
    store
        .backend(StorageScope::Persistent)
        .set(KEY_REFRESH_TOKEN_EXPIRY, &past.timestamp_millis().to_string())?;

    assert_eq!(store.get_refresh_token()?, None);
    assert!(store.backend(StorageScope::Persistent).keys()?.is_empty());
    assert!(!harness.controller.is_authenticated()?);

    let err = harness.controller.refresh_token().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Local);
    Ok(())
}

#[tokio::test]
async fn unauthorized_without_refresh_token_expires_session() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    mount_protected(&server, "/reports", "a1", "a2").await;
    mount_refresh(&server, "r1", "a2", 0, 0).await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await?;

    let err = harness.controller.pipeline().execute(ApiRequest::get("/reports")).await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    assert_eq!(err.code, 401);
    assert_eq!(harness.notifier.titles(), vec!["Session expired".to_string()]);
    assert_eq!(harness.navigator.redirects(), vec!["/login".to_string()]);
    assert!(requests_to(&server, "/auth/refresh").await.is_empty());
    assert!(!harness.controller.is_authenticated()?);
    Ok(())
}

#[tokio::test]
async fn expiry_redirect_skipped_when_already_at_sign_in() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    mount_protected(&server, "/reports", "a1", "a2").await;

    let harness = Harness::at(&server, "/login");
    harness.controller.login(&credentials(false)).await?;

    let err = harness.controller.pipeline().execute(ApiRequest::get("/reports")).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(harness.navigator.redirects().is_empty());
    assert_eq!(harness.notifier.titles(), vec!["Session expired".to_string()]);
    Ok(())
}

#[tokio::test]
async fn remembered_session_recovers_with_refresh_and_one_replay() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    mount_protected(&server, "/reports", "a1", "a2").await;
    mount_refresh(&server, "r1", "a2", 0, 1).await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    let response = harness.controller.pipeline().execute(ApiRequest::get("/reports")).await?;
    assert_eq!(response.status, 200);

    let refreshes = requests_to(&server, "/auth/refresh").await;
    let reports = requests_to(&server, "/reports").await;
    assert_eq!(refreshes.len(), 1);
    assert_eq!(reports.len(), 2, "original attempt plus exactly one replay");
    assert_eq!(authorization(&reports[1]).as_deref(), Some("Bearer a2"));
    assert!(authorization(&refreshes[0]).is_none());

    assert_eq!(harness.controller.store().get_refresh_token()?.as_deref(), Some("r1-next"));
    assert!(harness.notifier.titles().is_empty());
    Ok(())
}

#[tokio::test]
async fn rejected_refresh_surfaces_unauthorized_and_redirects() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    mount_protected(&server, "/reports", "a1", "a2").await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    let err = harness.controller.pipeline().execute(ApiRequest::get("/reports")).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(requests_to(&server, "/reports").await.len(), 1);
    assert_eq!(harness.navigator.redirects(), vec!["/login".to_string()]);
    assert!(harness.controller.store().backend(StorageScope::Persistent).keys()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn login_rejection_is_labelled_and_never_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "invalid credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "r1", "a2", 0, 0).await;

    let harness = Harness::at(&server, "/login");
    let err = harness.controller.login(&credentials(true)).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message, "invalid credentials");
    assert_eq!(harness.notifier.titles(), vec!["Sign-in failed".to_string()]);
    assert!(harness.navigator.redirects().is_empty());
}

#[tokio::test]
async fn logout_clears_local_state_when_server_fails() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    harness.controller.logout().await?;

    assert!(!harness.controller.is_authenticated()?);
    assert!(harness.controller.store().backend(StorageScope::Persistent).keys()?.is_empty());
    assert_eq!(harness.navigator.redirects(), vec!["/login".to_string()]);
    assert!(harness.notifier.titles().is_empty());

    let logouts = requests_to(&server, "/auth/logout").await;
    assert!(!logouts.is_empty());
    assert_eq!(authorization(&logouts[0]).as_deref(), Some("Bearer a1"));
    Ok(())
}

#[tokio::test]
async fn logout_without_server_still_signs_out() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await?;
    drop(server);

    harness.controller.logout().await?;
    assert!(!harness.controller.is_authenticated()?);
    Ok(())
}

#[tokio::test]
async fn transient_profile_failure_keeps_session() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await?;

    let err = harness.controller.get_current_user().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Server);
    assert!(harness.controller.is_authenticated()?);
    Ok(())
}

#[tokio::test]
async fn unauthorized_profile_fetch_ends_session() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await?;

    let err = harness.controller.get_current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!harness.controller.is_authenticated()?);
    Ok(())
}

#[tokio::test]
async fn permission_queries_read_cached_profile() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    let harness = Harness::new(&server);
    assert!(!harness.controller.has_permission("users:read"));

    let profile = harness.controller.login(&credentials(false)).await?;

    assert!(profile.has_role("admin"));
    assert!(harness.controller.has_permission("users:read"));
    assert!(harness.controller.has_all_permissions(&["users:read", "users:write"]));
    assert!(!harness.controller.has_any_permission(&["billing:read"]));
    assert!(harness.controller.has_any_role(&["auditor", "admin"]));
    assert!(!harness.controller.has_all_roles(&["auditor", "admin"]));
    assert!(harness.controller.access_token_expires_at().is_some());
    assert!(requests_to(&server, "/auth/me").await.is_empty());
    Ok(())
}

#[tokio::test]
async fn refresh_token_without_stored_token_fails_fast() {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    mount_refresh(&server, "r1", "a2", 0, 0).await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await.unwrap();

    let err = harness.controller.refresh_token().await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Local);
    assert!(harness.controller.is_authenticated().unwrap());
}

#[tokio::test]
async fn explicit_refresh_updates_store() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;
    mount_refresh(&server, "r1", "a2", 0, 1).await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(true)).await?;

    let token = harness.controller.refresh_token().await?;
    assert_eq!(token, "a2");
    assert_eq!(harness.controller.store().get_token()?.as_deref(), Some("a2"));
    Ok(())
}

#[tokio::test]
async fn upload_reports_progress_up_to_completion() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", None).await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "f-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    harness.controller.login(&credentials(false)).await?;

    let reports = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let progress: ProgressFn = Arc::new(move |percent| sink.lock().push(percent));

    let upload = UploadRequest::new("/files", "report.csv", vec![b'x'; 200 * 1024])
        .content_type("text/csv")
        .field("folder", "exports");
    let response = harness.controller.pipeline().upload(upload, Some(progress)).await?;
    assert_eq!(response.status, 201);

    let reports = reports.lock().clone();
    assert_eq!(reports.last(), Some(&100));
    assert!(reports.windows(2).all(|pair| pair[0] <= pair[1]));

    let uploads = requests_to(&server, "/files").await;
    let content_type = uploads[0]
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    assert_eq!(authorization(&uploads[0]).as_deref(), Some("Bearer a1"));
    Ok(())
}

#[tokio::test]
async fn remembered_session_survives_restart() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_login(&server, "a1", Some("r1")).await;

    let dir = tempfile::tempdir()?;
    let mut config = test_config(&server);
    config.storage.persistent_path = Some(dir.path().join("session.json").display().to_string());

    let first = Harness::with_config(config.clone(), "/dashboard");
    first.controller.login(&credentials(true)).await?;
    drop(first);

    let second = Harness::with_config(config, "/dashboard");
    assert!(second.controller.is_authenticated()?);
    assert_eq!(second.controller.store().get_refresh_token()?.as_deref(), Some("r1"));
    assert_eq!(second.controller.user()?.map(|user| user.id).as_deref(), Some("u-1"));
    Ok(())
}
