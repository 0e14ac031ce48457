//! Integration tests exercising the assembled service:
//! configuration → assembly → webhook/session handling → LMDB persistence.
//!
//! These wire together components that are normally only connected inside
//! `service.rs`, with the LMDB backend and nullable network edges.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use idv_crypto::sign_hex;
use idv_node::{assemble, Infrastructure, ServiceConfig};
use idv_notify::PushSender;
use idv_nullables::{NullClock, NullProviderApi, NullPushSender};
use idv_providers::{ProviderSettings, SessionRequest};
use idv_store::{
    DeviceTokenStore, ProfileStore, SessionStore, VerificationRecordStore,
};
use idv_store_lmdb::LmdbStore;
use idv_types::{
    AccountStatus, HumanVerification, Provider, ProviderSessionId, RecordStatus, UserId,
    UserProfile, VerificationMethod,
};
use idv_verification::{WebhookAck, WebhookError, WebhookHeaders};
use serde_json::Value;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NOW: u64 = 1_700_000_000;

fn temp_store() -> (tempfile::TempDir, Arc<LmdbStore>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = LmdbStore::open(dir.path(), 64 * 1024 * 1024).expect("open store");
    (dir, Arc::new(store))
}

fn config() -> ServiceConfig {
    ServiceConfig {
        didit: ProviderSettings {
            api_key: Some("didit-key".into()),
            webhook_secret: Some("didit-secret".into()),
            workflow_id: Some("wf".into()),
            ..ProviderSettings::default()
        },
        veriff: ProviderSettings {
            api_key: Some("veriff-key".into()),
            webhook_secret: Some("veriff-secret".into()),
            ..ProviderSettings::default()
        },
        ..ServiceConfig::default()
    }
}

fn user() -> UserId {
    UserId::new("u1").unwrap()
}

// ---------------------------------------------------------------------------
// 1. Session creation followed by a decision webhook
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_then_approval_persists_everything() {
    let (_dir, store) = temp_store();
    store.put_profile(&UserProfile::new(user())).unwrap();
    store.register_token(&user(), "device").unwrap();

    let api = Arc::new(NullProviderApi::new());
    api.respond(
        201,
        r#"{"verification":{"id":"v1","url":"https://magic.veriff.me/v/1","sessionToken":"tok"}}"#,
    );
    let push = Arc::new(NullPushSender::new());
    let state = assemble(
        &config(),
        Infrastructure {
            store: store.clone(),
            clock: Arc::new(NullClock::new(NOW)),
            provider_api: api.clone(),
            push: Some(push.clone() as Arc<dyn PushSender>),
        },
    );

    let created = state.initiators[&Provider::Veriff]
        .create_session(&SessionRequest::for_user(user()))
        .await
        .unwrap();
    assert_eq!(created.provider_session_id.as_str(), "v1");
    assert_eq!(api.requests()[0].url, "https://stationapi.veriff.com/v1/sessions");

    let body = br#"{"verification":{"id":"v1","status":"approved","vendorData":"u1"}}"#;
    let headers =
        WebhookHeaders::new().with("x-hmac-signature", sign_hex(body, "veriff-secret"));
    let ack = state
        .engine
        .handle(Provider::Veriff, &headers, body)
        .await
        .unwrap();
    assert!(matches!(ack, WebhookAck::Processed { .. }));

    let session = store
        .get_session(Provider::Veriff, &ProviderSessionId::new("v1").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(session.raw_status, "approved");
    assert_eq!(session.session_url, "https://magic.veriff.me/v/1");
    assert_eq!(session.session_token.as_deref(), Some("tok"));

    let record = store
        .find_record(&user(), VerificationMethod::IdDocument)
        .unwrap()
        .unwrap();
    assert_eq!(record.status, RecordStatus::Verified);

    let profile = store.get_profile(&user()).unwrap().unwrap();
    assert_eq!(profile.verified_human, HumanVerification::Verified);
    assert_eq!(profile.account_status, AccountStatus::Active);
    assert_eq!(push.sent().len(), 1);
}

// ---------------------------------------------------------------------------
// 2. Webhook arriving before the creation response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn early_webhook_then_creation_merge() {
    let (_dir, store) = temp_store();
    let api = Arc::new(NullProviderApi::new());
    api.respond(200, r#"{"session_id":"s1","url":"https://x"}"#);
    let state = assemble(
        &config(),
        Infrastructure {
            store: store.clone(),
            clock: Arc::new(NullClock::new(NOW)),
            provider_api: api,
            push: None,
        },
    );

    let body = br#"{"session_id":"s1","status":"In Progress","vendor_data":"u1"}"#;
    let headers = WebhookHeaders::new()
        .with("X-Signature", sign_hex(body, "didit-secret"))
        .with("X-Timestamp", NOW.to_string());
    state
        .engine
        .handle(Provider::Didit, &headers, body)
        .await
        .unwrap();

    state.initiators[&Provider::Didit]
        .create_session(&SessionRequest::for_user(user()))
        .await
        .unwrap();

    assert_eq!(store.session_count().unwrap(), 1);
    let session = store
        .get_session(Provider::Didit, &ProviderSessionId::new("s1").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(session.session_url, "https://x");
    assert!(session.last_payload.is_some());
    assert!(store.records_for_user(&user()).unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// 3. Configured replay window is honoured
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replay_window_comes_from_config() {
    let (_dir, store) = temp_store();
    let mut config = config();
    config.replay_window_secs = 10;
    let state = assemble(
        &config,
        Infrastructure {
            store: store.clone(),
            clock: Arc::new(NullClock::new(NOW)),
            provider_api: Arc::new(NullProviderApi::new()),
            push: None,
        },
    );

    let body = br#"{"session_id":"s1","status":"Approved","vendor_data":"u1"}"#;
    let headers = WebhookHeaders::new()
        .with("X-Signature", sign_hex(body, "didit-secret"))
        .with("X-Timestamp", (NOW - 11).to_string());
    assert_eq!(
        state.engine.handle(Provider::Didit, &headers, body).await,
        Err(WebhookError::Replay)
    );
    assert_eq!(store.session_count().unwrap(), 0);
}

// ---------------------------------------------------------------------------
// 4. Everything over HTTP: no store writes outside the service itself
// ---------------------------------------------------------------------------

fn bearer(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#));
    format!("Bearer {header}.{claims}.sig")
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn http_service(store: Arc<LmdbStore>, api: Arc<NullProviderApi>, push: Arc<NullPushSender>) -> Router {
    let state = assemble(
        &config(),
        Infrastructure {
            store,
            clock: Arc::new(NullClock::new(NOW)),
            provider_api: api,
            push: Some(push as Arc<dyn PushSender>),
        },
    );
    idv_rpc::router(Arc::new(state))
}

#[tokio::test]
async fn http_signup_to_approval_activates_and_pushes() {
    let (_dir, store) = temp_store();
    let api = Arc::new(NullProviderApi::new());
    api.respond(201, r#"{"verification":{"id":"v1","url":"https://magic.veriff.me/v/1"}}"#);
    let push = Arc::new(NullPushSender::new());
    let app = http_service(store.clone(), api, push.clone());

    let (status, created) = call(
        &app,
        Request::post("/veriff")
            .header("authorization", bearer("u1"))
            .body(Body::from(r#"{"action":"create_session"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["session_id"], "v1");

    let (status, _) = call(
        &app,
        Request::post("/devices")
            .header("authorization", bearer("u1"))
            .body(Body::from(r#"{"token":"phone"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = r#"{"verification":{"id":"v1","status":"approved","vendorData":"u1"}}"#;
    let (status, _) = call(
        &app,
        Request::post("/veriff")
            .header("x-hmac-signature", sign_hex(body.as_bytes(), "veriff-secret"))
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let profile = store.get_profile(&user()).unwrap().expect("profile provisioned");
    assert_eq!(profile.verified_human, HumanVerification::Verified);
    assert_eq!(profile.account_status, AccountStatus::Active);
    let sent = push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tokens, vec!["phone"]);
}

#[tokio::test]
async fn http_direct_message_reaches_thread_members() {
    let (_dir, store) = temp_store();
    let push = Arc::new(NullPushSender::new());
    let app = http_service(store, Arc::new(NullProviderApi::new()), push.clone());

    for (uri, body) in [
        ("/profile", r#"{"display_name":"Ada"}"#),
        ("/dm-threads", r#"{"thread_id":"t1","participants":["u2"]}"#),
    ] {
        let (status, _) = call(
            &app,
            Request::post(uri)
                .header("authorization", bearer("u1"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
    let (status, _) = call(
        &app,
        Request::post("/devices")
            .header("authorization", bearer("u2"))
            .body(Body::from(r#"{"token":"phone-2"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let event = r#"{"type":"INSERT","record":{"thread_id":"t1","sender_id":"u1","body":"hi"}}"#;
    let (status, result) = call(
        &app,
        Request::post("/notify-dm").body(Body::from(event)).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);

    let sent = push.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Ada");
    assert_eq!(sent[0].tokens, vec!["phone-2"]);
    assert_eq!(sent[0].data["type"], "message");
}
