//! Request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use idv_notify::{
    DirectMessageOutcome, MessageInserted, NotifyError, NotifyOutcome, WalletNotification,
};
use idv_providers::{SessionCreated, SessionRequest};
use idv_types::{ProfileChange, Provider, ThreadId, UserId};
use idv_verification::{WebhookAck, WebhookHeaders};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{AppState, RpcError};

// ── Provider endpoints ───────────────────────────────────────────────────

pub async fn didit(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    provider_entry(&state, Provider::Didit, &headers, &body).await
}

pub async fn veriff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    provider_entry(&state, Provider::Veriff, &headers, &body).await
}

/// A provider endpoint serves two callers: the provider itself (signed
/// webhook) and the app (bearer token). The headers tell them apart.
async fn provider_entry(
    state: &AppState,
    provider: Provider,
    headers: &HeaderMap,
    body: &[u8],
) -> Response {
    let is_webhook = state
        .engine
        .signature_header(provider)
        .is_some_and(|name| headers.contains_key(name));
    if is_webhook {
        return webhook(state, provider, headers, body).await.into_response();
    }

    match headers.get(header::AUTHORIZATION) {
        Some(authorization) => {
            let authorization = match authorization.to_str() {
                Ok(value) => value,
                Err(_) => {
                    return RpcError::Authentication("Unauthorized".into()).into_response()
                }
            };
            app_request(state, provider, authorization, body)
                .await
                .into_response()
        }
        None => RpcError::MissingHeaders.into_response(),
    }
}

async fn webhook(
    state: &AppState,
    provider: Provider,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Json<Value>, RpcError> {
    state.metrics.webhooks_received.inc();
    let headers: WebhookHeaders = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v.to_string())))
        .collect();

    let ack = state
        .engine
        .handle(provider, &headers, body)
        .await
        .inspect_err(|_| state.metrics.webhooks_rejected.inc())?;

    let response = match ack {
        WebhookAck::Processed { .. } => {
            state.metrics.webhooks_processed.inc();
            json!({ "received": true })
        }
        WebhookAck::Malformed(kind) => {
            state.metrics.webhooks_skipped.inc();
            json!({ "received": true, "status": kind.marker() })
        }
        WebhookAck::MissingUser { .. } => {
            state.metrics.webhooks_skipped.inc();
            json!({ "received": true, "error": "Missing userId" })
        }
    };
    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppRequest {
    #[serde(default)]
    action: Option<String>,
    /// Overrides the user id echoed to Didit.
    #[serde(default, rename = "vendor_data")]
    vendor_data: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// Only Didit sessions may be opened on behalf of a caller-supplied user id;
/// every other provider echoes the authenticated caller.
fn accepts_vendor_data(provider: Provider) -> bool {
    matches!(provider, Provider::Didit)
}

async fn app_request(
    state: &AppState,
    provider: Provider,
    authorization: &str,
    body: &[u8],
) -> Result<Json<SessionCreated>, RpcError> {
    let caller = state.authenticator.authenticate(authorization)?;
    let request: AppRequest =
        serde_json::from_slice(body).map_err(|e| RpcError::InvalidBody(e.to_string()))?;
    if request.action.as_deref() != Some("create_session") {
        return Err(RpcError::InvalidAction);
    }

    let user_id = match request.vendor_data.filter(|v| !v.is_empty()) {
        Some(vendor_data) if accepts_vendor_data(provider) => {
            UserId::new(vendor_data).map_err(|_| RpcError::MissingFields)?
        }
        Some(_) => {
            tracing::debug!(%provider, "ignoring vendor_data, echoing the caller");
            caller
        }
        None => caller,
    };
    if let Err(e) = state.accounts.ensure_profile(&user_id) {
        tracing::warn!(user = %user_id, error = %e, "could not provision profile before session");
    }
    let initiator = state
        .initiators
        .get(&provider)
        .ok_or_else(|| RpcError::Configuration(format!("{} provider", provider.display_name())))?;

    let session_request = SessionRequest {
        user_id,
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
    };
    match initiator.create_session(&session_request).await {
        Ok(created) => {
            state.metrics.sessions_created.inc();
            Ok(Json(created))
        }
        Err(e) => {
            state.metrics.session_failures.inc();
            Err(e.into())
        }
    }
}

// ── Wallet notifications ─────────────────────────────────────────────────

pub async fn notify_wallet(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match send_wallet_notification(&state, &body).await {
        Ok(response) => response,
        Err(RpcError::MissingFields) => {
            (StatusCode::BAD_REQUEST, "Missing required fields").into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn send_wallet_notification(state: &AppState, body: &[u8]) -> Result<Response, RpcError> {
    let request: WalletNotification =
        serde_json::from_slice(body).map_err(|e| RpcError::InvalidBody(e.to_string()))?;
    let (recipient, message) = request.into_message()?;
    let notifier = state
        .notifier
        .as_ref()
        .ok_or_else(|| RpcError::Configuration("push notifications".into()))?;

    match notifier.send_to_user(&recipient, message).await {
        Ok(NotifyOutcome::NoTokens) => Ok((StatusCode::OK, "No FCM tokens found").into_response()),
        Ok(NotifyOutcome::Sent { response, .. }) => {
            state.metrics.push_sent.inc();
            Ok(Json(json!({ "success": true, "fcmResult": response })).into_response())
        }
        Err(e) => {
            state.metrics.push_failures.inc();
            Err(e.into())
        }
    }
}

pub async fn notify_dm(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match send_direct_message(&state, &body).await {
        Ok(response) => response,
        Err(RpcError::MissingFields) => {
            (StatusCode::BAD_REQUEST, "Missing required fields").into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn send_direct_message(state: &AppState, body: &[u8]) -> Result<Response, RpcError> {
    let event: MessageInserted =
        serde_json::from_slice(body).map_err(|e| RpcError::InvalidBody(e.to_string()))?;
    let Some(record) = event.record else {
        return Ok((StatusCode::BAD_REQUEST, "No record").into_response());
    };
    let direct_messages = state
        .direct_messages
        .as_ref()
        .ok_or_else(|| RpcError::Configuration("push notifications".into()))?;

    let text = match direct_messages.dispatch(record).await {
        Ok(DirectMessageOutcome::Flagged) => "Skipped: flagged",
        Ok(DirectMessageOutcome::NoRecipients) => "No recipients found",
        Ok(DirectMessageOutcome::NoTokens) => "No FCM tokens found",
        Ok(DirectMessageOutcome::Sent { response, .. }) => {
            state.metrics.push_sent.inc();
            return Ok(Json(json!({ "success": true, "fcmResult": response })).into_response());
        }
        Err(NotifyError::MissingFields) => return Err(RpcError::MissingFields),
        Err(e) => {
            state.metrics.push_failures.inc();
            return Err(e.into());
        }
    };
    Ok((StatusCode::OK, text).into_response())
}

// ── Account provisioning ─────────────────────────────────────────────────

fn caller(state: &AppState, headers: &HeaderMap) -> Result<UserId, RpcError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| RpcError::Authentication("Unauthorized".into()))?;
    state.authenticator.authenticate(authorization)
}

fn parse_body<T: serde::de::DeserializeOwned + Default>(body: &[u8]) -> Result<T, RpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| RpcError::InvalidBody(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
struct ProfileRequest {
    #[serde(default, alias = "displayName")]
    display_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// Create the caller's profile if missing and apply optional naming.
pub async fn provision_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RpcError> {
    let user_id = caller(&state, &headers)?;
    let request: ProfileRequest = parse_body(&body)?;
    let profile = state.accounts.provision(
        &user_id,
        ProfileChange::names(request.display_name, request.username),
    )?;
    Ok(Json(json!(profile)))
}

#[derive(Debug, Default, Deserialize)]
struct DeviceRequest {
    #[serde(default)]
    token: String,
}

pub async fn register_device(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RpcError> {
    let user_id = caller(&state, &headers)?;
    let request: DeviceRequest = parse_body(&body)?;
    state.accounts.register_device(&user_id, &request.token)?;
    Ok(Json(json!({ "registered": true })))
}

pub async fn remove_device(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RpcError> {
    let user_id = caller(&state, &headers)?;
    let request: DeviceRequest = parse_body(&body)?;
    state.accounts.remove_device(&user_id, &request.token)?;
    Ok(Json(json!({ "removed": true })))
}

#[derive(Debug, Default, Deserialize)]
struct ThreadRequest {
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    participants: Vec<String>,
}

/// Record the caller and the listed users as members of a thread.
pub async fn join_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RpcError> {
    let user_id = caller(&state, &headers)?;
    let request: ThreadRequest = parse_body(&body)?;
    let thread_id = request
        .thread_id
        .and_then(|t| ThreadId::new(t).ok())
        .ok_or(RpcError::MissingFields)?;

    let mut members = vec![user_id];
    for raw in request.participants {
        let member = UserId::new(raw).map_err(|_| RpcError::MissingFields)?;
        if !members.contains(&member) {
            members.push(member);
        }
    }
    state.accounts.join_thread(&thread_id, &members)?;
    Ok(Json(json!({ "thread_id": thread_id.as_str(), "participants": members.len() })))
}

// ── Operational ──────────────────────────────────────────────────────────

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.encode(),
    )
}
