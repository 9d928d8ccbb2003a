use crate::aggregator::aggregate;
use crate::auth::AuthStatus;
use crate::deleter::{parse_message_ids, DeletionErrorKind, DeletionReport};
use crate::error::ServiceError;
use crate::state::AppState;
use crate::types::SenderGroup;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

struct FailureText {
    expired: &'static str,
    forbidden: &'static str,
    failed: &'static str,
}

const LISTING_TEXT: FailureText = FailureText {
    expired: "Authentication expired. Please re-authorize the application.",
    forbidden: "Insufficient permissions. Please re-authorize with full Gmail access.",
    failed: "Failed to fetch emails. Please try again.",
};

const DELETION_TEXT: FailureText = FailureText {
    expired: "Authentication expired. Please re-authorize the application.",
    forbidden: "Insufficient permissions to delete emails. Please re-authorize the application with full Gmail access.",
    failed: "Failed to delete emails. Please try again.",
};

// --- Error Handling ---
#[derive(Debug)]
pub enum ApiError {
    Exchange(ServiceError),
    Listing(ServiceError),
    Deletion(ServiceError),
    PartialDeletion(DeletionReport),
}

fn reply(status: StatusCode, message: &str, needs_reauth: bool) -> Response {
    let body = if needs_reauth {
        json!({ "error": message, "needsReauth": true })
    } else {
        json!({ "error": message })
    };
    (status, Json(body)).into_response()
}

fn service_reply(e: ServiceError, text: &FailureText) -> Response {
    match e {
        ServiceError::Validation(msg) => reply(StatusCode::BAD_REQUEST, &msg, false),
        ServiceError::Auth(detail) => {
            warn!(%detail, "request rejected: credential expired");
            reply(StatusCode::UNAUTHORIZED, text.expired, true)
        }
        ServiceError::Permission(detail) => {
            warn!(%detail, "request rejected: insufficient permissions");
            reply(StatusCode::FORBIDDEN, text.forbidden, true)
        }
        ServiceError::Remote(detail) => {
            error!(%detail, "remote provider failure");
            reply(StatusCode::INTERNAL_SERVER_ERROR, text.failed, false)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Exchange(ServiceError::Validation(msg)) => {
                reply(StatusCode::BAD_REQUEST, &msg, false)
            }
            ApiError::Exchange(e) => {
                error!(error = %e, "error during authentication");
                reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication failed",
                    false,
                )
            }
            ApiError::Listing(e) => service_reply(e, &LISTING_TEXT),
            ApiError::Deletion(e) => service_reply(e, &DELETION_TEXT),
            ApiError::PartialDeletion(report) => {
                let (status, message, needs_reauth) =
                    if report.has_failure(DeletionErrorKind::AuthExpired) {
                        (StatusCode::UNAUTHORIZED, DELETION_TEXT.expired, true)
                    } else if report.has_failure(DeletionErrorKind::Forbidden) {
                        (StatusCode::FORBIDDEN, DELETION_TEXT.forbidden, true)
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, DELETION_TEXT.failed, false)
                    };
                let mut body = json!({
                    "error": message,
                    "requested": report.requested,
                    "succeeded": report.succeeded,
                    "results": report.outcomes,
                });
                if needs_reauth {
                    body["needsReauth"] = Value::Bool(true);
                }
                (status, Json(body)).into_response()
            }
        }
    }
}

// --- Request Types ---
#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
}

// --- Handlers ---
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "MailPurge Backend API is running",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn auth_url_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "authUrl": state.auth.build_authorization_url() }))
}

// First half of the relay: show the code so the user can paste it into the client
async fn callback_page_handler(Query(query): Query<CallbackQuery>) -> Response {
    match query.code.filter(|c| !c.is_empty()) {
        Some(code) => Html(callback_page(&code)).into_response(),
        None => (StatusCode::BAD_REQUEST, "Authorization code not found").into_response(),
    }
}

async fn exchange_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        ApiError::Exchange(ServiceError::Validation(e.body_text()))
    })?;
    let code = body.get("code").and_then(Value::as_str).unwrap_or_default();

    state
        .auth
        .exchange_code(code)
        .await
        .map_err(ApiError::Exchange)?;
    Ok(Json(json!({
        "success": true,
        "message": "Authentication successful",
    })))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<AuthStatus> {
    Json(state.auth.status().await)
}

async fn senders_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SenderGroup>>, ApiError> {
    let listed = match state.auth.refresh_if_expired().await {
        Ok(()) => state.lister.list_all(state.list_cap).await,
        Err(e) => Err(e),
    };
    let records = match listed {
        Ok(records) => records,
        Err(e) => {
            state.auth.observe_remote_error(&e).await;
            return Err(ApiError::Listing(e));
        }
    };

    let groups = aggregate(records);
    info!(senders = groups.len(), "aggregated senders");
    Ok(Json(groups))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload.map_err(|e| {
        ApiError::Deletion(ServiceError::Validation(e.body_text()))
    })?;
    let ids = parse_message_ids(body.get("messageIds")).map_err(ApiError::Deletion)?;

    if let Err(e) = state.auth.refresh_if_expired().await {
        state.auth.observe_remote_error(&e).await;
        return Err(ApiError::Deletion(e));
    }
    let report = match state.deleter.delete_many(&ids).await {
        Ok(report) => report,
        Err(e) => {
            state.auth.observe_remote_error(&e).await;
            return Err(ApiError::Deletion(e));
        }
    };

    if report.all_succeeded() {
        return Ok(Json(json!({
            "success": true,
            "message": format!("Successfully deleted {} emails", report.succeeded),
        })));
    }
    if report.has_failure(DeletionErrorKind::AuthExpired) {
        state.auth.invalidate().await;
    }
    Err(ApiError::PartialDeletion(report))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn callback_page(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>MailPurge - Authorization Success</title></head>
  <body style="font-family: Arial, sans-serif; text-align: center; padding: 50px; background: #0a0a0b; color: white;">
    <h1 style="color: #22c55e;">Authorization Successful</h1>
    <p>Copy the code below and paste it into the MailPurge application.</p>
    <pre id="authCode" style="background: #2a2a2e; padding: 15px; word-break: break-all; white-space: pre-wrap;">{}</pre>
  </body>
</html>"#,
        escape_html(code)
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/auth", get(auth_url_handler))
        .route(
            "/auth/callback",
            get(callback_page_handler).post(exchange_handler),
        )
        .route("/auth/status", get(status_handler))
        .route("/emails/senders", get(senders_handler))
        .route("/emails/delete", post(delete_handler))
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    allowed_origins: &[String],
) -> std::io::Result<()> {
    let app = router(state, allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MailPurge server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutting down gracefully");
        })
        .await
}
