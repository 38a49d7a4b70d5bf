//! axum routing over the endpoint layer.

use crate::api::{self, ApiRequest, ApiResponse, Endpoint, ResponseBody, SERVER_ERROR_DETAIL};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use log::{error, info};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracker_core::LinkBuilder;

/// Shared state: the single store connection and the link builder.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Connection>>,
    links: Arc<LinkBuilder>,
}

impl AppState {
    pub fn new(conn: Connection, links: LinkBuilder) -> Self {
        Self {
            store: Arc::new(Mutex::new(conn)),
            links: Arc::new(links),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .route("/health", get(health))
        .route("/{collection}", any(collection))
        .route("/{collection}/{id}", any(item))
        .route("/{collection}/{id}/highlight", any(highlight))
        .with_state(state)
}

async fn api_root(State(state): State<AppState>) -> ApiResponse {
    api::api_root(&state.links)
}

async fn health() -> ApiResponse {
    api::health()
}

async fn collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResponse {
    let endpoint = Endpoint::collection(&collection);
    dispatch(state, endpoint, method, &headers, body).await
}

async fn item(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResponse {
    let endpoint = Endpoint::item(&collection, &id);
    dispatch(state, endpoint, method, &headers, body).await
}

async fn highlight(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResponse {
    let endpoint = Endpoint::highlight(&collection, &id);
    dispatch(state, endpoint, method, &headers, body).await
}

/// Runs the blocking store work off the async executor.
async fn dispatch(
    state: AppState,
    endpoint: Option<Endpoint>,
    method: Method,
    headers: &HeaderMap,
    body: Bytes,
) -> ApiResponse {
    let Some(endpoint) = endpoint else {
        return ApiResponse::not_found();
    };
    let started_at = Instant::now();
    let request = ApiRequest {
        method,
        endpoint,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    };
    let method_label = request.method.clone();

    let joined = tokio::task::spawn_blocking(move || {
        let conn = match state.store.lock() {
            Ok(conn) => conn,
            Err(_) => {
                error!("event=http_request module=server status=error reason=store_lock_poisoned");
                return ApiResponse::detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_DETAIL);
            }
        };
        api::handle(&conn, &state.links, &request)
    })
    .await;

    let response = joined.unwrap_or_else(|err| {
        error!("event=http_request module=server status=error reason=join_failed error={err}");
        ApiResponse::detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_DETAIL)
    });
    info!(
        "event=http_request module=server status={} method={} endpoint={:?} code={} duration_ms={}",
        log_outcome(response.status),
        method_label,
        endpoint,
        response.status.as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

/// `status=` value of the request log line.
fn log_outcome(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "denied",
        status if status.is_client_error() || status.is_server_error() => "error",
        _ => "ok",
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            ResponseBody::Json(value) => (self.status, Json(value)).into_response(),
            ResponseBody::Html(document) => (self.status, Html(document)).into_response(),
            ResponseBody::Empty => self.status.into_response(),
        };
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Token"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::log_outcome;
    use axum::http::StatusCode;

    #[test]
    fn request_log_outcome_follows_status_class() {
        assert_eq!(log_outcome(StatusCode::OK), "ok");
        assert_eq!(log_outcome(StatusCode::NO_CONTENT), "ok");
        assert_eq!(log_outcome(StatusCode::UNAUTHORIZED), "denied");
        assert_eq!(log_outcome(StatusCode::FORBIDDEN), "denied");
        assert_eq!(log_outcome(StatusCode::BAD_REQUEST), "error");
        assert_eq!(log_outcome(StatusCode::INTERNAL_SERVER_ERROR), "error");
    }
}
