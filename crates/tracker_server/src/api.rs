//! Transport-neutral endpoint layer.
//!
//! # Responsibility
//! - Map a resolved endpoint + method onto handler calls.
//! - Translate handler outcomes into status codes and response bodies.
//!
//! # Invariants
//! - Store failures never leak details into response bodies.
//! - Authentication runs before any handler is invoked.

use crate::auth::{resolve_identity, AuthError};
use axum::http::{Method, StatusCode};
use log::error;
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use tracker_core::{
    Action, EntityId, HandlerError, LinkBuilder, Operation, RequestContext, Resource,
    SnippetHandler,
};

pub const NOT_FOUND_DETAIL: &str = "Not found.";
pub const SERVER_ERROR_DETAIL: &str = "A server error occurred.";

/// Addressable target of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Collection(Resource),
    Item(Resource, EntityId),
    Highlight(EntityId),
}

impl Endpoint {
    pub fn collection(collection: &str) -> Option<Self> {
        Resource::from_collection(collection).map(Self::Collection)
    }

    pub fn item(collection: &str, id: &str) -> Option<Self> {
        let resource = Resource::from_collection(collection)?;
        Some(Self::Item(resource, parse_id(id)?))
    }

    /// Only snippets expose the highlight action.
    pub fn highlight(collection: &str, id: &str) -> Option<Self> {
        match Resource::from_collection(collection)? {
            Resource::Snippets => Some(Self::Highlight(parse_id(id)?)),
            _ => None,
        }
    }
}

fn parse_id(value: &str) -> Option<EntityId> {
    value.parse::<EntityId>().ok().filter(|id| *id > 0)
}

/// One decoded request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Html(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    pub fn detail(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::json(status, json!({ "detail": detail.into() }))
    }

    pub fn not_found() -> Self {
        Self::detail(StatusCode::NOT_FOUND, NOT_FOUND_DETAIL)
    }

    /// JSON body, if any.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Runs `request` against the store.
pub fn handle(conn: &Connection, links: &LinkBuilder, request: &ApiRequest) -> ApiResponse {
    let identity = match resolve_identity(conn, request.authorization.as_deref()) {
        Ok(identity) => identity,
        Err(AuthError::Store(err)) => {
            error!("event=api_auth module=api status=error error={err}");
            return ApiResponse::detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_DETAIL);
        }
        Err(err) => return ApiResponse::detail(StatusCode::UNAUTHORIZED, err.to_string()),
    };
    let ctx = RequestContext::new(identity, conn, links);

    match request.endpoint {
        Endpoint::Highlight(id) => match request.method {
            Method::GET => match SnippetHandler.highlight(&ctx, id) {
                Ok(document) => ApiResponse {
                    status: StatusCode::OK,
                    body: ResponseBody::Html(document),
                },
                Err(err) => error_response(err),
            },
            _ => method_not_allowed(&request.method),
        },
        Endpoint::Collection(resource) => {
            let payload;
            let operation = match request.method {
                Method::GET => Operation::List,
                Method::POST => {
                    payload = match parse_body(&request.body) {
                        Ok(value) => value,
                        Err(response) => return response,
                    };
                    Operation::Create(&payload)
                }
                _ => return method_not_allowed(&request.method),
            };
            run(resource, &ctx, operation)
        }
        Endpoint::Item(resource, id) => {
            let payload;
            let operation = match request.method {
                Method::GET => Operation::Get(id),
                Method::DELETE => Operation::Delete(id),
                Method::PUT | Method::PATCH => {
                    payload = match parse_body(&request.body) {
                        Ok(value) => value,
                        Err(response) => return response,
                    };
                    Operation::Update {
                        id,
                        payload: &payload,
                        partial: request.method == Method::PATCH,
                    }
                }
                _ => return method_not_allowed(&request.method),
            };
            run(resource, &ctx, operation)
        }
    }
}

/// Collection index served at `/`.
pub fn api_root(links: &LinkBuilder) -> ApiResponse {
    let index: Map<String, Value> = Resource::ALL
        .into_iter()
        .map(|resource| {
            (
                resource.collection().to_string(),
                Value::String(links.collection(resource.collection())),
            )
        })
        .collect();
    ApiResponse::json(StatusCode::OK, Value::Object(index))
}

pub fn health() -> ApiResponse {
    ApiResponse::json(
        StatusCode::OK,
        json!({ "status": "ok", "version": tracker_core::core_version() }),
    )
}

fn run(resource: Resource, ctx: &RequestContext<'_>, operation: Operation<'_>) -> ApiResponse {
    let status = match operation.action() {
        Action::Create => StatusCode::CREATED,
        Action::Delete => StatusCode::NO_CONTENT,
        _ => StatusCode::OK,
    };
    match resource.dispatch(ctx, operation) {
        Ok(Some(view)) => ApiResponse::json(status, view),
        Ok(None) => ApiResponse {
            status,
            body: ResponseBody::Empty,
        },
        Err(err) => error_response(err),
    }
}

/// An empty body reads as an empty object so missing fields are reported.
fn parse_body(body: &[u8]) -> Result<Value, ApiResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|err| {
        ApiResponse::detail(StatusCode::BAD_REQUEST, format!("JSON parse error - {err}"))
    })
}

fn error_response(err: HandlerError) -> ApiResponse {
    match err {
        HandlerError::Validation(errors) => match serde_json::to_value(&errors) {
            Ok(body) => ApiResponse::json(StatusCode::BAD_REQUEST, body),
            Err(encode_err) => {
                error!("event=api_error module=api status=error code=encode_failed error={encode_err}");
                ApiResponse::detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_DETAIL)
            }
        },
        HandlerError::NotFound { .. } => ApiResponse::not_found(),
        HandlerError::Denied(denial) => {
            let status = match denial {
                tracker_core::Denial::NotAuthenticated => StatusCode::UNAUTHORIZED,
                tracker_core::Denial::PermissionDenied => StatusCode::FORBIDDEN,
            };
            ApiResponse::detail(status, denial.to_string())
        }
        other => {
            error!(
                "event=api_error module=api status=error code={} error={other}",
                other.code()
            );
            ApiResponse::detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_DETAIL)
        }
    }
}

fn method_not_allowed(method: &Method) -> ApiResponse {
    ApiResponse::detail(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method \"{method}\" not allowed."),
    )
}
