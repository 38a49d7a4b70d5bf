use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracker_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use tracker_core::{open_db_in_memory, LinkBuilder};
use tracker_server::{build_router, AppState};

fn app() -> (Router, String) {
    let conn = open_db_in_memory().unwrap();
    let token = {
        let repo = SqliteUserRepository::try_new(&conn).unwrap();
        let alice = repo.create_user("alice").unwrap();
        format!("Token {}", repo.issue_token(alice.id).unwrap())
    };
    (build_router(AppState::new(conn, LinkBuilder::default())), token)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, token);
    }
    let body = body.map_or_else(Body::empty, |value| Body::from(value.to_string()));
    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

#[tokio::test]
async fn health_and_root_are_not_taken_for_collections() {
    let (app, _) = app();

    let health = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_body(health).await["status"], "ok");

    let root = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(json_body(root).await["snippets"], "/snippets");
}

#[tokio::test]
async fn unknown_collections_and_bad_ids_are_not_found() {
    let (app, token) = app();

    for uri in [
        "/widgets",
        "/routines/abc",
        "/routines/0",
        "/routines/-3",
        "/routines/1/highlight",
    ] {
        let response = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json_body(response).await, json!({"detail": "Not found."}));
    }
}

#[tokio::test]
async fn unauthorized_responses_carry_token_challenge() {
    let (app, _) = app();

    let anonymous = send(&app, Method::GET, "/routines", None, None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.headers()[header::WWW_AUTHENTICATE], "Token");

    let forged = send(&app, Method::GET, "/snippets", Some("Token nope"), None).await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(forged.headers()[header::WWW_AUTHENTICATE], "Token");
    assert_eq!(json_body(forged).await, json!({"detail": "Invalid token."}));
}

#[tokio::test]
async fn snippet_highlight_is_served_as_html() {
    let (app, token) = app();

    let created = send(
        &app,
        Method::POST,
        "/snippets",
        Some(&token),
        Some(json!({"code": "print('hi')\n", "title": "Greeting"})),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert!(content_type(&created).starts_with("application/json"));
    let id = json_body(created).await["id"].as_i64().unwrap();

    let uri = format!("/snippets/{id}/highlight");
    let highlight = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(highlight.status(), StatusCode::OK);
    assert!(content_type(&highlight).starts_with("text/html"));
    let document = text(highlight).await;
    assert!(document.starts_with("<!DOCTYPE html>"));
    assert!(document.contains("<title>Greeting</title>"));
}

#[tokio::test]
async fn delete_is_empty_and_unsupported_methods_are_rejected() {
    let (app, token) = app();

    let created = send(
        &app,
        Method::POST,
        "/routines",
        Some(&token),
        Some(json!({"title": "Morning"})),
    )
    .await;
    let id = json_body(created).await["id"].as_i64().unwrap();

    let uri = format!("/routines/{id}");
    let deleted = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(text(deleted).await.is_empty());

    let put = send(&app, Method::PUT, "/routines", Some(&token), None).await;
    assert_eq!(put.status(), StatusCode::METHOD_NOT_ALLOWED);
}
