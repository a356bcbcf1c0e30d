//! Handler tests for the users domain.
//!
//! The router runs against the in-memory repository and publisher, so these cover
//! status codes, bodies and published events without any external service.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use axum_helpers::ErrorResponse;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt; // For oneshot()

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> (Router, InMemoryUserEventPublisher) {
    let publisher = InMemoryUserEventPublisher::new();
    let service = UserService::new(InMemoryUserRepository::new(), publisher.clone());
    (handlers::router(service), publisher)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &Router, username: &str, email: &str) -> UserResponse {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/",
            json!({"username": username, "email": email, "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_user_returns_201_and_publishes() {
    let (app, publisher) = app();

    let user = create(&app, "alice", "alice@example.com").await;

    assert!(user.id > 0);
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(publisher.events().await, vec![UserEvent::created("alice@example.com")]);
}

#[tokio::test]
async fn test_create_user_response_has_no_password() {
    let (app, _) = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({"username": "bob", "email": "bob@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();

    let body: serde_json::Value = json_body(response.into_body()).await;
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_duplicate_email_returns_400() {
    let (app, publisher) = app();
    create(&app, "alice", "alice@example.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({"username": "alice2", "email": "alice@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User with this email already exists");
    assert_eq!(publisher.events().await.len(), 1);
}

#[tokio::test]
async fn test_create_invalid_email_returns_400() {
    let (app, _) = app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/",
            json!({"username": "x", "email": "not-an-email", "password": "password123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_user_by_id() {
    let (app, _) = app();
    let created = create(&app, "carol", "carol@example.com").await;

    let response = app
        .oneshot(empty_request("GET", &format!("/{}", created.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user, created);
}

#[tokio::test]
async fn test_get_missing_user_returns_404() {
    let (app, _) = app();

    let response = app.oneshot(empty_request("GET", "/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User not found with ID: 999");
}

#[tokio::test]
async fn test_get_invalid_id_returns_404() {
    let (app, _) = app();

    let response = app.oneshot(empty_request("GET", "/0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User ID must be greater than 0");
}

#[tokio::test]
async fn test_get_user_by_email() {
    let (app, _) = app();
    create(&app, "dave", "dave@example.com").await;

    let found = app
        .clone()
        .oneshot(empty_request("GET", "/email/dave@example.com"))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);

    let missing = app
        .oneshot(empty_request("GET", "/email/nobody@example.com"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exists_endpoint() {
    let (app, _) = app();
    create(&app, "erin", "erin@example.com").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/exists?email=erin@example.com"))
        .await
        .unwrap();
    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"exists": true}));

    let response = app.oneshot(empty_request("GET", "/exists")).await.unwrap();
    let body: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"exists": false}));
}

#[tokio::test]
async fn test_list_users_in_id_order() {
    let (app, _) = app();
    create(&app, "a", "a@example.com").await;
    create(&app, "b", "b@example.com").await;

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(
        users.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[tokio::test]
async fn test_update_applies_non_empty_fields() {
    let (app, _) = app();
    let created = create(&app, "frank", "frank@example.com").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", created.id),
            json!({"username": "", "email": "francis@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.username, "frank");
    assert_eq!(user.email, "francis@example.com");
}

#[tokio::test]
async fn test_update_to_taken_email_returns_400() {
    let (app, _) = app();
    let first = create(&app, "g1", "g1@example.com").await;
    create(&app, "g2", "g2@example.com").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", first.id),
            json!({"email": "g2@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_user_returns_404() {
    let (app, _) = app();

    let response = app
        .oneshot(json_request("PUT", "/42", json!({"username": "ghost"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_returns_204_and_publishes() {
    let (app, publisher) = app();
    let created = create(&app, "heidi", "heidi@example.com").await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        publisher.events().await,
        vec![
            UserEvent::created("heidi@example.com"),
            UserEvent::deleted("heidi@example.com"),
        ]
    );

    let again = app
        .oneshot(empty_request("DELETE", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
