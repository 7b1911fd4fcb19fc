//! API integration tests.
//!
//! Tests verify:
//! - User registration, listing, lookup, update and deletion
//! - Response envelopes and status codes
//! - Routing of trailing slashes, unknown paths and wrong methods
//! - Daily history and ranking endpoints

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use super::test_utils::{login, register, send, send_request, signed_up, test_app, PASSWORD};

// =============================================================================
// Registration and Login
// =============================================================================

#[tokio::test]
async fn test_register_returns_public_view() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/",
        None,
        Some(json!({"email": "ada@example.com", "name": "Ada", "password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(
        body["data"],
        json!({"iduser": 1, "email": "ada@example.com", "name": "Ada", "drinkCounter": 0})
    );
    assert!(body["data"].get("password").is_none());
}

#[tokio::test]
async fn test_register_without_trailing_slash() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/users",
        None,
        Some(json!({"email": "ada@example.com", "name": "Ada", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = test_app();
    register(&app.router, "ada@example.com", "Ada").await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/",
        None,
        Some(json!({"email": "ada@example.com", "name": "Another", "password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/",
        None,
        Some(json!({"email": "ada@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Field 'name' is required");
    assert_eq!(body["error"], "validation_error");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/",
        None,
        Some(json!({"email": "nope", "name": "Ada", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");
}

#[tokio::test]
async fn test_invalid_json_body() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/users/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let (status, body) = send_request(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON format");
}

#[tokio::test]
async fn test_login_returns_token_and_counter() {
    let app = test_app();
    let id = register(&app.router, "ada@example.com", "Ada").await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "ada@example.com", "password": PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["iduser"], id);
    assert_eq!(body["data"]["name"], "Ada");
    assert_eq!(body["data"]["drinkCounter"], 0);
    assert_eq!(body["data"]["token"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = test_app();
    register(&app.router, "ada@example.com", "Ada").await;

    let (status, wrong) = send(
        &app.router,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "not-it"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = send(
        &app.router,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["message"], unknown["message"]);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_list_users_paginates_newest_first() {
    let app = test_app();
    let (_, token) = signed_up(&app.router, "a@example.com", "Amy").await;
    register(&app.router, "b@example.com", "Bob").await;
    register(&app.router, "c@example.com", "Cid").await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/users/?page=1&limit=2",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert_eq!(
        body["data"]["pagination"],
        json!({"page": 1, "limit": 2, "total": 3, "pages": 2})
    );
}

#[tokio::test]
async fn test_list_users_rejects_bad_paging() {
    let app = test_app();
    let (_, token) = signed_up(&app.router, "a@example.com", "Amy").await;

    for uri in ["/users/?limit=0", "/users/?limit=101", "/users/?page=0", "/users/?page=x"] {
        let (status, _) = send(&app.router, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_get_user() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/users/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");

    let (status, body) = send(&app.router, Method::GET, "/users/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = send(&app.router, Method::GET, "/users/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_own_account() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &format!("/users/{}", id),
        Some(&token),
        Some(json!({"name": "Ada Lovelace"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["data"]["name"], "Ada Lovelace");

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &format!("/users/{}", id),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one field must be provided for update");
}

#[tokio::test]
async fn test_update_and_delete_other_account_forbidden() {
    let app = test_app();
    let (_, token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    let bob = register(&app.router, "bob@example.com", "Bob").await;

    let (status, body) = send(
        &app.router,
        Method::PUT,
        &format!("/users/{}", bob),
        Some(&token),
        Some(json!({"name": "Hacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send(
        &app.router,
        Method::DELETE,
        &format!("/users/{}", bob),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Forbidden even when the target does not exist
    let (status, _) = send(&app.router, Method::DELETE, "/users/424242", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_other_account_forbidden_whatever_the_body() {
    let app = test_app();
    let (ada, token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    let bob = register(&app.router, "bob@example.com", "Bob").await;

    for raw in ["not json", r#"{"name": 5}"#, ""] {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/users/{}", bob))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();

        let (status, body) = send_request(&app.router, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{:?}", raw);
        assert_eq!(body["message"], "You can only update your own account");
    }

    // The same bodies on the caller's own account are plain validation errors
    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/users/{}", ada))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send_request(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON format");
}

#[tokio::test]
async fn test_delete_own_account() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    let (_, other) = signed_up(&app.router, "bob@example.com", "Bob").await;

    let (status, body) = send(
        &app.router,
        Method::DELETE,
        &format!("/users/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = send(
        &app.router,
        Method::GET,
        &format!("/users/{}", id),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app.router, Method::GET, "/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_method_mismatch_is_not_found() {
    let app = test_app();
    let (status, _) = send(&app.router, Method::GET, "/login", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, Method::PATCH, "/users/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trailing_slash_on_parameterized_route() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;

    let (status, _) = send(
        &app.router,
        Method::GET,
        &format!("/users/{}/", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/users/1")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send_request(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// History and Ranking
// =============================================================================

#[tokio::test]
async fn test_daily_history_endpoint() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    for _ in 0..3 {
        send(
            &app.router,
            Method::POST,
            &format!("/users/{}/drink", id),
            Some(&token),
            None,
        )
        .await;
    }

    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/users/{}/drinks/daily", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], id);
    let history = body["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["total"], 3);

    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/users/{}/drinks/daily?from=2024-02-10&to=2024-02-01", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "From date must be before to date");
}

#[tokio::test]
async fn test_ranking_endpoint() {
    let app = test_app();
    let (ada, ada_token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    let (bob, bob_token) = signed_up(&app.router, "bob@example.com", "Bob").await;

    for _ in 0..2 {
        send(
            &app.router,
            Method::POST,
            &format!("/users/{}/drink", bob),
            Some(&bob_token),
            None,
        )
        .await;
    }
    send(
        &app.router,
        Method::POST,
        &format!("/users/{}/drink", ada),
        Some(&ada_token),
        None,
    )
    .await;

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/drinks/ranking?days=7&limit=5",
        Some(&ada_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Drink ranking retrieved successfully");
    assert_eq!(body["data"]["ranking"][0]["user_id"], bob);
    assert_eq!(body["data"]["ranking"][0]["total_drinks"], 2);
    assert_eq!(body["data"]["ranking"][1]["name"], "Ada");
    assert_eq!(
        body["data"]["parameters"],
        json!({"date": null, "days": 7, "limit": 5})
    );

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/drinks/ranking?date=2024-01-01&days=3",
        Some(&ada_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot specify both date and days parameters");
}

#[tokio::test]
async fn test_login_reflects_counter() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    send(
        &app.router,
        Method::POST,
        &format!("/users/{}/drink", id),
        Some(&token),
        None,
    )
    .await;

    let fresh = login(&app.router, "ada@example.com").await;
    let (_, body) = send(
        &app.router,
        Method::GET,
        &format!("/users/{}", id),
        Some(&fresh),
        None,
    )
    .await;
    assert_eq!(body["data"]["drinkCounter"], 1);
}
