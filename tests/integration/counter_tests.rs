//! Drink counter integration tests.
//!
//! Tests verify:
//! - Each increment adds exactly one drink and one to the counter
//! - Concurrent increments are never lost
//! - A storage failure mid-increment leaves no trace
//! - Incrementing a missing user is a 404 with no side effects

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::test_utils::{failing_update_app, login, register, send, signed_up, test_app};

#[tokio::test]
async fn test_increment_returns_updated_user() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;

    for expected in 1..=3 {
        let (status, body) = send(
            &app.router,
            Method::POST,
            &format!("/users/{}/drink", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Drink counter incremented successfully");
        assert_eq!(body["data"]["drinkCounter"], expected);
        assert_eq!(body["data"]["iduser"], id);
    }

    let session = app.db.session().await;
    assert_eq!(session.drink_count_by_user(id), 3);
    assert_eq!(session.user(id).unwrap().drink_counter, 3);
}

#[tokio::test]
async fn test_concurrent_increments_all_counted() {
    let app = test_app();
    let (id, token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    const N: usize = 40;

    let mut tasks = Vec::with_capacity(N);
    for _ in 0..N {
        let router = app.router.clone();
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            send(
                &router,
                Method::POST,
                &format!("/users/{}/drink", id),
                Some(&token),
                None,
            )
            .await
            .0
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    let session = app.db.session().await;
    assert_eq!(session.user(id).unwrap().drink_counter, N as i64);
    assert_eq!(session.drink_count_by_user(id), N as u64);
}

#[tokio::test]
async fn test_failed_update_rolls_back_drink() {
    let (app, users) = failing_update_app();
    let id = register(&app.router, "ada@example.com", "Ada").await;
    let token = login(&app.router, "ada@example.com").await;

    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/users/{}/drink", id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(users.update_attempts(), 1);

    let session = app.db.session().await;
    assert_eq!(session.drink_count_by_user(id), 0);
    assert_eq!(session.user(id).unwrap().drink_counter, 0);
    assert!(!session.in_transaction());
}

#[tokio::test]
async fn test_store_usable_after_failed_increment() {
    let (app, _) = failing_update_app();
    let id = register(&app.router, "ada@example.com", "Ada").await;
    let token = login(&app.router, "ada@example.com").await;

    send(
        &app.router,
        Method::POST,
        &format!("/users/{}/drink", id),
        Some(&token),
        None,
    )
    .await;

    // Later requests are unaffected by the rolled-back transaction
    let (status, body) = send(&app.router, Method::GET, "/drinks/ranking", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ranking"][0]["total_drinks"], 0);
}

#[tokio::test]
async fn test_increment_missing_user() {
    let app = test_app();
    let (_, token) = signed_up(&app.router, "ada@example.com", "Ada").await;

    let (status, body) = send(&app.router, Method::POST, "/users/999/drink", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let session = app.db.session().await;
    assert_eq!(session.drink_count_by_user(999), 0);
}

#[tokio::test]
async fn test_counter_matches_history_after_mixed_traffic() {
    let app = test_app();
    let (ada, ada_token) = signed_up(&app.router, "ada@example.com", "Ada").await;
    let (bob, bob_token) = signed_up(&app.router, "bob@example.com", "Bob").await;

    for (id, token, times) in [(ada, &ada_token, 4), (bob, &bob_token, 2)] {
        for _ in 0..times {
            send(
                &app.router,
                Method::POST,
                &format!("/users/{}/drink", id),
                Some(token),
                None,
            )
            .await;
        }
    }

    // An unrelated update must not disturb the counter
    send(
        &app.router,
        Method::PUT,
        &format!("/users/{}", ada),
        Some(&ada_token),
        Some(json!({"name": "Ada L."})),
    )
    .await;

    for (id, token, expected) in [(ada, &ada_token, 4), (bob, &bob_token, 2)] {
        let (_, user) = send(
            &app.router,
            Method::GET,
            &format!("/users/{}", id),
            Some(token),
            None,
        )
        .await;
        let (_, history) = send(
            &app.router,
            Method::GET,
            &format!("/users/{}/drinks/daily", id),
            Some(token),
            None,
        )
        .await;

        let total: i64 = history["data"]["history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|day| day["total"].as_i64().unwrap())
            .sum();
        assert_eq!(user["data"]["drinkCounter"], expected);
        assert_eq!(total, expected);
    }
}
