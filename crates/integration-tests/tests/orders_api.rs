//! End-to-end checkout and order history over HTTP with a real cookie jar.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use pawcase_integration_tests::{TestContext, json_body, unique_email};

async fn register(ctx: &TestContext, client: &Client, email: &str) {
    let response = client
        .post(ctx.url("/api/auth/register"))
        .json(&json!({ "email": email, "password": "correct-horse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

fn cart(items: Value) -> Value {
    json!({
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "555-0100",
        "address": "1 Analytical Way",
        "items": items,
    })
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await.unwrap();
    let response = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let ready = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let ctx = TestContext::new().await.unwrap();
    let response = ctx
        .client
        .post(ctx.url("/api/orders"))
        .json(&cart(json!([{ "name": "Clear Case", "price": 15 }])))
        .send()
        .await
        .unwrap();
    let (status, body) = json_body(response).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_mixed_checkout_then_history() {
    let ctx = TestContext::new().await.unwrap();
    register(&ctx, &ctx.client, &unique_email("ada")).await;

    let response = ctx
        .client
        .post(ctx.url("/api/orders"))
        .json(&cart(json!([
            { "name": "Clear Case", "price": 15, "quantity": 2 },
            { "name": "Mochi Portrait", "price": 30, "category": "pet_asset" },
        ])))
        .send()
        .await
        .unwrap();
    let (status, created) = json_body(response).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let created = created.as_array().unwrap().clone();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["category"], "pet_asset");
    assert_eq!(created[1]["category"], "phone_case");
    assert_eq!(created[1]["total"].as_f64(), Some(30.0));

    let response = ctx.client.get(ctx.url("/api/orders/mine")).send().await.unwrap();
    let (status, mine) = json_body(response).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine[0]["id"].as_i64() > mine[1]["id"].as_i64());
}

#[tokio::test]
async fn test_history_is_per_user() {
    let ctx = TestContext::new().await.unwrap();
    let other = TestContext::client().unwrap();
    register(&ctx, &ctx.client, &unique_email("ada")).await;
    register(&ctx, &other, &unique_email("grace")).await;

    let response = other
        .post(ctx.url("/api/orders"))
        .json(&cart(json!([{ "name": "Clear Case", "price": 15 }])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx.client.get(ctx.url("/api/orders/mine")).send().await.unwrap();
    let (_, mine) = json_body(response).await.unwrap();
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_checkout_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    register(&ctx, &ctx.client, &unique_email("ada")).await;

    let mut body = cart(json!([{ "name": "Clear Case", "price": 15 }]));
    body["phone"] = json!("");
    let response = ctx
        .client
        .post(ctx.url("/api/orders"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.client.get(ctx.url("/api/orders/mine")).send().await.unwrap();
    let (_, mine) = json_body(response).await.unwrap();
    assert!(mine.as_array().unwrap().is_empty());
}
