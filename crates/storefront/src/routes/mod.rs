//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                               - Liveness
//! GET    /health/ready                         - Readiness (store reachable)
//!
//! # Orders (requires auth)
//! POST   /api/orders                           - Checkout, split by category
//! GET    /api/orders/mine                      - Caller's orders, newest first
//!
//! # Catalog
//! GET    /api/pet-products                     - Product listing
//! GET    /api/pet-products/{key}               - Product by key
//!
//! # Auth (rate limited)
//! POST   /api/auth/register                    - Create account and log in
//! POST   /api/auth/login                       - Log in
//! POST   /api/auth/logout                      - Log out
//! GET    /api/auth/me                          - Current user
//!
//! # Admin (requires admin)
//! GET    /api/admin/pet-products               - Product listing
//! POST   /api/admin/pet-products               - Create product
//! GET    /api/admin/pet-products/{id}          - Product detail
//! PUT    /api/admin/pet-products/{id}          - Replace product
//! DELETE /api/admin/pet-products/{id}          - Delete product
//! POST   /api/admin/pet-products/{id}/templates - Append templates
//! GET    /api/admin/orders                     - All orders
//! PATCH  /api/admin/orders/{id}/status         - Change order status
//! ```

pub mod admin;
pub mod auth;
pub mod orders;
pub mod products;

use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::config::StorefrontConfig;
use crate::middleware::{auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create))
        .route("/orders/mine", get(orders::mine))
        .route("/pet-products", get(products::index))
        .route("/pet-products/{key}", get(products::show))
        .nest("/auth", auth_routes())
        .nest("/admin", admin::routes())
}

/// Build the complete application with all middleware.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let max_body_bytes = state.config().max_body_bytes;
    let cors = cors_layer(state.config());

    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(sessions)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        );

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

fn cors_layer(config: &StorefrontConfig) -> Option<CorsLayer> {
    let origin = config.allowed_origin.as_deref()?;
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring invalid PAWCASE_ALLOWED_ORIGIN");
            None
        }
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.stores().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU8, Ordering};

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use pawcase_core::Email;

    use super::*;
    use crate::db::memory::testing::FailNthInsert;
    use crate::db::{MemoryStore, OrderStore, Stores, UserStore};
    use crate::middleware::memory_session_layer;

    struct TestApp {
        router: Router,
        store: MemoryStore,
        next_ip: AtomicU8,
    }

    struct Reply {
        status: StatusCode,
        cookie: Option<String>,
        body: Value,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_config(StorefrontConfig::in_memory(), |stores| stores)
        }

        fn with_config(config: StorefrontConfig, customize: impl FnOnce(Stores) -> Stores) -> Self {
            let store = MemoryStore::new();
            let sessions = memory_session_layer(&config);
            let stores = customize(Stores::from_memory(store.clone()));
            Self {
                router: app(AppState::new(config, stores), sessions),
                store,
                next_ip: AtomicU8::new(1),
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<Value>,
        ) -> Reply {
            let ip = format!("10.0.0.{}", self.next_ip.fetch_add(1, Ordering::SeqCst));
            self.send_raw(method, uri, cookie, body.map(|b| b.to_string()), &ip)
                .await
        }

        async fn send_raw(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            body: Option<String>,
            ip: &str,
        ) -> Reply {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header("x-real-ip", ip);
            if let Some(cookie) = cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(str::to_owned);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            Reply {
                status,
                cookie,
                body,
            }
        }

        async fn register(&self, email: &str) -> String {
            let reply = self
                .send(
                    Method::POST,
                    "/api/auth/register",
                    None,
                    Some(json!({ "email": email, "password": "correct-horse" })),
                )
                .await;
            assert_eq!(reply.status, StatusCode::CREATED);
            reply.cookie.unwrap()
        }

        async fn admin(&self) -> String {
            self.register("admin@example.com").await;
            let email = Email::parse("admin@example.com").unwrap();
            self.store.set_admin(&email, true).await.unwrap();
            let reply = self
                .send(
                    Method::POST,
                    "/api/auth/login",
                    None,
                    Some(json!({ "email": "admin@example.com", "password": "correct-horse" })),
                )
                .await;
            assert_eq!(reply.status, StatusCode::OK);
            assert_eq!(reply.body["isAdmin"], json!(true));
            reply.cookie.unwrap()
        }
    }

    fn checkout(items: Value) -> Value {
        json!({
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "address": "1 Analytical Way",
            "total": 1,
            "items": items,
        })
    }

    fn mixed_cart() -> Value {
        checkout(json!([
            { "name": "Clear Case", "price": 15, "quantity": 2 },
            { "name": "Portrait", "price": "30.00", "quantity": 1, "customText": "Mochi" },
            { "name": "Pet Sticker Pack", "price": 4.5 },
        ]))
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = TestApp::new();
        let live = app.send(Method::GET, "/health", None, None).await;
        assert_eq!(live.status, StatusCode::OK);
        let ready = app.send(Method::GET, "/health/ready", None, None).await;
        assert_eq!(ready.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_orders_require_session() {
        let app = TestApp::new();
        let reply = app
            .send(Method::POST, "/api/orders", None, Some(mixed_cart()))
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert!(reply.body["error"].is_string());

        let mine = app.send(Method::GET, "/api/orders/mine", None, None).await;
        assert_eq!(mine.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_checkout_validation_persists_nothing() {
        let app = TestApp::new();
        let cookie = app.register("ada@example.com").await;

        let mut missing_email = mixed_cart();
        missing_email["email"] = json!("   ");
        let mut no_items = mixed_cart();
        no_items.as_object_mut().unwrap().remove("items");

        for body in [
            checkout(json!([])),
            no_items,
            missing_email,
            checkout(json!([{ "name": "Case", "price": -1 }])),
            checkout(json!([{ "name": "Case", "price": 10, "quantity": 0 }])),
            checkout(json!([{ "name": " ", "price": 10 }])),
            checkout(json!([{
                "name": "Case",
                "price": "79228162514264337593543950335",
                "quantity": 2,
            }])),
            checkout(json!([{ "name": "Case", "price": "6000000000", "quantity": 2 }])),
            checkout(json!([{ "name": "Case", "price": "0.005" }])),
        ] {
            let reply = app
                .send(Method::POST, "/api/orders", Some(&cookie), Some(body))
                .await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
            assert!(reply.body["error"].is_string());
        }

        assert!(app.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = TestApp::new();
        let cookie = app.register("ada@example.com").await;
        let reply = app
            .send_raw(
                Method::POST,
                "/api/orders",
                Some(&cookie),
                Some("{ not json".to_owned()),
                "10.1.1.1",
            )
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.body["error"].is_string());
    }

    #[tokio::test]
    async fn test_mixed_cart_creates_two_orders() {
        let app = TestApp::new();
        let cookie = app.register("ada@example.com").await;

        let reply = app
            .send(Method::POST, "/api/orders", Some(&cookie), Some(mixed_cart()))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);

        let orders = reply.body.as_array().unwrap();
        assert_eq!(orders.len(), 2);

        assert_eq!(orders[0]["category"], "pet_asset");
        assert_eq!(orders[0]["items"].as_array().unwrap().len(), 2);
        assert_eq!(orders[0]["total"].as_f64(), Some(34.5));

        assert_eq!(orders[1]["category"], "phone_case");
        assert_eq!(orders[1]["items"].as_array().unwrap().len(), 1);
        assert_eq!(orders[1]["total"].as_f64(), Some(30.0));

        for order in orders {
            assert_eq!(order["fullName"], "Ada Lovelace");
            assert_eq!(order["status"], "pending");
        }
    }

    #[tokio::test]
    async fn test_single_category_cart_creates_one_order() {
        let app = TestApp::new();
        let cookie = app.register("ada@example.com").await;
        let body = checkout(json!([
            { "name": "Clear Case", "price": 15 },
            { "name": "Tagged", "price": 20, "category": "phone_case", "customText": "hi" },
        ]));

        let reply = app
            .send(Method::POST, "/api/orders", Some(&cookie), Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        let orders = reply.body.as_array().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["category"], "phone_case");
        assert_eq!(orders[0]["total"].as_f64(), Some(35.0));
    }

    #[tokio::test]
    async fn test_mine_lists_only_own_orders_newest_first() {
        let app = TestApp::new();
        let ada = app.register("ada@example.com").await;
        let grace = app.register("grace@example.com").await;

        app.send(Method::POST, "/api/orders", Some(&ada), Some(mixed_cart()))
            .await;
        app.send(
            Method::POST,
            "/api/orders",
            Some(&grace),
            Some(checkout(json!([{ "name": "Clear Case", "price": 15 }]))),
        )
        .await;
        app.send(
            Method::POST,
            "/api/orders",
            Some(&ada),
            Some(checkout(json!([{ "name": "Leather Case", "price": 40 }]))),
        )
        .await;

        let mine = app
            .send(Method::GET, "/api/orders/mine", Some(&ada), None)
            .await;
        assert_eq!(mine.status, StatusCode::OK);
        let orders = mine.body.as_array().unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0]["items"][0]["name"], "Leather Case");

        let ids: Vec<i64> = orders.iter().map(|o| o["id"].as_i64().unwrap()).collect();
        assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));

        let user_ids: Vec<&Value> = orders.iter().map(|o| &o["userId"]).collect();
        assert!(user_ids.iter().all(|id| *id == user_ids[0]));
    }

    #[tokio::test]
    async fn test_partial_split_failure_keeps_committed_order() {
        let store = MemoryStore::new();
        let failing = Arc::new(FailNthInsert::new(store.clone(), 2));
        let app = TestApp::with_config(StorefrontConfig::in_memory(), |_| {
            Stores::from_memory(store.clone()).with_orders(failing)
        });
        let cookie = app.register("ada@example.com").await;

        let reply = app
            .send(Method::POST, "/api/orders", Some(&cookie), Some(mixed_cart()))
            .await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body["error"], "Internal server error");

        let committed = store.list_all().await.unwrap();
        assert_eq!(committed.len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_body_is_payload_too_large() {
        let mut config = StorefrontConfig::in_memory();
        config.max_body_bytes = 1024;
        let app = TestApp::with_config(config, |stores| stores);
        let cookie = app.register("ada@example.com").await;

        let body = checkout(json!([{
            "name": "Portrait",
            "price": 30,
            "image": format!("data:image/png;base64,{}", "A".repeat(4096)),
        }]));
        let reply = app
            .send(Method::POST, "/api/orders", Some(&cookie), Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(reply.body["error"].is_string());
    }

    #[tokio::test]
    async fn test_auth_flow() {
        let app = TestApp::new();
        let cookie = app.register("Owner@Example.com").await;

        let me = app.send(Method::GET, "/api/auth/me", Some(&cookie), None).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["email"], "owner@example.com");
        assert_eq!(me.body["isAdmin"], json!(false));

        let duplicate = app
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": "owner@example.com", "password": "something-else" })),
            )
            .await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);

        let wrong = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "owner@example.com", "password": "not-the-one" })),
            )
            .await;
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

        let logout = app
            .send(Method::POST, "/api/auth/logout", Some(&cookie), None)
            .await;
        assert_eq!(logout.status, StatusCode::NO_CONTENT);

        let after = app.send(Method::GET, "/api/auth/me", Some(&cookie), None).await;
        assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let app = TestApp::new();
        for body in [
            json!({ "email": "not-an-email", "password": "long-enough" }),
            json!({ "email": "ok@example.com", "password": "short" }),
        ] {
            let reply = app
                .send(Method::POST, "/api/auth/register", None, Some(body))
                .await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_auth_routes_are_rate_limited() {
        let app = TestApp::new();
        let body = json!({ "email": "ghost@example.com", "password": "whatever-123" }).to_string();

        let mut replies = Vec::new();
        for _ in 0..6 {
            let reply = app
                .send_raw(
                    Method::POST,
                    "/api/auth/login",
                    None,
                    Some(body.clone()),
                    "192.0.2.44",
                )
                .await;
            replies.push(reply);
        }
        assert!(
            replies[..5]
                .iter()
                .all(|r| r.status == StatusCode::UNAUTHORIZED)
        );
        assert_eq!(replies[5].status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(replies[5].body["error"], "Too many requests");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_non_admins() {
        let app = TestApp::new();
        let anonymous = app.send(Method::GET, "/api/admin/orders", None, None).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

        let cookie = app.register("ada@example.com").await;
        let customer = app
            .send(Method::GET, "/api/admin/orders", Some(&cookie), None)
            .await;
        assert_eq!(customer.status, StatusCode::FORBIDDEN);

        let create = app
            .send(
                Method::POST,
                "/api/admin/pet-products",
                Some(&cookie),
                Some(json!({ "name": "Corgi", "category": "dog", "key": "corgi", "price": 30 })),
            )
            .await;
        assert_eq!(create.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_catalog_crud() {
        let app = TestApp::new();
        let admin = app.admin().await;
        let product = json!({
            "name": "Corgi Case",
            "category": "dog",
            "key": "corgi",
            "price": 29.99,
            "images": ["data:image/jpeg;base64,AAAA"],
            "layout": {
                "coverArea": { "x": 10.0, "y": 20.0, "width": 300.0, "height": 400.0 },
                "coverSize": { "width": 320.0, "height": 420.0 }
            }
        });

        let created = app
            .send(
                Method::POST,
                "/api/admin/pet-products",
                Some(&admin),
                Some(product.clone()),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let id = created.body["id"].as_i64().unwrap();
        assert_eq!(created.body["layout"]["coverArea"]["width"], json!(300.0));

        let duplicate = app
            .send(
                Method::POST,
                "/api/admin/pet-products",
                Some(&admin),
                Some(product.clone()),
            )
            .await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);

        let templates = app
            .send(
                Method::POST,
                &format!("/api/admin/pet-products/{id}/templates"),
                Some(&admin),
                Some(json!({ "templates": ["data:image/png;base64,BBBB"] })),
            )
            .await;
        assert_eq!(templates.status, StatusCode::OK);
        assert_eq!(templates.body["templates"].as_array().unwrap().len(), 1);

        let empty = app
            .send(
                Method::POST,
                &format!("/api/admin/pet-products/{id}/templates"),
                Some(&admin),
                Some(json!({ "templates": [] })),
            )
            .await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let public = app
            .send(Method::GET, "/api/pet-products/corgi", None, None)
            .await;
        assert_eq!(public.status, StatusCode::OK);
        assert_eq!(public.body["name"], "Corgi Case");

        let mut renamed = product;
        renamed["name"] = json!("Corgi Case v2");
        let updated = app
            .send(
                Method::PUT,
                &format!("/api/admin/pet-products/{id}"),
                Some(&admin),
                Some(renamed),
            )
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["name"], "Corgi Case v2");

        let deleted = app
            .send(
                Method::DELETE,
                &format!("/api/admin/pet-products/{id}"),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let gone = app
            .send(
                Method::GET,
                &format!("/api/admin/pet-products/{id}"),
                Some(&admin),
                None,
            )
            .await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_order_status_transitions() {
        let app = TestApp::new();
        let customer = app.register("ada@example.com").await;
        let admin = app.admin().await;

        let placed = app
            .send(
                Method::POST,
                "/api/orders",
                Some(&customer),
                Some(checkout(json!([{ "name": "Clear Case", "price": 15 }]))),
            )
            .await;
        let id = placed.body[0]["id"].as_i64().unwrap();
        let uri = format!("/api/admin/orders/{id}/status");

        let processing = app
            .send(
                Method::PATCH,
                &uri,
                Some(&admin),
                Some(json!({ "status": "processing" })),
            )
            .await;
        assert_eq!(processing.status, StatusCode::OK);
        assert_eq!(processing.body["status"], "processing");

        let backwards = app
            .send(
                Method::PATCH,
                &uri,
                Some(&admin),
                Some(json!({ "status": "pending" })),
            )
            .await;
        assert_eq!(backwards.status, StatusCode::CONFLICT);

        let missing = app
            .send(
                Method::PATCH,
                "/api/admin/orders/9999/status",
                Some(&admin),
                Some(json!({ "status": "shipped" })),
            )
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let all = app
            .send(Method::GET, "/api/admin/orders", Some(&admin), None)
            .await;
        assert_eq!(all.body.as_array().unwrap().len(), 1);
    }
}
