//! Admin-only catalog and order management.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin):
//! anonymous requests are 401 and non-admin sessions are 403.

pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Routes mounted under `/api/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pet-products", get(products::index).post(products::create))
        .route(
            "/pet-products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/pet-products/{id}/templates", post(products::add_templates))
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", patch(orders::update_status))
}
