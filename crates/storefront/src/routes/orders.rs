//! Checkout and order history handlers.

use axum::{extract::State, http::StatusCode};

use crate::error::{AppJson, Result};
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::orders::{self, CheckoutRequest};
use crate::state::AppState;

/// `POST /api/orders`
///
/// Validates the cart, splits it by category, and returns every created
/// order (pet assets first).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(request): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, AppJson<Vec<Order>>)> {
    let checkout = request.validate()?;
    let created = orders::place_order(state.stores().orders.as_ref(), user.id, checkout).await?;
    Ok((StatusCode::CREATED, AppJson(created)))
}

/// `GET /api/orders/mine`
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Vec<Order>>> {
    let orders = state.stores().orders.list_for_user(user.id).await?;
    Ok(AppJson(orders))
}
