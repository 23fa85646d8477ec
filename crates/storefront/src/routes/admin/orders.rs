//! Admin order handlers.

use axum::extract::{Path, State};
use serde::Deserialize;

use pawcase_core::{OrderId, OrderStatus};

use crate::error::{AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::Order;
use crate::services::orders;
use crate::state::AppState;

/// Body of `PATCH /api/admin/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: OrderStatus,
}

pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<AppJson<Vec<Order>>> {
    Ok(AppJson(state.stores().orders.list_all().await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    AppJson(body): AppJson<StatusBody>,
) -> Result<AppJson<Order>> {
    tracing::info!(admin_id = %admin.id, order_id = %id, status = %body.status, "Admin status change");
    let order = orders::change_status(state.stores().orders.as_ref(), id, body.status).await?;
    Ok(AppJson(order))
}
