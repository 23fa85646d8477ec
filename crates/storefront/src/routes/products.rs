//! Public read-only catalog.

use axum::extract::{Path, State};

use crate::error::{AppJson, Result};
use crate::models::PetProduct;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// `GET /api/pet-products`
pub async fn index(State(state): State<AppState>) -> Result<AppJson<Vec<PetProduct>>> {
    let catalog = CatalogService::new(state.stores().products.as_ref());
    Ok(AppJson(catalog.list().await?))
}

/// `GET /api/pet-products/{key}`
pub async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<AppJson<PetProduct>> {
    let catalog = CatalogService::new(state.stores().products.as_ref());
    Ok(AppJson(catalog.get_by_key(&key).await?))
}
