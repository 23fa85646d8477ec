//! Admin pet-product handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use pawcase_core::PetProductId;

use crate::error::{AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::PetProduct;
use crate::services::catalog::{CatalogService, ProductInput};
use crate::state::AppState;

/// Body of `POST /api/admin/pet-products/{id}/templates`.
#[derive(Debug, Deserialize)]
pub struct TemplatesBody {
    #[serde(default)]
    pub templates: Vec<String>,
}

fn catalog(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(state.stores().products.as_ref())
}

pub async fn index(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<AppJson<Vec<PetProduct>>> {
    Ok(AppJson(catalog(&state).list().await?))
}

pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<PetProductId>,
) -> Result<AppJson<PetProduct>> {
    Ok(AppJson(catalog(&state).get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    AppJson(input): AppJson<ProductInput>,
) -> Result<(StatusCode, AppJson<PetProduct>)> {
    let product = catalog(&state).create(input).await?;
    Ok((StatusCode::CREATED, AppJson(product)))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<PetProductId>,
    AppJson(input): AppJson<ProductInput>,
) -> Result<AppJson<PetProduct>> {
    Ok(AppJson(catalog(&state).update(id, input).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<PetProductId>,
) -> Result<StatusCode> {
    catalog(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_templates(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<PetProductId>,
    AppJson(body): AppJson<TemplatesBody>,
) -> Result<AppJson<PetProduct>> {
    Ok(AppJson(
        catalog(&state).add_templates(id, body.templates).await?,
    ))
}
