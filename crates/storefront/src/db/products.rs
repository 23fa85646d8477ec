//! `PostgreSQL` pet-product store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use pawcase_core::{Money, PetProductId};

use super::{ProductStore, RepositoryError, map_unique_violation};
use crate::models::{CoverLayout, NewPetProduct, PetProduct};

const PRODUCT_COLUMNS: &str =
    "id, name, category, key, price, images, templates, layout, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PetProductRow {
    id: i32,
    name: String,
    category: String,
    key: String,
    price: Money,
    images: Json<Vec<String>>,
    templates: Json<Vec<String>>,
    layout: Option<Json<CoverLayout>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PetProductRow> for PetProduct {
    fn from(row: PetProductRow) -> Self {
        Self {
            id: PetProductId::new(row.id),
            name: row.name,
            category: row.category,
            key: row.key,
            price: row.price,
            images: row.images.0,
            templates: row.templates.0,
            layout: row.layout.map(|layout| layout.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Store for `storefront.pet_products`.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<PetProduct>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.pet_products \
             ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<PetProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(PetProduct::from).collect())
    }

    async fn get(&self, id: PetProductId) -> Result<Option<PetProduct>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM storefront.pet_products WHERE id = $1");
        let row: Option<PetProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PetProduct::from))
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<PetProduct>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM storefront.pet_products WHERE key = $1");
        let row: Option<PetProductRow> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PetProduct::from))
    }

    #[instrument(skip(self, product), fields(key = %product.key))]
    async fn create(&self, product: &NewPetProduct) -> Result<PetProduct, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO storefront.pet_products
                (name, category, key, price, images, templates, layout)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        );
        let row: PetProductRow = sqlx::query_as(&sql)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.key)
            .bind(product.price)
            .bind(Json(&product.images))
            .bind(Json(&product.templates))
            .bind(product.layout.map(Json))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "product key"))?;
        Ok(row.into())
    }

    #[instrument(skip(self, product), fields(product_id = %id, key = %product.key))]
    async fn update(
        &self,
        id: PetProductId,
        product: &NewPetProduct,
    ) -> Result<PetProduct, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.pet_products
            SET name = $2, category = $3, key = $4, price = $5,
                images = $6, templates = $7, layout = $8, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        );
        let row: Option<PetProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.key)
            .bind(product.price)
            .bind(Json(&product.images))
            .bind(Json(&product.templates))
            .bind(product.layout.map(Json))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "product key"))?;
        row.map(PetProduct::from).ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete(&self, id: PetProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.pet_products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, templates), fields(product_id = %id, count = templates.len()))]
    async fn append_templates(
        &self,
        id: PetProductId,
        templates: &[String],
    ) -> Result<PetProduct, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.pet_products
            SET templates = templates || $2, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        );
        let row: Option<PetProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(Json(templates))
            .fetch_optional(&self.pool)
            .await?;
        row.map(PetProduct::from).ok_or(RepositoryError::NotFound)
    }
}
