//! `PostgreSQL` order store.
//!
//! Line items are embedded as a JSONB array, mirroring the document shape the
//! storefront client submits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{debug, instrument};

use pawcase_core::{ItemCategory, LineItem, Money, OrderId, OrderStatus, UserId};

use super::{OrderStore, RepositoryError};
use crate::models::{CustomerDetails, NewOrder, Order};

const ORDER_COLUMNS: &str = "id, user_id, category, full_name, email, phone, address, \
                             items, total, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    category: ItemCategory,
    full_name: String,
    email: String,
    phone: String,
    address: String,
    items: Json<Vec<LineItem>>,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            category: row.category,
            customer: CustomerDetails {
                full_name: row.full_name,
                email: row.email,
                phone: row.phone,
                address: row.address,
            },
            items: row.items.0,
            total: row.total,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Store for `storefront.orders`.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(
        &self,
        sql: &str,
        user_id: Option<UserId>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut query = sqlx::query_as::<_, OrderRow>(sql);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self, order), fields(user_id = %order.user_id(), category = %order.category()))]
    async fn insert(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let customer = order.customer();
        let sql = format!(
            r"
            INSERT INTO storefront.orders
                (user_id, category, full_name, email, phone, address, items, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row: OrderRow = sqlx::query_as(&sql)
            .bind(order.user_id())
            .bind(order.category())
            .bind(&customer.full_name)
            .bind(&customer.email)
            .bind(&customer.phone)
            .bind(&customer.address)
            .bind(Json(order.items()))
            .bind(order.total())
            .fetch_one(&self.pool)
            .await?;

        debug!(order_id = row.id, "Inserted order");
        Ok(row.into())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, Some(user_id)).await
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.orders ORDER BY created_at DESC, id DESC"
        );
        self.fetch_many(&sql, None).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM storefront.orders WHERE id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Order::from))
    }

    #[instrument(skip(self), fields(order_id = %id, from = %from, to = %to))]
    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.orders
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            None if self.get(id).await?.is_some() => Err(RepositoryError::Conflict(format!(
                "order {id} is no longer {from}"
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }
}
