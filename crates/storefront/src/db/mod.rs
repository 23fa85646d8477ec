//! Storage for storefront data.
//!
//! # Database: `pawcase`
//!
//! ## Tables (schema `storefront`)
//!
//! - `users` - Storefront accounts with argon2 password hashes
//! - `orders` - Orders; line items are embedded as JSONB
//! - `pet_products` - Catalog; image, template, and layout data are JSONB
//!
//! Sessions live in `tower_sessions.session`, managed by
//! `tower-sessions-sqlx-store`.
//!
//! # Stores
//!
//! Handlers talk to the [`UserStore`], [`OrderStore`], and [`ProductStore`]
//! traits through [`Stores`]. The `PostgreSQL` implementations live in
//! [`users`], [`orders`], and [`products`]; [`memory`] holds a process-local
//! implementation used with `PAWCASE_STORAGE=memory` and in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p pawcase-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pawcase_core::{Email, OrderId, OrderStatus, PetProductId, UserId};

use crate::models::{NewOrder, NewPetProduct, Order, PetProduct, User};

pub use memory::MemoryStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email) or a lost status update.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store cannot serve requests (e.g., a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Map a unique-violation into `Conflict`, everything else into `Database`.
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Storefront accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. Returns `Conflict` if the email is taken.
    async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError>;

    /// Look up a user and their password hash by email.
    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Look up a user by ID.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Grant or revoke admin rights. Returns `NotFound` for unknown emails.
    async fn set_admin(&self, email: &Email, is_admin: bool) -> Result<User, RepositoryError>;
}

/// Orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert one order and return it as stored.
    async fn insert(&self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// All orders owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// All orders, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Look up one order.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Move an order from `from` to `to`.
    ///
    /// Returns `NotFound` if the order does not exist and `Conflict` if its
    /// status is no longer `from`.
    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, RepositoryError>;
}

/// Pet-product catalog.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, newest first.
    async fn list(&self) -> Result<Vec<PetProduct>, RepositoryError>;

    /// Look up a product by ID.
    async fn get(&self, id: PetProductId) -> Result<Option<PetProduct>, RepositoryError>;

    /// Look up a product by its unique key.
    async fn get_by_key(&self, key: &str) -> Result<Option<PetProduct>, RepositoryError>;

    /// Create a product. Returns `Conflict` if the key is taken.
    async fn create(&self, product: &NewPetProduct) -> Result<PetProduct, RepositoryError>;

    /// Replace a product's fields. Returns `NotFound` or `Conflict`.
    async fn update(
        &self,
        id: PetProductId,
        product: &NewPetProduct,
    ) -> Result<PetProduct, RepositoryError>;

    /// Delete a product. Returns whether it existed.
    async fn delete(&self, id: PetProductId) -> Result<bool, RepositoryError>;

    /// Append template images. Returns `NotFound` for unknown products.
    async fn append_templates(
        &self,
        id: PetProductId,
        templates: &[String],
    ) -> Result<PetProduct, RepositoryError>;
}

/// The set of stores handed to request handlers.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub orders: Arc<dyn OrderStore>,
    pub products: Arc<dyn ProductStore>,
    pool: Option<PgPool>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Process-local stores sharing one [`MemoryStore`].
    #[must_use]
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Stores backed by an existing [`MemoryStore`].
    #[must_use]
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            products: Arc::new(store),
            pool: None,
        }
    }

    /// Replace the order store, keeping the others.
    #[must_use]
    pub fn with_orders(mut self, orders: Arc<dyn OrderStore>) -> Self {
        self.orders = orders;
        self
    }

    /// The database pool, when backed by `PostgreSQL`.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
