//! In-memory implementation of the storefront stores.
//!
//! Used with `PAWCASE_STORAGE=memory` for local development and by the
//! handler tests. One [`MemoryStore`] implements every store trait; clones
//! share the same data.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use pawcase_core::{Email, OrderId, OrderStatus, PetProductId, UserId};

use super::{OrderStore, ProductStore, RepositoryError, UserStore};
use crate::models::{NewOrder, NewPetProduct, Order, PetProduct, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, (User, String)>,
    orders: BTreeMap<OrderId, Order>,
    products: BTreeMap<PetProductId, PetProduct>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local storage shared by clones.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, RepositoryError> {
        self.tables
            .read()
            .map_err(|e| RepositoryError::Unavailable(format!("failed to acquire read lock: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, RepositoryError> {
        self.tables
            .write()
            .map_err(|e| RepositoryError::Unavailable(format!("failed to acquire write lock: {e}")))
    }
}

/// Newest first, ties broken by the higher ID.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|(user, _)| &user.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(tables.next_id()),
            email: email.clone(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        tables
            .users
            .insert(user.id, (user.clone(), password_hash.to_owned()));
        Ok(user)
    }

    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|(user, _)| &user.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn set_admin(&self, email: &Email, is_admin: bool) -> Result<User, RepositoryError> {
        let mut tables = self.write()?;
        let (user, _) = tables
            .users
            .values_mut()
            .find(|(user, _)| &user.email == email)
            .ok_or(RepositoryError::NotFound)?;
        user.is_admin = is_admin;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let stored = Order {
            id: OrderId::new(tables.next_id()),
            user_id: order.user_id(),
            category: order.category(),
            customer: order.customer().clone(),
            items: order.items().to_vec(),
            total: order.total(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.orders.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .read()?
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders, |o| (o.created_at, o.id.as_i32()));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.read()?.orders.values().cloned().collect();
        newest_first(&mut orders, |o| (o.created_at, o.id.as_i32()));
        Ok(orders)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tables = self.write()?;
        let order = tables.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if order.status != from {
            return Err(RepositoryError::Conflict(format!(
                "order {id} is no longer {from}"
            )));
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> Result<Vec<PetProduct>, RepositoryError> {
        let mut products: Vec<PetProduct> = self.read()?.products.values().cloned().collect();
        newest_first(&mut products, |p| (p.created_at, p.id.as_i32()));
        Ok(products)
    }

    async fn get(&self, id: PetProductId) -> Result<Option<PetProduct>, RepositoryError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<PetProduct>, RepositoryError> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.key == key)
            .cloned())
    }

    async fn create(&self, product: &NewPetProduct) -> Result<PetProduct, RepositoryError> {
        let mut tables = self.write()?;
        if tables.products.values().any(|p| p.key == product.key) {
            return Err(RepositoryError::Conflict(
                "product key already exists".to_owned(),
            ));
        }

        let now = Utc::now();
        let stored = PetProduct {
            id: PetProductId::new(tables.next_id()),
            name: product.name.clone(),
            category: product.category.clone(),
            key: product.key.clone(),
            price: product.price,
            images: product.images.clone(),
            templates: product.templates.clone(),
            layout: product.layout,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: PetProductId,
        product: &NewPetProduct,
    ) -> Result<PetProduct, RepositoryError> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .products
            .values()
            .any(|p| p.id != id && p.key == product.key)
        {
            return Err(RepositoryError::Conflict(
                "product key already exists".to_owned(),
            ));
        }

        let stored = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name.clone_from(&product.name);
        stored.category.clone_from(&product.category);
        stored.key.clone_from(&product.key);
        stored.price = product.price;
        stored.images.clone_from(&product.images);
        stored.templates.clone_from(&product.templates);
        stored.layout = product.layout;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: PetProductId) -> Result<bool, RepositoryError> {
        Ok(self.write()?.products.remove(&id).is_some())
    }

    async fn append_templates(
        &self,
        id: PetProductId,
        templates: &[String],
    ) -> Result<PetProduct, RepositoryError> {
        let mut tables = self.write()?;
        let stored = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        stored.templates.extend_from_slice(templates);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}
