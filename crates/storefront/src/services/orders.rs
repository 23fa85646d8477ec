//! Checkout intake, order splitting, and status updates.
//!
//! A checkout is validated, split into pet-asset and phone-case groups, and
//! every group is inserted as its own order. The inserts run concurrently and
//! are not wrapped in a transaction: if one fails, the others stay committed
//! and the error is returned to the caller.

use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use pawcase_core::{
    ItemCategory, LineItem, Money, MoneyError, OrderId, OrderStatus, PetProductId, UserId,
    split_items,
};

use crate::db::{OrderStore, RepositoryError};
use crate::models::{CustomerDetails, NewOrder, Order};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart has no items.
    #[error("cart items are required")]
    EmptyCart,

    /// A customer field is missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A line item failed validation.
    #[error("item {index}: {reason}")]
    InvalidItem {
        /// Zero-based position in the cart.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The cart total is out of range.
    #[error("order total: {0}")]
    InvalidTotal(#[from] MoneyError),

    /// The order does not exist.
    #[error("order not found")]
    NotFound,

    /// The requested status change is not allowed.
    #[error("cannot change order status from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Storage failure.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout request body as sent by the storefront client.
///
/// Every field is optional at the wire level so that missing fields produce
/// a validation error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartItemInput>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Client-computed total. Ignored; totals are recomputed per order.
    pub total: Option<Decimal>,
}

/// One cart item in a [`CheckoutRequest`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: Option<PetProductId>,
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub custom_text: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
}

/// A validated checkout.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub customer: CustomerDetails,
    pub items: Vec<LineItem>,
}

impl CheckoutRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart`, `OrderError::MissingField`,
    /// `OrderError::InvalidItem` or `OrderError::InvalidTotal` describing the
    /// first problem found.
    pub fn validate(self) -> Result<Checkout, OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let customer = CustomerDetails {
            full_name: required(self.full_name, "fullName")?,
            email: required(self.email, "email")?,
            phone: required(self.phone, "phone")?,
            address: required(self.address, "address")?,
        };

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                item.into_line_item()
                    .map_err(|reason| OrderError::InvalidItem { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Every split group is a subset of the cart, so a cart total in range
        // keeps each order total in range.
        let line_totals = items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Money::checked_sum(line_totals)?;

        Ok(Checkout { customer, items })
    }
}

impl CartItemInput {
    fn into_line_item(self) -> Result<LineItem, String> {
        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty())
            .ok_or("name is required")?;

        let price = self.price.ok_or("price is required")?;
        let price = Money::new(price).map_err(|e| e.to_string())?;

        let quantity = match self.quantity {
            None => 1,
            Some(q) if q < 1 => return Err("quantity must be at least 1".to_owned()),
            Some(q) => u32::try_from(q).map_err(|_| "quantity is too large".to_owned())?,
        };

        // Unknown tags fall back to the name/text heuristic.
        let category = self
            .category
            .as_deref()
            .and_then(|c| c.parse::<ItemCategory>().ok());

        let item = LineItem {
            product_id: self.product_id,
            name,
            image: self.image.filter(|i| !i.is_empty()),
            images: self.images,
            custom_text: self.custom_text,
            price,
            quantity,
            category,
        };
        item.line_total().map_err(|e| format!("line total: {e}"))?;
        Ok(item)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, OrderError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(OrderError::MissingField(field))
}

/// Split a validated checkout and persist one order per group.
///
/// Returns the created orders, pet assets first.
///
/// # Errors
///
/// Returns `OrderError::Repository` if any insert fails. Orders whose insert
/// succeeded remain committed.
#[instrument(skip(orders, checkout), fields(user_id = %user_id, items = checkout.items.len()))]
pub async fn place_order(
    orders: &dyn OrderStore,
    user_id: UserId,
    checkout: Checkout,
) -> Result<Vec<Order>, OrderError> {
    let Checkout { customer, items } = checkout;

    let new_orders: Vec<NewOrder> = split_items(items)?
        .into_iter()
        .map(|group| NewOrder::new(user_id, customer.clone(), group))
        .collect();

    let results = join_all(new_orders.iter().map(|order| orders.insert(order))).await;

    let mut created = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(order) => created.push(order),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(err) = first_error {
        if !created.is_empty() {
            let committed: Vec<_> = created.iter().map(|o| o.id.as_i32()).collect();
            warn!(?committed, "Order split partially failed; committed orders remain");
        }
        return Err(err.into());
    }

    info!(
        orders = created.len(),
        ids = ?created.iter().map(|o| o.id.as_i32()).collect::<Vec<_>>(),
        "Orders created"
    );
    Ok(created)
}

/// Move an order to a new status if the lifecycle allows it.
///
/// # Errors
///
/// Returns `OrderError::NotFound`, `OrderError::InvalidTransition`, or
/// `OrderError::Repository` (including a `Conflict` when the status changed
/// concurrently).
#[instrument(skip(orders), fields(order_id = %id, to = %next))]
pub async fn change_status(
    orders: &dyn OrderStore,
    id: OrderId,
    next: OrderStatus,
) -> Result<Order, OrderError> {
    let current = orders.get(id).await?.ok_or(OrderError::NotFound)?;

    if !current.status.can_transition_to(next) {
        if current.status.is_terminal() {
            debug!(status = %current.status, "Order is already final");
        }
        return Err(OrderError::InvalidTransition {
            from: current.status,
            to: next,
        });
    }

    let updated = orders
        .update_status(id, current.status, next)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => OrderError::NotFound,
            other => OrderError::Repository(other),
        })?;

    info!(from = %current.status, "Order status changed");
    Ok(updated)
}
