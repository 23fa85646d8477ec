//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawcase_core::{ItemCategory, LineItem, Money, OrderGroup, OrderId, OrderStatus, UserId};

/// Customer contact details copied into every order of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// An order ready to be inserted.
///
/// Built from one [`OrderGroup`], so its total is derived from its items and
/// cannot be set independently.
#[derive(Debug, Clone)]
pub struct NewOrder {
    user_id: UserId,
    customer: CustomerDetails,
    group: OrderGroup,
}

impl NewOrder {
    /// Create a new order for one split group.
    #[must_use]
    pub const fn new(user_id: UserId, customer: CustomerDetails, group: OrderGroup) -> Self {
        Self {
            user_id,
            customer,
            group,
        }
    }

    /// Owner of the order.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Contact details.
    #[must_use]
    pub const fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Category of every item in the order.
    #[must_use]
    pub const fn category(&self) -> ItemCategory {
        self.group.category()
    }

    /// Items in cart order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.group.items()
    }

    /// Sum of `price * quantity` over this order's items.
    #[must_use]
    pub fn total(&self) -> Money {
        self.group.total()
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub category: ItemCategory,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
