//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pawcase_core::{Email, UserId};

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, normalized lowercase.
    pub email: Email,
    /// Whether the user may manage the catalog and order statuses.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
