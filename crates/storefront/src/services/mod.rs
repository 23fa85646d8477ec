//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email/password accounts
//! - `orders` - Checkout validation, cart splitting, and order status
//! - `catalog` - Pet-product catalog management
//! - `imaging` - Image downscaling for inline `data:` URLs

pub mod auth;
pub mod catalog;
pub mod imaging;
pub mod orders;
