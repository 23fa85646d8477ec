//! Pawcase Core - Shared types library.
//!
//! This crate provides common types used across all Pawcase components:
//! - `storefront` - JSON API for orders, the pet-product catalog, and auth
//! - `cli` - Command-line tools for migrations, image compression, and probing
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Order splitting lives here because it is a pure
//! function of the cart.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`order`] - Line items, classification, and the pet/case split

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod order;
pub mod types;

pub use order::{LineItem, OrderGroup, split_items};
pub use types::*;
