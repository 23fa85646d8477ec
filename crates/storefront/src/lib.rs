//! Pawcase storefront library.
//!
//! The JSON API behind the pet phone-case storefront: checkout with
//! category splitting, order history, the pet-product catalog, and session
//! authentication. The binary in `main.rs` wires this up; the CLI and the
//! tests use it directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
