//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from database row types and
//! request bodies.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{CustomerDetails, NewOrder, Order};
pub use product::{CoverArea, CoverLayout, CoverSize, NewPetProduct, PetProduct};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
