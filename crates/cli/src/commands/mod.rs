//! CLI command implementations.

pub mod admin;
pub mod compress;
pub mod migrate;
pub mod probe;

use secrecy::SecretString;

/// Storefront database URL, preferring `PAWCASE_DATABASE_URL` over `DATABASE_URL`.
///
/// Returns `None` if neither is set.
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("PAWCASE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
        .map(SecretString::from)
}
