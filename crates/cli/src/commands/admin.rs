//! Admin account management.
//!
//! Accounts register through the API; these commands grant or revoke the
//! admin flag on an existing account. The change applies from the user's
//! next login.
//!
//! # Usage
//!
//! ```bash
//! pawcase-cli admin promote -e owner@example.com
//! pawcase-cli admin demote -e owner@example.com
//! ```

use thiserror::Error;

use pawcase_core::{Email, EmailError};
use pawcase_storefront::db::{PgUserStore, RepositoryError, UserStore, create_pool};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Missing environment variable: PAWCASE_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No account with email: {0}")]
    UnknownUser(String),

    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Set or clear the admin flag for `email`.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if nobody registered with that email.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let database_url = super::database_url().ok_or(AdminError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to storefront database...");
    let pool = create_pool(&database_url).await?;
    let users = PgUserStore::new(pool);

    let user = users
        .set_admin(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownUser(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, is_admin, "Admin flag updated");
    Ok(())
}
