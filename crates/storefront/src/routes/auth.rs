//! Authentication route handlers.
//!
//! Email/password registration and login backed by the session store.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, AppJson, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login and registration body.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn session_error(err: &tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session error: {err}"))
}

async fn start_session(session: &Session, user: &CurrentUser) -> Result<()> {
    set_current_user(session, user)
        .await
        .map_err(|e| session_error(&e))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    AppJson(body): AppJson<Credentials>,
) -> Result<(StatusCode, AppJson<CurrentUser>)> {
    let auth = AuthService::new(state.stores().users.as_ref());
    let user = auth.register(&body.email, &body.password).await?;

    let current = CurrentUser::from(&user);
    start_session(&session, &current).await?;
    Ok((StatusCode::CREATED, AppJson(current)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    AppJson(body): AppJson<Credentials>,
) -> Result<AppJson<CurrentUser>> {
    let auth = AuthService::new(state.stores().users.as_ref());
    let user = auth.login(&body.email, &body.password).await?;

    let current = CurrentUser::from(&user);
    start_session(&session, &current).await?;
    info!(user_id = %current.id, "User logged in");
    Ok(AppJson(current))
}

/// `POST /api/auth/logout`
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| session_error(&e))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
pub async fn me(RequireAuth(user): RequireAuth) -> AppJson<CurrentUser> {
    AppJson(user)
}
