//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Body limit (`PAWCASE_MAX_BODY_BYTES`)
//! 5. Session layer (tower-sessions, `PostgreSQL` or memory store)
//! 6. CORS (only when `PAWCASE_ALLOWED_ORIGIN` is set)
//! 7. Rate limiting on `/api/auth` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdmin, RequireAuth, clear_current_user, set_current_user};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{memory_session_layer, postgres_session_layer};
