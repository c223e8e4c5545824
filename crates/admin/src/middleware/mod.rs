//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (fresh UUID per request)
//! 4. Session layer (tower-sessions with in-memory store)
//!
//! The auth guard and page layout are extractors: every route except
//! `/auth/*` and `/health` takes [`RequireAdminAuth`].

pub mod auth;
pub mod layout;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdminAuth, clear_auth_token, set_auth_token};
pub use layout::{Layout, set_flash};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
