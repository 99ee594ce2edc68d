//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. Security headers
//! 3. Request ID
//! 4. `TraceLayer` (request tracing)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! The current actor is resolved per handler by the extractors in [`auth`].

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AuthRejection, CurrentActor, RequireActor, bind_actor, clear_actor};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
