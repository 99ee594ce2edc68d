//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Product listing
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (database)
//!
//! # Auth
//! GET  /auth/register      - Registration form
//! POST /auth/register      - Register action
//! GET  /auth/login         - Login form
//! POST /auth/login         - Login action
//! GET  /auth/logout        - Logout action
//!
//! # Catalog (requires login; update/delete require ownership)
//! GET  /create             - New product form
//! POST /create             - Create product
//! GET  /{id}/update        - Edit form
//! POST /{id}/update        - Update product
//! POST /{id}/delete        - Delete product
//!
//! # Checkout (requires login)
//! GET  /{id}/purchase      - Shipping address form
//! POST /{id}/purchase      - Record purchase
//! ```

pub mod auth;
pub mod health;
pub mod products;
pub mod purchases;

use axum::{
    Router,
    routing::{get, post},
};

use crate::models::User;
use crate::state::AppState;

/// Values every page template needs for the shared layout.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Logged-in user, if any (drives the nav links).
    pub actor: Option<User>,
    /// Google Analytics measurement ID, rendered when configured.
    pub analytics_id: Option<String>,
}

impl PageContext {
    #[must_use]
    pub fn new(state: &AppState, actor: Option<User>) -> Self {
        Self {
            actor,
            analytics_id: state.config().analytics.google_analytics_id.clone(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/create", get(products::create_page).post(products::create))
        .route("/{id}/update", get(products::update_page).post(products::update))
        .route("/{id}/delete", post(products::delete))
        .route("/{id}/purchase", get(purchases::purchase_page).post(purchases::purchase))
        .nest("/auth", auth_routes())
}
