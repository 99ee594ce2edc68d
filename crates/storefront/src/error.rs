//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Validation, login, and registration failures are normally rendered inline
//! by the form handlers; the statuses below apply when one escapes a handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use shopkeep_core::ValidationError;

use crate::db::RepositoryError;
use crate::services::{AuthError, CatalogError, CheckoutError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Form input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A unique or foreign-key constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The actor may not modify this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(err) => Self::Validation(err),
            CatalogError::NotFound(_) => Self::NotFound(e.to_string()),
            CatalogError::Forbidden(_) => Self::Forbidden(e.to_string()),
            CatalogError::Conflict(message) => Self::Conflict(message),
            CatalogError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Validation(err) => Self::Validation(err),
            CheckoutError::Catalog(err) => err.into(),
            CheckoutError::Repository(err) => Self::Database(err),
        }
    }
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::IncorrectEmail | AuthError::IncorrectPassword => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::EmailTaken(_) => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            _ if self.is_server_error() => "Internal server error".to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the user to the current hub's scope.
///
/// Under `sentry-tower` every request runs on its own hub, so this only
/// affects events captured while that request is handled.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use sentry::Hub;
    use shopkeep_core::{ProductId, UserId};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_text(err: AppError) -> String {
        let body = err.into_response().into_body();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product id 4 doesn't exist.".to_string());
        assert_eq!(err.to_string(), "Not found: Product id 4 doesn't exist.");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation(ValidationError::required("Name"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::IncorrectPassword)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailTaken("a@b.c".to_string()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_catalog_error_mapping() {
        assert_eq!(
            get_status(CatalogError::NotFound(ProductId::new(4)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CatalogError::Forbidden(ProductId::new(1)).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(CatalogError::Conflict("taken".to_string()).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_checkout_error_mapping() {
        let err: AppError =
            CheckoutError::Catalog(CatalogError::NotFound(ProductId::new(9))).into();
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let body = body_text(AppError::Internal("connection refused".to_string())).await;
        assert_eq!(body, "Internal server error");
    }

    #[tokio::test]
    async fn test_not_found_message_shown() {
        let err: AppError = CatalogError::NotFound(ProductId::new(4)).into();
        assert_eq!(body_text(err).await, "Product id 4 doesn't exist.");
    }

    #[test]
    fn test_sentry_user_stays_on_request_hub() {
        let events = sentry::test::with_captured_events(|| {
            let parent = Hub::current();

            Hub::run(Arc::new(Hub::new_from_top(&parent)), || {
                set_sentry_user(&UserId::new(7), Some("seller@example.com"));
                sentry::capture_message("authenticated", sentry::Level::Error);
            });

            Hub::run(Arc::new(Hub::new_from_top(&parent)), || {
                sentry::capture_message("anonymous", sentry::Level::Error);
            });
        });

        assert_eq!(events.len(), 2);
        let user = events.first().unwrap().user.as_ref().unwrap();
        assert_eq!(user.id.as_deref(), Some("7"));
        assert_eq!(user.email.as_deref(), Some("seller@example.com"));
        assert!(events.last().unwrap().user.is_none());
    }
}
