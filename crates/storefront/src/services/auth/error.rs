//! Authentication error types.

use thiserror::Error;

use shopkeep_core::ValidationError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required registration or login field was empty.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No account uses this email.
    #[error("Incorrect email.")]
    IncorrectEmail,

    /// The password did not match the stored hash.
    #[error("Incorrect password.")]
    IncorrectPassword,

    /// The email is already registered.
    #[error("Email {0} is already registered.")]
    EmailTaken(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
