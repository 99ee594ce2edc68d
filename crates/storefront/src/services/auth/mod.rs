//! Authentication service.
//!
//! Password registration and login against the `users` table. Session
//! binding happens in the route layer (see `middleware::auth`).

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use shopkeep_core::require;

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;

/// Raw registration form input.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// Fields are checked for presence in the order email, password, first
    /// name, last name. The account is not logged in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` naming the first empty field.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        require(&[
            ("Email", form.email),
            ("Password", form.password),
            ("First Name", form.first_name),
            ("Last Name", form.last_name),
        ])?;

        let password_hash = hash_password(form.password)?;

        let user = self
            .users
            .create(NewUser {
                email: form.email,
                password_hash: &password_hash,
                first_name: form.first_name,
                last_name: form.last_name,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken(form.email.to_owned()),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncorrectEmail` if no user has this exact email.
    /// Returns `AuthError::IncorrectPassword` if the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_password_hash(email)
            .await?
            .ok_or(AuthError::IncorrectEmail)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Hash a password with argon2 and a random salt, returning the PHC string.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::IncorrectPassword)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::IncorrectPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("admin").unwrap();
        let err = verify_password("a", &hash).unwrap_err();
        assert_eq!(err.to_string(), "Incorrect password.");
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("user").unwrap(), hash_password("user").unwrap());
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(matches!(
            verify_password("user", "not-a-phc-string"),
            Err(AuthError::IncorrectPassword)
        ));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AuthError::IncorrectEmail.to_string(), "Incorrect email.");
        assert_eq!(
            AuthError::EmailTaken("a@b.c".to_string()).to_string(),
            "Email a@b.c is already registered."
        );
        let err: AuthError = shopkeep_core::ValidationError::required("Email").into();
        assert_eq!(err.to_string(), "Email is required.");
    }
}
