//! Current-actor extractors.
//!
//! The session holds at most a user id. Each request reloads that user from
//! the database, so the actor is never cached across requests. A resolved
//! actor is also attached to the request's Sentry hub, which `sentry-tower`
//! forks per request.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use shopkeep_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::{User, session_keys};
use crate::state::AppState;

/// Path anonymous callers are sent to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor for the logged-in user, if any.
///
/// A session pointing at a user row that no longer exists reads as anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentActor(actor): CurrentActor) -> impl IntoResponse {
///     match actor {
///         Some(user) => format!("Hello, {}!", user.first_name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentActor(pub Option<User>);

/// Extractor that requires a logged-in user.
///
/// Anonymous callers are redirected to the login page before the handler runs.
pub struct RequireActor(pub User);

/// Rejection for the actor extractors.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// Session layer missing or the user lookup failed.
    Error(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Error(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().ok_or_else(|| {
            AuthRejection::Error(AppError::Internal("session layer missing".to_string()))
        })?;

        let Some(user_id) = session
            .get::<UserId>(session_keys::USER_ID)
            .await
            .ok()
            .flatten()
        else {
            return Ok(Self(None));
        };

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await
            .map_err(|e| AuthRejection::Error(e.into()))?;

        if let Some(user) = &user {
            set_sentry_user(&user.id, Some(&user.email));
        }

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireActor {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentActor(actor) = CurrentActor::from_request_parts(parts, state).await?;
        actor.map(Self).ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Bind `user` to a fresh session after a successful login.
///
/// Prior session state is cleared and the session id is rotated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn bind_actor(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.clear().await;
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user.id).await?;
    Ok(())
}

/// Clear all session state (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted from the store.
pub async fn clear_actor(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    Ok(())
}
