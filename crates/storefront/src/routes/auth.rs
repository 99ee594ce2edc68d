//! Authentication route handlers.
//!
//! Registration, login, and logout. Validation and credential errors are
//! shown inline on the re-rendered form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::PageContext;
use crate::error::AppError;
use crate::middleware::{CurrentActor, bind_actor, clear_actor};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub form: RegisterForm,
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> impl IntoResponse {
    RegisterTemplate {
        page: PageContext::new(&state, actor),
        error: None,
        form: RegisterForm::default(),
    }
}

/// Handle registration form submission.
///
/// On success the user is sent to the login page; registration does not log in.
pub async fn register(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let result = AuthService::new(state.pool())
        .register(Registration {
            email: &form.email,
            password: &form.password,
            first_name: &form.first_name,
            last_name: &form.last_name,
        })
        .await;

    match result {
        Ok(_) => Ok(Redirect::to("/auth/login").into_response()),
        Err(e @ (AuthError::Validation(_) | AuthError::EmailTaken(_))) => {
            tracing::debug!(error = %e, "Registration rejected");
            Ok(RegisterTemplate {
                page: PageContext::new(&state, actor),
                error: Some(e.to_string()),
                form,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> impl IntoResponse {
    LoginTemplate {
        page: PageContext::new(&state, actor),
        error: None,
        email: String::new(),
    }
}

/// Handle login form submission.
///
/// On success the session is reset and bound to the user.
pub async fn login(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            bind_actor(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AuthError::IncorrectEmail | AuthError::IncorrectPassword)) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                page: PageContext::new(&state, actor),
                error: Some(e.to_string()),
                email: form.email,
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and return to the listing.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_actor(&session).await?;
    Ok(Redirect::to("/"))
}
