//! Authentication route handlers.
//!
//! Registration and login are classic form posts. Validation failures
//! re-render the form with a banner instead of redirecting, so the
//! messages survive without query-string plumbing. A successful login
//! mints a signed session cookie; if a deferred search query is waiting
//! in the cookie jar the user is sent straight to the results page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::services::auth::{AuthError, AuthService};
use crate::session;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub usermail: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    pub firstname: String,
    pub lastname: String,
    pub usermail: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

impl LoginTemplate {
    /// Login page with no banner.
    #[must_use]
    pub const fn blank() -> Self {
        Self { error: None }
    }

    /// Login page with a banner message.
    #[must_use]
    pub fn with_error(message: &str) -> Self {
        Self {
            error: Some(message.to_owned()),
        }
    }
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/registration.html")]
pub struct RegistrationTemplate {
    pub error: Option<String>,
}

impl RegistrationTemplate {
    /// Registration page with no banner.
    #[must_use]
    pub const fn blank() -> Self {
        Self { error: None }
    }

    /// Registration page with a banner message.
    #[must_use]
    pub fn with_error(message: &str) -> Self {
        Self {
            error: Some(message.to_owned()),
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn registration_page() -> impl IntoResponse {
    RegistrationTemplate::blank()
}

/// Handle registration form submission.
///
/// On success the user lands on the login page with a confirmation
/// banner rather than being signed in directly.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let auth = AuthService::new(state.users());
    match auth
        .register(&form.firstname, &form.lastname, &form.usermail, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id.as_i32(), "user registered");
            LoginTemplate::with_error("Account created").into_response()
        }
        Err(AuthError::UserAlreadyExists) => {
            RegistrationTemplate::with_error("User already Exist").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            RegistrationTemplate::with_error("Enter a valid email address").into_response()
        }
        Err(AuthError::WeakPassword(message)) => {
            RegistrationTemplate::with_error(&message).into_response()
        }
        Err(e) => {
            tracing::error!("registration failed: {e}");
            Redirect::to("/registration").into_response()
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate::blank()
}

/// Handle login form submission.
///
/// Unknown accounts and bad passwords get distinct banners. On success,
/// a waiting deferred search redirects to the results page instead of
/// the landing page.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.users());
    let user = match auth.login(&form.usermail, &form.password).await {
        Ok(user) => user,
        Err(AuthError::UserNotFound) => {
            return LoginTemplate::with_error("User does not exist").into_response();
        }
        Err(AuthError::InvalidCredentials) => {
            return LoginTemplate::with_error("Incorrect password").into_response();
        }
        Err(AuthError::InvalidEmail(e)) => {
            tracing::warn!("login with malformed email: {e}");
            return LoginTemplate::with_error("User does not exist").into_response();
        }
        Err(e) => {
            tracing::error!("login failed: {e}");
            return LoginTemplate::with_error("Incorrect password").into_response();
        }
    };

    let token = match state.sessions().issue(user.id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("failed to sign session token: {e}");
            return LoginTemplate::with_error("Something went wrong, try again").into_response();
        }
    };

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = user.id.as_i32(), "user logged in");

    // A deferred search means the user was interrupted on their way to
    // the results page; send them back there instead of the landing page.
    let target = if jar.get(session::QUERY_COOKIE).is_some() {
        "/search_result"
    } else {
        "/"
    };
    (jar.add(session::session_cookie(token)), Redirect::to(target)).into_response()
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Stateless sessions have nothing to revoke server side; clearing the
/// cookie is the whole operation.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    clear_sentry_user();
    (jar.add(session::session_removal()), Redirect::to("/"))
}
