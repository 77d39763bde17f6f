//! Landing page route handler.
//!
//! The landing page doubles as the search form. Signed-in users get a
//! personalised header with a link to their bookings; everyone else
//! gets login/registration links. An expired session renders the login
//! page directly so the user understands why they were signed out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::instrument;

use crate::middleware::AuthState;
use crate::models::User;
use crate::session;
use crate::state::AppState;

use super::auth::LoginTemplate;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success banners on the landing page.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// View Types
// =============================================================================

/// User display data for templates.
#[derive(Debug, Clone)]
pub struct UserView {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    /// Signed-in user, if any.
    pub user: Option<UserView>,
    /// Number of bookings shown next to the cart link.
    pub bookings_amount: usize,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handler
// =============================================================================

/// Display the landing page.
///
/// A valid session whose user row can no longer be loaded is treated
/// like a stale cookie: the cookie is cleared and the login page is
/// rendered instead of a half-populated landing page.
#[instrument(skip(state, jar))]
pub async fn landing(
    State(state): State<AppState>,
    auth: AuthState,
    jar: CookieJar,
    Query(query): Query<MessageQuery>,
) -> Response {
    let current = match auth {
        AuthState::Authenticated(current) => current,
        AuthState::Expired => {
            return (
                jar.add(session::session_removal()),
                LoginTemplate::with_error("Session Expired"),
            )
                .into_response();
        }
        AuthState::Anonymous => {
            return LandingTemplate {
                user: None,
                bookings_amount: 0,
                error: query.error,
                success: query.success,
            }
            .into_response();
        }
    };

    let user = match state.users().find_by_id(current.id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id = current.id.as_i32(), "session for unknown user");
            return stale_session(jar);
        }
        Err(e) => {
            tracing::error!("failed to load user for landing page: {e}");
            return stale_session(jar);
        }
    };

    let bookings_amount = match state.bookings().find_by_owner(current.id).await {
        Ok(bookings) => bookings.len(),
        Err(e) => {
            tracing::error!("failed to count bookings for landing page: {e}");
            return stale_session(jar);
        }
    };

    LandingTemplate {
        user: Some(UserView::from(&user)),
        bookings_amount,
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Clear the session cookie and ask the user to sign in again.
fn stale_session(jar: CookieJar) -> Response {
    (
        jar.add(session::session_removal()),
        LoginTemplate::with_error("Please Login."),
    )
        .into_response()
}
