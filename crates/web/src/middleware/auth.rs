//! Authentication extractors.
//!
//! Both extractors read the `tripQuestToken` cookie and verify it against
//! the signing key in [`AppState`]. [`AuthState`] never rejects and lets a
//! handler branch on all three outcomes; [`RequireAuth`] is for pages that
//! answer every unauthenticated visitor the same way.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use tripquest_core::UserId;

use crate::session;
use crate::state::AppState;

/// The authenticated user for the current request.
///
/// Holds just the verified id from the token; handlers load the full user
/// record when a page needs to display account data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    /// User id the session token was issued for.
    pub id: UserId,
}

/// Authentication state of the current request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(auth: AuthState) -> Response {
///     match auth {
///         AuthState::Authenticated(user) => personalized_page(user),
///         AuthState::Anonymous => login_prompt(),
///         AuthState::Expired => login_prompt_with_expiry_notice(),
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub enum AuthState {
    /// No session cookie on the request.
    Anonymous,
    /// A valid, unexpired session token.
    Authenticated(CurrentUser),
    /// A session cookie was present but the token failed verification
    /// (bad signature, malformed, or past expiry). The handler should clear
    /// the stale cookie in its response.
    Expired,
}

/// Extractor that requires a valid session.
///
/// Anonymous visitors are redirected to the login page; stale cookies are
/// cleared on the way there.
pub struct RequireAuth(pub CurrentUser);

/// Rejection produced by [`RequireAuth`].
pub enum AuthRejection {
    /// No session cookie at all.
    RedirectToLogin,
    /// Stale session cookie; the jar carries its removal.
    SessionExpired(CookieJar),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::SessionExpired(jar) => (jar, Redirect::to("/login")).into_response(),
        }
    }
}

/// Resolve the authentication state from the request cookies.
fn resolve(parts: &Parts, state: &AppState) -> AuthState {
    let jar = CookieJar::from_headers(&parts.headers);

    let Some(cookie) = jar.get(session::SESSION_COOKIE) else {
        return AuthState::Anonymous;
    };

    match state.sessions().verify(cookie.value()) {
        Ok(user_id) => AuthState::Authenticated(CurrentUser { id: user_id }),
        Err(_) => AuthState::Expired,
    }
}

impl FromRequestParts<AppState> for AuthState {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve(parts, state))
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state) {
            AuthState::Authenticated(user) => Ok(Self(user)),
            AuthState::Anonymous => Err(AuthRejection::RedirectToLogin),
            AuthState::Expired => {
                let jar = CookieJar::from_headers(&parts.headers);
                Err(AuthRejection::SessionExpired(
                    jar.add(session::session_removal()),
                ))
            }
        }
    }
}
