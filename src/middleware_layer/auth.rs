use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::session::SessionClaims,
    models::user::{AccessToken, AuthenticatedUser},
    state::AppState,
};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Resolves the current user from the session cookie.
///
/// Any verification failure (missing cookie, bad signature, expiry,
/// malformed claims) is indistinguishable from "not signed in".
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
///
/// # Returns
///
/// The verified claims, or `None` when there is no valid session.
pub fn current_session(state: &AppState, cookies: &Cookies) -> Option<SessionClaims> {
    let token = cookies.get(SESSION_COOKIE)?;
    state.sessions.verify(token.value())
}

/// A middleware that requires a valid session to be present.
///
/// Inserts the verified `SessionClaims` and the derived `AuthenticatedUser`
/// into request extensions for downstream handlers.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an `AppError`.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let claims = current_session(&state, &cookies).ok_or_else(|| {
        tracing::warn!("❌ No valid session token");
        AppError::Unauthorized
    })?;

    tracing::debug!("✅ User authenticated: {}", claims.sub);

    let authenticated = AuthenticatedUser {
        user: claims.user(),
        access_token: AccessToken::new(claims.access_token.clone()),
    };

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(authenticated);

    Ok(next.run(request).await)
}
