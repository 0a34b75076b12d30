use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    error::Result,
    middleware_layer::auth::SESSION_COOKIE,
    middleware_layer::csrf::{CSRF_COOKIE, generate_csrf_token},
    models::session::SessionClaims,
    models::user::SessionUser,
    services::auth as auth_service,
    state::AppState,
};

/// The request payload for user login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The request payload for requesting a password reset.
#[derive(Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// The response payload for a successful login.
#[derive(Serialize)]
pub struct LoginResult {
    pub success: bool,
    pub user: SessionUser,
}

/// The current session as reported to the UI.
#[derive(Serialize)]
pub struct SessionInfo {
    pub user: SessionUser,
    pub expires: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Creates a secure cookie with the given name, value, and max age.
pub fn create_secure_cookie(
    name: String,
    value: String,
    max_age_days: i64,
    production: bool,
) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.clone(), value);

    // The CSRF cookie must stay readable for the double-submit echo.
    if name != CSRF_COOKIE {
        cookie.set_http_only(true);
    }

    if production {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_days * 86400));
    cookie.set_path("/");

    cookie
}

fn remove_cookie(cookies: &Cookies, name: &'static str) {
    let mut cookie = Cookie::new(name, "");
    cookie.set_max_age(Duration::seconds(0));
    cookie.set_path("/");
    cookies.remove(cookie);
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt: {}", payload.email);

    let login =
        auth_service::authenticate(&state.upstream, &payload.email, &payload.password).await?;

    let token = state.sessions.issue(&login.user, &login.access_token)?;

    let session_cookie = create_secure_cookie(
        SESSION_COOKIE.to_string(),
        token,
        state.config.session_duration_days,
        state.config.production,
    );
    cookies.add(session_cookie);
    tracing::info!("✅ Session cookie issued for user: {}", login.user.id);

    let csrf_cookie = create_secure_cookie(
        CSRF_COOKIE.to_string(),
        generate_csrf_token(),
        state.config.session_duration_days,
        state.config.production,
    );
    cookies.add(csrf_cookie);
    tracing::debug!("🔐 CSRF cookie issued");

    let user = SessionUser::from(&login.user);

    Ok((StatusCode::OK, Json(LoginResult { success: true, user })).into_response())
}

/// Reports the signed-in user's session to the UI.
#[axum::debug_handler]
pub async fn session(Extension(claims): Extension<SessionClaims>) -> Result<Response> {
    let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    let info = SessionInfo {
        user: claims.user(),
        expires,
    };

    Ok((StatusCode::OK, Json(info)).into_response())
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(
    Extension(claims): Extension<SessionClaims>,
    cookies: Cookies,
) -> Result<Response> {
    tracing::info!("👋 Logout for user: {}", claims.sub);

    remove_cookie(&cookies, SESSION_COOKIE);
    remove_cookie(&cookies, CSRF_COOKIE);

    tracing::info!("✅ User logged out: {}", claims.sub);

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles a password-reset request.
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Response> {
    let result = auth_service::forgot_password(&state.upstream, &payload.email).await?;

    Ok((StatusCode::OK, Json(result)).into_response())
}
