use crate::error::{AppError, Result};
use crate::models::upstream::LoginResponse;
use crate::services::upstream::UpstreamClient;
use crate::validation::auth::{is_valid_email, validate_login};

/// Exchanges credentials for a user record and access token.
///
/// Fails closed: a rejected login, an unreachable upstream, and a malformed
/// success payload all surface as the same authentication error, and no
/// session is created.
///
/// # Arguments
///
/// * `upstream` - The upstream API client.
/// * `email` - The submitted email address.
/// * `password` - The submitted password.
///
/// # Returns
///
/// A `Result` containing the upstream login payload.
pub async fn authenticate(
    upstream: &UpstreamClient,
    email: &str,
    password: &str,
) -> Result<LoginResponse> {
    validate_login(email, password)?;

    tracing::debug!("🔐 Authenticating user: {}", email);

    let body = sonic_rs::json!({ "email": email, "password": password });

    match upstream
        .post_public::<LoginResponse>("/users/login", &body)
        .await
    {
        Ok(login) => {
            tracing::info!("✅ User authenticated: {}", login.user.id);
            Ok(login)
        }
        Err(e) => {
            tracing::warn!("❌ Login rejected: {}", e);
            Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ))
        }
    }
}

/// Requests a password-reset email for `email`.
///
/// An address that does not look like an email is refused locally, without
/// touching the network. Upstream failures degrade to a generic message;
/// this path never reveals whether an account exists.
pub async fn forgot_password(upstream: &UpstreamClient, email: &str) -> Result<sonic_rs::Value> {
    if !is_valid_email(email) {
        tracing::debug!("❌ Password reset refused: input is not an email address");
        return Ok(sonic_rs::json!({
            "success": false,
            "error": "Please enter a valid email address"
        }));
    }

    tracing::info!("🔑 Password reset requested");

    let body = sonic_rs::json!({ "email": email });

    match upstream
        .post_public::<sonic_rs::Value>("/users/forgot-password", &body)
        .await
    {
        Ok(_) => Ok(sonic_rs::json!({ "success": true })),
        Err(e) => {
            tracing::warn!("❌ Password reset forward failed: {}", e);
            Ok(sonic_rs::json!({
                "success": false,
                "error": "Unable to send reset instructions. Please try again later."
            }))
        }
    }
}
