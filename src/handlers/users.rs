use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::Method;
use sonic_rs::JsonValueTrait;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    handlers::auth::create_secure_cookie,
    middleware_layer::auth::SESSION_COOKIE,
    models::session::{SessionClaims, SessionPatch},
    models::user::AuthenticatedUser,
    state::AppState,
};

fn patch_from_body(body: &sonic_rs::Value) -> SessionPatch {
    SessionPatch {
        name: body.get("name").and_then(|v| v.as_str()).map(str::to_string),
        email: body.get("email").and_then(|v| v.as_str()).map(str::to_string),
        phone: body.get("phone").and_then(|v| v.as_str()).map(str::to_string),
        designation: body
            .get("designation")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        profile_image: body
            .get("profileImage")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        is_read_only: body.get("isReadOnly").and_then(|v| v.as_bool()),
    }
}

fn renew_session_cookie(
    state: &AppState,
    cookies: &Cookies,
    claims: &SessionClaims,
    patch: &SessionPatch,
) -> Result<()> {
    let token = state.sessions.renew(claims, patch)?;

    cookies.add(create_secure_cookie(
        SESSION_COOKIE.to_string(),
        token,
        state.config.session_duration_days,
        state.config.production,
    ));

    tracing::info!("🔄 Session renewed for user: {}", claims.sub);
    Ok(())
}

/// Changes the signed-in user's password.
#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("🔑 Password change for user: {}", current.user.user_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            "/users/password",
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Updates the signed-in user's profile.
///
/// On success the session token is re-signed with the submitted fields
/// merged in, so the UI sees the new profile without logging in again.
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Extension(claims): Extension<SessionClaims>,
    cookies: Cookies,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("👤 Profile update for user: {}", current.user.user_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            "/users/profile",
            &current.access_token,
            Some(&body),
        )
        .await?;

    renew_session_cookie(&state, &cookies, &claims, &patch_from_body(&body))?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Replaces the signed-in user's profile picture.
///
/// The image is forwarded as multipart; on success the session token is
/// re-signed with the image URL the upstream reports.
#[axum::debug_handler]
pub async fn update_profile_picture(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Extension(claims): Extension<SessionClaims>,
    cookies: Cookies,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut file_name = "profile".to_string();
    let mut content_type: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let field_name = field.name().unwrap_or("").to_string();
                if field_name != "file" && field_name != "image" {
                    continue;
                }

                file_name = field.file_name().unwrap_or("profile").to_string();
                content_type = field.content_type().map(|s| s.to_string());
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Multipart(format!("{}: {}", field_name, e)))?
                        .to_vec(),
                );
            }
            Ok(None) => break,
            Err(e) => return Err(AppError::Multipart(format!("Parse error: {}", e))),
        }
    }

    let image = image.ok_or_else(|| AppError::Validation("No image provided".to_string()))?;

    let content_type = content_type
        .or_else(|| infer::get(&image).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    tracing::info!(
        "🖼️ Profile picture upload for user: {} ({} bytes)",
        current.user.user_id,
        image.len()
    );

    let part = reqwest::multipart::Part::bytes(image)
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(|e| AppError::Multipart(format!("Invalid content type: {}", e)))?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let data = state
        .upstream
        .forward_multipart("/users/profile-picture", &current.access_token, form)
        .await?;

    let image_url = data
        .get("profileImage")
        .and_then(|v| v.as_str())
        .or_else(|| data.get("url").and_then(|v| v.as_str()))
        .map(str::to_string);

    if let Some(url) = image_url {
        let patch = SessionPatch {
            profile_image: Some(url),
            ..Default::default()
        };
        renew_session_cookie(&state, &cookies, &claims, &patch)?;
    } else {
        tracing::warn!("⚠️ Upstream reported no image URL; session left unchanged");
    }

    Ok((StatusCode::OK, Json(data)).into_response())
}
