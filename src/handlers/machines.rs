use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::Method;

use crate::{
    error::Result,
    models::user::AuthenticatedUser,
    state::AppState,
};

/// Registers a machine in the global catalogue.
#[axum::debug_handler]
pub async fn add_machine(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("⚙️ Registering machine");

    let data = state
        .upstream
        .forward(Method::POST, "/machines/add", &current.access_token, Some(&body))
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// Lists machine categories.
#[axum::debug_handler]
pub async fn list_machine_categories(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(
            Method::GET,
            "/machines/machine-category",
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Creates a machine category.
#[axum::debug_handler]
pub async fn create_machine_category(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("⚙️ Creating machine category");

    let data = state
        .upstream
        .forward(
            Method::POST,
            "/machines/machine-category",
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}
