use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::Method;
use sonic_rs::JsonValueTrait;

use crate::{
    error::{AppError, Result},
    models::user::AuthenticatedUser,
    state::AppState,
};

/// Lists all spare-part products.
#[axum::debug_handler]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(Method::GET, "/products", &current.access_token, None)
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Creates a product.
#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("📦 Creating product");

    let data = state
        .upstream
        .forward(Method::POST, "/products", &current.access_token, Some(&body))
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// Fetches a single product.
#[axum::debug_handler]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(
            Method::GET,
            &format!("/products/{}", product_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Updates a product.
#[axum::debug_handler]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("📦 Updating product: {}", product_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/products/{}", product_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Deletes a product.
#[axum::debug_handler]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
) -> Result<Response> {
    tracing::info!("🗑️ Deleting product: {}", product_id);

    let data = state
        .upstream
        .forward(
            Method::DELETE,
            &format!("/products/{}", product_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Attaches a demo video to a product. The body must identify the video.
#[axum::debug_handler]
pub async fn update_product_video(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(product_id): Path<String>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    let has_video_id = body
        .get("videoID")
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    if !has_video_id {
        return Err(AppError::Validation("videoID is required".to_string()));
    }

    tracing::info!("🎬 Updating video for product: {}", product_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/products/{}/video", product_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}
