use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::Method;

use crate::{
    error::Result,
    models::user::AuthenticatedUser,
    state::AppState,
};

/// Lists a client's orders.
#[axum::debug_handler]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(
            Method::GET,
            &format!("/clients/{}/orders", client_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Places a new order for a client.
#[axum::debug_handler]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("🧾 Creating order for client: {}", client_id);

    let data = state
        .upstream
        .forward(
            Method::POST,
            &format!("/clients/{}/orders", client_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// Fetches a single order.
#[axum::debug_handler]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, order_id)): Path<(String, String)>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(
            Method::GET,
            &format!("/clients/{}/orders/{}", client_id, order_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Updates an order.
#[axum::debug_handler]
pub async fn update_order(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, order_id)): Path<(String, String)>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("🧾 Updating order {} for client {}", order_id, client_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/clients/{}/orders/{}", client_id, order_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Cancels an order.
#[axum::debug_handler]
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, order_id)): Path<(String, String)>,
) -> Result<Response> {
    tracing::info!("🗑️ Deleting order {} for client {}", order_id, client_id);

    let data = state
        .upstream
        .forward(
            Method::DELETE,
            &format!("/clients/{}/orders/{}", client_id, order_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}
