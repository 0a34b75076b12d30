use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::Method;
use serde::Deserialize;
use sonic_rs::JsonValueTrait;

use crate::{
    error::{AppError, Result},
    models::user::AuthenticatedUser,
    state::AppState,
};

/// Query parameters for removing a spare part from a machine.
#[derive(Deserialize)]
pub struct SparePartQuery {
    #[serde(rename = "sparePartID")]
    pub spare_part_id: Option<String>,
}

/// Lists all clients.
#[axum::debug_handler]
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(Method::GET, "/clients", &current.access_token, None)
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Creates a new client.
#[axum::debug_handler]
pub async fn create_client(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("📋 Creating client");

    let data = state
        .upstream
        .forward(Method::POST, "/clients", &current.access_token, Some(&body))
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// Fetches a single client.
#[axum::debug_handler]
pub async fn get_client(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(
            Method::GET,
            &format!("/clients/{}", client_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Updates a client.
#[axum::debug_handler]
pub async fn update_client(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("📋 Updating client: {}", client_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/clients/{}", client_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Deletes a client.
#[axum::debug_handler]
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
) -> Result<Response> {
    tracing::info!("🗑️ Deleting client: {}", client_id);

    let data = state
        .upstream
        .forward(
            Method::DELETE,
            &format!("/clients/{}", client_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Registers a machine at a client site.
#[axum::debug_handler]
pub async fn add_machine(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("⚙️ Adding machine to client: {}", client_id);

    let data = state
        .upstream
        .forward(
            Method::POST,
            &format!("/clients/{}/machines", client_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// Updates a machine at a client site.
#[axum::debug_handler]
pub async fn update_machine(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, machine_id)): Path<(String, String)>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("⚙️ Updating machine {} for client {}", machine_id, client_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/clients/{}/machines/{}", client_id, machine_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Updates a spare part on a machine. The body must identify the part.
#[axum::debug_handler]
pub async fn update_spare_part(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, machine_id)): Path<(String, String)>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    let has_part_id = body
        .get("sparePartID")
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    if !has_part_id {
        return Err(AppError::Validation("sparePartID is required".to_string()));
    }

    tracing::info!("🔧 Updating spare part on machine: {}", machine_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/clients/{}/machines/{}/spare-parts", client_id, machine_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Removes a spare part from a machine, identified by query parameter.
#[axum::debug_handler]
pub async fn delete_spare_part(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, machine_id)): Path<(String, String)>,
    Query(query): Query<SparePartQuery>,
) -> Result<Response> {
    let spare_part_id = query
        .spare_part_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("sparePartID is required".to_string()))?;

    tracing::info!("🔧 Removing spare part {} from machine: {}", spare_part_id, machine_id);

    let data = state
        .upstream
        .forward(
            Method::DELETE,
            &format!(
                "/clients/{}/machines/{}/spare-parts?sparePartID={}",
                client_id, machine_id, spare_part_id
            ),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}
