use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http::Method;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::user::AuthenticatedUser,
    state::AppState,
};

/// Query parameters for cancelling a site visit.
#[derive(Deserialize)]
pub struct VisitQuery {
    #[serde(rename = "visitID")]
    pub visit_id: Option<String>,
}

/// Lists a client's site visits.
#[axum::debug_handler]
pub async fn list_site_visits(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
) -> Result<Response> {
    let data = state
        .upstream
        .forward(
            Method::GET,
            &format!("/clients/{}/site-visits", client_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Schedules a site visit for a client.
#[axum::debug_handler]
pub async fn create_site_visit(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("📅 Scheduling site visit for client: {}", client_id);

    let data = state
        .upstream
        .forward(
            Method::POST,
            &format!("/clients/{}/site-visits", client_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// Updates a scheduled site visit.
#[axum::debug_handler]
pub async fn update_site_visit(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path((client_id, visit_id)): Path<(String, String)>,
    Json(body): Json<sonic_rs::Value>,
) -> Result<Response> {
    tracing::info!("📅 Updating site visit {} for client {}", visit_id, client_id);

    let data = state
        .upstream
        .forward(
            Method::PUT,
            &format!("/clients/{}/site-visits/{}", client_id, visit_id),
            &current.access_token,
            Some(&body),
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Cancels a site visit, identified by query parameter.
#[axum::debug_handler]
pub async fn delete_site_visit(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(client_id): Path<String>,
    Query(query): Query<VisitQuery>,
) -> Result<Response> {
    let visit_id = query
        .visit_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("visitID is required".to_string()))?;

    tracing::info!("🗑️ Cancelling site visit {} for client {}", visit_id, client_id);

    let data = state
        .upstream
        .forward(
            Method::DELETE,
            &format!("/clients/{}/site-visits?visitID={}", client_id, visit_id),
            &current.access_token,
            None,
        )
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}
