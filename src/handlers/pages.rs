use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use futures::join;
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::current_session,
    models::upstream::{ClientRecord, MachineCategory},
    models::user::{AccessToken, SessionUser},
    state::AppState,
};

/// Data behind the client-management overview page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientManagementPage {
    pub user: SessionUser,
    pub clients: Vec<ClientRecord>,
    pub machine_categories: Vec<MachineCategory>,
}

/// Data behind a single client's management page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetailPage {
    pub user: SessionUser,
    pub client: ClientRecord,
    pub clients: Vec<ClientRecord>,
    pub machine_categories: Vec<MachineCategory>,
}

fn or_empty<T>(result: Result<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!("⚠️ {} unavailable, rendering without: {}", what, e);
        Vec::new()
    })
}

/// Assembles the client-management overview.
///
/// Unauthenticated visitors are sent to the login page. Fetch failures
/// degrade to empty lists; an admin seeing a blank table beats a wall of
/// error text.
#[axum::debug_handler]
pub async fn client_management(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    let Some(claims) = current_session(&state, &cookies) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let token = AccessToken::new(claims.access_token.clone());

    let (clients, categories) = join!(
        state.upstream.fetch::<Vec<ClientRecord>>("/clients", &token),
        state
            .upstream
            .fetch::<Vec<MachineCategory>>("/machines/machine-category", &token),
    );

    let page = ClientManagementPage {
        user: claims.user(),
        clients: or_empty(clients, "Client list"),
        machine_categories: or_empty(categories, "Machine categories"),
    };

    Ok((StatusCode::OK, Json(page)).into_response())
}

/// Assembles a single client's management page.
///
/// A client the upstream no longer knows sends the visitor back to the
/// overview rather than erroring; the secondary lists degrade to empty.
#[axum::debug_handler]
pub async fn client_detail(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(client_id): Path<String>,
) -> Result<Response> {
    let Some(claims) = current_session(&state, &cookies) else {
        return Ok(Redirect::to("/login").into_response());
    };

    let token = AccessToken::new(claims.access_token.clone());
    let detail_path = format!("/clients/{}", client_id);

    let (client, clients, categories) = join!(
        state.upstream.fetch::<ClientRecord>(&detail_path, &token),
        state.upstream.fetch::<Vec<ClientRecord>>("/clients", &token),
        state
            .upstream
            .fetch::<Vec<MachineCategory>>("/machines/machine-category", &token),
    );

    let client = match client {
        Ok(client) => client,
        Err(AppError::Upstream { status, .. }) if status == StatusCode::NOT_FOUND => {
            tracing::info!("🔍 Client {} not found, back to the overview", client_id);
            return Ok(Redirect::to("/client-management").into_response());
        }
        Err(e) => return Err(e),
    };

    let page = ClientDetailPage {
        user: claims.user(),
        client,
        clients: or_empty(clients, "Client list"),
        machine_categories: or_empty(categories, "Machine categories"),
    };

    Ok((StatusCode::OK, Json(page)).into_response())
}
