// src/handlers/portal.rs

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use std::net::SocketAddr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::portal::PortalClient,
    models::projects::{Project, ProjectDetail},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalHome {
    pub client_name: String,
    pub projects: Vec<Project>,
}

// GET /portal/{token}
#[utoipa::path(
    get,
    path = "/portal/{token}",
    tag = "Portal",
    responses(
        (status = 200, description = "Obras do cliente dono do token", body = PortalHome),
        (status = 401, description = "Token inválido ou revogado")
    )
)]
pub async fn portal_home(
    State(app_state): State<AppState>,
    client: PortalClient,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state
        .project_service
        .projects_for_client(&app_state.db_pool, client.0.id)
        .await?;

    Ok((StatusCode::OK, Json(PortalHome {
        client_name: client.0.full_name,
        projects,
    })))
}

// GET /portal/{token}/projects/{id}
#[utoipa::path(
    get,
    path = "/portal/{token}/projects/{id}",
    tag = "Portal",
    responses(
        (status = 200, description = "Detalhe da obra (linha do tempo pública)", body = ProjectDetail),
        (status = 404, description = "Obra não pertence a este cliente")
    )
)]
pub async fn portal_project_detail(
    State(app_state): State<AppState>,
    client: PortalClient,
    Path((_token, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    // Só entradas públicas da linha do tempo saem pelo portal.
    let detail = app_state
        .project_service
        .get_detail(&app_state.db_pool, id, true)
        .await?;

    if detail.header.client_id != client.0.id {
        return Err(AppError::ProjectNotFound);
    }

    Ok((StatusCode::OK, Json(detail)))
}

// POST /portal/{token}/projects/{id}/approve
#[utoipa::path(
    post,
    path = "/portal/{token}/projects/{id}/approve",
    tag = "Portal",
    responses(
        (status = 200, description = "Orçamento aprovado; obra em execução", body = Project),
        (status = 409, description = "Obra fora do estado de orçamento")
    )
)]
pub async fn approve_quote(
    State(app_state): State<AppState>,
    client: PortalClient,
    Path((_token, id)): Path<(String, Uuid)>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    // Atrás de proxy o IP real vem no X-Forwarded-For.
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| addr.ip().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("desconhecido")
        .to_string();

    let project = app_state
        .project_service
        .approve_from_portal(&app_state.db_pool, id, client.0.id, &ip, &user_agent)
        .await?;

    Ok((StatusCode::OK, Json(project)))
}
