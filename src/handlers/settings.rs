// src/handlers/settings.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    common::error::AppError,
    config::AppState,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Perfil da empresa", body = CompanySettings)
    )
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state
        .settings_repo
        .get_settings(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Perfil atualizado", body = CompanySettings)
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state
        .settings_repo
        .update_settings(&app_state.db_pool, payload)
        .await?;
    Ok((StatusCode::OK, Json(settings)))
}
