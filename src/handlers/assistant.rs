// src/handlers/assistant.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::assistant::{ChatReply, QuoteDraft},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "¿Qué paneles tenemos por debajo de 20 € el m2?")]
    pub message: String,
}

// POST /api/assistant/chat
#[utoipa::path(
    post,
    path = "/api/assistant/chat",
    tag = "Assistant",
    request_body = ChatPayload,
    responses(
        (status = 200, description = "Resposta do assistente, ancorada no catálogo", body = ChatReply),
        (status = 502, description = "Assistente indisponível")
    )
)]
pub async fn chat(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reply = app_state
        .assistant_service
        .chat(&app_state.db_pool, &payload.message)
        .await?;

    Ok((StatusCode::OK, Json(ChatReply { reply })))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraftPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Presupuesto para 120 m2 de tabiquería con panel de yeso")]
    pub request: String,
}

// POST /api/assistant/quote-draft
#[utoipa::path(
    post,
    path = "/api/assistant/quote-draft",
    tag = "Assistant",
    request_body = QuoteDraftPayload,
    responses(
        (status = 200, description = "Rascunho estruturado validado por esquema", body = QuoteDraft),
        (status = 502, description = "Resposta do modelo fora do esquema")
    )
)]
pub async fn quote_draft(
    State(app_state): State<AppState>,
    Json(payload): Json<QuoteDraftPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let draft = app_state
        .assistant_service
        .draft_quote(&app_state.db_pool, &payload.request)
        .await?;

    Ok((StatusCode::OK, Json(draft)))
}
