// src/handlers/projects.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        invoice::Invoice,
        projects::{Project, ProjectDetail, ProjectStatus, TimelineEntry, TimelineKind},
    },
    services::project_service::QuoteLineInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    pub client_id: Uuid,

    #[validate(length(min = 3, message = "O título deve ter no mínimo 3 caracteres"))]
    #[schema(example = "Reforma nave industrial — Polígono Sur")]
    pub title: String,
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Obra criada em LEAD", body = Project),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let project = app_state
        .project_service
        .create_project(&app_state.db_pool, payload.client_id, payload.title.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "Todas as obras", body = Vec<Project>)
    )
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state.project_service.list_projects(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(projects)))
}

// GET /api/projects/{id}
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    responses(
        (status = 200, description = "Detalhe da obra (linhas + linha do tempo)", body = ProjectDetail),
        (status = 404, description = "Obra não encontrada")
    )
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .project_service
        .get_detail(&app_state.db_pool, id, false)
        .await?;
    Ok((StatusCode::OK, Json(detail)))
}

// =============================================================================
//  ORÇAMENTO
// =============================================================================

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLinePayload {
    pub material_id: Uuid,

    #[schema(value_type = f64, example = 12.5)]
    pub quantity: Decimal,

    // Preço aplicado explícito; se ausente, custo de catálogo + margem.
    #[schema(value_type = Option<f64>)]
    pub applied_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssembleQuotePayload {
    #[validate(length(min = 1, message = "O orçamento precisa de ao menos uma linha"))]
    pub lines: Vec<QuoteLinePayload>,

    #[schema(value_type = f64, example = 30.0)]
    pub margin_pct: Decimal,
}

// POST /api/projects/{id}/quote
#[utoipa::path(
    post,
    path = "/api/projects/{id}/quote",
    tag = "Projects",
    request_body = AssembleQuotePayload,
    responses(
        (status = 200, description = "Orçamento montado; obra em QUOTE", body = ProjectDetail),
        (status = 409, description = "Obra fora de LEAD ou orçamento já montado")
    )
)]
pub async fn assemble_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssembleQuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lines = payload
        .lines
        .into_iter()
        .map(|l| QuoteLineInput {
            material_id: l.material_id,
            quantity: l.quantity,
            applied_price: l.applied_price,
        })
        .collect();

    let detail = app_state
        .project_service
        .assemble_quote(&app_state.db_pool, id, lines, payload.margin_pct)
        .await?;

    Ok((StatusCode::OK, Json(detail)))
}

// =============================================================================
//  CICLO DE VIDA
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
    pub status: ProjectStatus,
}

// POST /api/projects/{id}/transition
#[utoipa::path(
    post,
    path = "/api/projects/{id}/transition",
    tag = "Projects",
    request_body = TransitionPayload,
    responses(
        (status = 200, description = "Obra avançou no funil", body = Project),
        (status = 409, description = "Transição inválida")
    )
)]
pub async fn transition_project(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state
        .project_service
        .transition(&app_state.db_pool, id, payload.status)
        .await?;
    Ok((StatusCode::OK, Json(project)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    #[validate(range(min = 0, max = 100, message = "Percentual entre 0 e 100"))]
    #[schema(example = 65)]
    pub completion_pct: i16,
}

// PATCH /api/projects/{id}/progress
#[utoipa::path(
    patch,
    path = "/api/projects/{id}/progress",
    tag = "Projects",
    request_body = ProgressPayload,
    responses(
        (status = 200, description = "Percentual atualizado", body = Project)
    )
)]
pub async fn update_progress(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgressPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let project = app_state
        .project_service
        .update_progress(&app_state.db_pool, id, payload.completion_pct)
        .await?;
    Ok((StatusCode::OK, Json(project)))
}

// =============================================================================
//  LINHA DO TEMPO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePayload {
    pub kind: TimelineKind,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Material entregue na obra; início da tabiquería.")]
    pub body: String,

    #[serde(default)]
    pub is_public: bool,
}

// POST /api/projects/{id}/timeline
#[utoipa::path(
    post,
    path = "/api/projects/{id}/timeline",
    tag = "Projects",
    request_body = TimelinePayload,
    responses(
        (status = 201, description = "Entrada registrada (append-only)", body = TimelineEntry)
    )
)]
pub async fn append_timeline(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TimelinePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let entry = app_state
        .project_service
        .append_timeline(
            &app_state.db_pool,
            id,
            payload.kind,
            &payload.body,
            payload.is_public,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// =============================================================================
//  MEMÓRIA TÉCNICA (assistente)
// =============================================================================

// POST /api/projects/{id}/memo
#[utoipa::path(
    post,
    path = "/api/projects/{id}/memo",
    tag = "Projects",
    responses(
        (status = 200, description = "Memória técnica redigida e gravada na obra", body = Project),
        (status = 502, description = "Assistente indisponível")
    )
)]
pub async fn draft_memo(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .project_service
        .get_detail(&app_state.db_pool, id, false)
        .await?;

    let memo = app_state
        .assistant_service
        .draft_technical_memo(&detail)
        .await?;

    let project = app_state
        .project_service
        .set_technical_memo(&app_state.db_pool, id, &memo)
        .await?;

    Ok((StatusCode::OK, Json(project)))
}

// =============================================================================
//  FATURA DA OBRA
// =============================================================================

// POST /api/projects/{id}/invoice
#[utoipa::path(
    post,
    path = "/api/projects/{id}/invoice",
    tag = "Invoices",
    responses(
        (status = 201, description = "Fatura emitida e encadeada", body = Invoice),
        (status = 409, description = "Obra não concluída ou fatura já existente")
    )
)]
pub async fn submit_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state
        .invoice_service
        .submit_invoice(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/projects/{id}/invoice
#[utoipa::path(
    get,
    path = "/api/projects/{id}/invoice",
    tag = "Invoices",
    responses(
        (status = 200, description = "Fatura da obra", body = Invoice),
        (status = 404, description = "Obra sem fatura")
    )
)]
pub async fn get_project_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state
        .invoice_service
        .get_invoice_for_project(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(invoice)))
}
