// src/handlers/crm.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::crm::{Client, IngestionMethod, Supplier},
};

// =============================================================================
//  ÁREA 1: CLIENTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Constructora Silva Ltda")]
    pub full_name: String,

    #[validate(email(message = "E-mail inválido"))]
    #[schema(example = "contato@silva.com")]
    pub email: Option<String>,

    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub full_name: Option<String>,

    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,

    pub phone: Option<String>,
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "CRM",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado (com token de portal)", body = Client),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .crm_service
        .create_client(
            &app_state.db_pool,
            &payload.full_name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "CRM",
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Client>)
    )
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.crm_service.list_clients(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.crm_service.get_client(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(client)))
}

// PATCH /api/clients/{id}
#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    tag = "CRM",
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client)
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state
        .crm_service
        .update_client(
            &app_state.db_pool,
            id,
            payload.full_name.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(client)))
}

// POST /api/clients/{id}/portal-token
#[utoipa::path(
    post,
    path = "/api/clients/{id}/portal-token",
    tag = "CRM",
    responses(
        (status = 200, description = "Token girado; o link antigo deixa de valer", body = Client)
    )
)]
pub async fn rotate_portal_token(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state
        .crm_service
        .rotate_portal_token(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(client)))
}

// POST /api/clients/{id}/portal-link
#[utoipa::path(
    post,
    path = "/api/clients/{id}/portal-link",
    tag = "CRM",
    responses(
        (status = 204, description = "Link do portal enviado por e-mail"),
        (status = 502, description = "Provedor de e-mail indisponível")
    )
)]
pub async fn send_portal_link(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .crm_service
        .send_portal_link(&app_state.db_pool, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: FORNECEDORES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Aceros del Norte")]
    pub name: String,

    #[validate(email(message = "E-mail inválido"))]
    pub contact_email: Option<String>,

    pub phone: Option<String>,

    // Só o caminho PDF está implementado hoje.
    #[serde(default = "default_ingestion")]
    pub ingestion_method: IngestionMethod,
}

fn default_ingestion() -> IngestionMethod {
    IngestionMethod::Pdf
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: Option<String>,

    #[validate(email(message = "E-mail inválido"))]
    pub contact_email: Option<String>,

    pub phone: Option<String>,
    pub ingestion_method: Option<IngestionMethod>,
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "CRM",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier)
    )
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .crm_service
        .create_supplier(
            &app_state.db_pool,
            &payload.name,
            payload.contact_email.as_deref(),
            payload.phone.as_deref(),
            payload.ingestion_method,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "CRM",
    responses(
        (status = 200, description = "Lista de fornecedores", body = Vec<Supplier>)
    )
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.crm_service.list_suppliers(&app_state.db_pool).await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

// GET /api/suppliers/{id}
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "CRM",
    responses(
        (status = 200, description = "Fornecedor", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    )
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state.crm_service.get_supplier(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(supplier)))
}

// PATCH /api/suppliers/{id}
#[utoipa::path(
    patch,
    path = "/api/suppliers/{id}",
    tag = "CRM",
    request_body = UpdateSupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier)
    )
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .crm_service
        .update_supplier(
            &app_state.db_pool,
            id,
            payload.name.as_deref(),
            payload.contact_email.as_deref(),
            payload.phone.as_deref(),
            payload.ingestion_method,
        )
        .await?;

    Ok((StatusCode::OK, Json(supplier)))
}
