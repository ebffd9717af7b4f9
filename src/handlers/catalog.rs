// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
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
    models::catalog::{CandidateItem, Material, MaterialUnit, PriceComparison, TariffDocument},
};

// =============================================================================
//  ÁREA 1: MATERIAIS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Panel de yeso 12.7mm")]
    pub name: String,

    pub unit: MaterialUnit,

    // custo nunca negativo (o banco também garante via CHECK)
    #[validate(range(min = 0.0, message = "O custo não pode ser negativo"))]
    #[schema(value_type = f64, example = 125.50)]
    pub cost_price: f64,

    pub category: Option<String>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub unit: Option<MaterialUnit>,
    #[validate(range(min = 0.0, message = "O custo não pode ser negativo"))]
    #[schema(value_type = Option<f64>)]
    pub cost_price: Option<f64>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialFilter {
    pub search: Option<String>,
}

// POST /api/catalog/materials
#[utoipa::path(
    post,
    path = "/api/catalog/materials",
    tag = "Catalog",
    request_body = CreateMaterialPayload,
    responses(
        (status = 201, description = "Material criado", body = Material),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateMaterialPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cost = Decimal::from_f64_retain(payload.cost_price)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2);

    let material = app_state
        .catalog_service
        .create_material(
            &app_state.db_pool,
            payload.name.trim(),
            payload.unit,
            cost,
            payload.category.as_deref(),
            payload.supplier_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(material)))
}

// GET /api/catalog/materials?search=
#[utoipa::path(
    get,
    path = "/api/catalog/materials",
    tag = "Catalog",
    params(
        ("search" = Option<String>, Query, description = "Filtro ILIKE por nome/categoria")
    ),
    responses(
        (status = 200, description = "Lista de materiais", body = Vec<Material>)
    )
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    Query(filter): Query<MaterialFilter>,
) -> Result<impl IntoResponse, AppError> {
    let materials = app_state
        .catalog_service
        .list_materials(&app_state.db_pool, filter.search.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(materials)))
}

// PATCH /api/catalog/materials/{id}
#[utoipa::path(
    patch,
    path = "/api/catalog/materials/{id}",
    tag = "Catalog",
    request_body = UpdateMaterialPayload,
    responses(
        (status = 200, description = "Material atualizado", body = Material),
        (status = 404, description = "Material não encontrado")
    )
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterialPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cost = payload
        .cost_price
        .and_then(Decimal::from_f64_retain)
        .map(|c| c.round_dp(2));

    let material = app_state
        .catalog_service
        .update_material(
            &app_state.db_pool,
            id,
            payload.name.as_deref(),
            payload.unit,
            cost,
            payload.category.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(material)))
}

// =============================================================================
//  ÁREA 2: TARIFÁRIOS (upload -> extração -> preview -> importação)
// =============================================================================

// POST /api/catalog/tariffs (multipart: file, supplierId, category)
#[utoipa::path(
    post,
    path = "/api/catalog/tariffs",
    tag = "Catalog",
    responses(
        (status = 201, description = "Tarifário armazenado", body = TariffDocument),
        (status = 400, description = "Upload inválido")
    )
)]
pub async fn upload_tariff(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut supplier_id: Option<Uuid> = None;
    let mut category: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("tarifario.pdf")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
                file = Some((bytes.to_vec(), file_name));
            }
            "supplierId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
                supplier_id = Some(
                    text.parse()
                        .map_err(|_| AppError::InvalidUpload("supplierId inválido".to_string()))?,
                );
            }
            "category" => {
                category = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidUpload(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (bytes, file_name) =
        file.ok_or_else(|| AppError::InvalidUpload("campo 'file' ausente".to_string()))?;
    let supplier_id =
        supplier_id.ok_or_else(|| AppError::InvalidUpload("campo 'supplierId' ausente".to_string()))?;
    let category =
        category.ok_or_else(|| AppError::InvalidUpload("campo 'category' ausente".to_string()))?;

    // Só PDF é suportado no caminho de ingestão atual.
    if !file_name.to_lowercase().ends_with(".pdf") || !bytes.starts_with(b"%PDF") {
        return Err(AppError::InvalidUpload(
            "o tarifário deve ser um arquivo PDF".to_string(),
        ));
    }

    // Garante que o fornecedor existe antes de gravar qualquer coisa.
    app_state
        .crm_service
        .get_supplier(&app_state.db_pool, supplier_id)
        .await?;

    let storage_path = app_state.storage_service.write(&bytes, &file_name).await?;
    let doc = app_state
        .catalog_service
        .register_tariff_document(&app_state.db_pool, supplier_id, &category, &storage_path, &file_name)
        .await?;

    Ok((StatusCode::CREATED, Json(doc)))
}

// GET /api/catalog/tariffs
#[utoipa::path(
    get,
    path = "/api/catalog/tariffs",
    tag = "Catalog",
    responses(
        (status = 200, description = "Tarifários enviados", body = Vec<TariffDocument>)
    )
)]
pub async fn list_tariffs(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let docs = app_state
        .catalog_service
        .list_tariff_documents(&app_state.db_pool)
        .await?;
    Ok((StatusCode::OK, Json(docs)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTariffPayload {
    // Margem do preview; se ausente, usa a margem padrão configurada.
    #[schema(value_type = Option<f64>, example = 30.0)]
    pub markup_pct: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTariffResponse {
    pub candidates: Vec<CandidateItem>,
    pub preview: Vec<PriceComparison>,
    #[schema(value_type = f64)]
    pub markup_pct: Decimal,
}

// POST /api/catalog/tariffs/{id}/extract
#[utoipa::path(
    post,
    path = "/api/catalog/tariffs/{id}/extract",
    tag = "Catalog",
    request_body = ExtractTariffPayload,
    responses(
        (status = 200, description = "Itens extraídos + preview de preços", body = ExtractTariffResponse),
        (status = 502, description = "Serviço generativo falhou ou resposta ilegível")
    )
)]
pub async fn extract_tariff(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExtractTariffPayload>,
) -> Result<impl IntoResponse, AppError> {
    let doc = app_state
        .catalog_service
        .get_tariff_document(&app_state.db_pool, id)
        .await?;

    let markup_pct = match payload.markup_pct {
        Some(m) => m,
        None => {
            app_state
                .settings_repo
                .get_settings(&app_state.db_pool)
                .await?
                .default_markup
        }
    };

    let bytes = app_state.storage_service.read(&doc.storage_path).await?;
    let candidates = app_state
        .extraction_service
        .extract_candidates(&bytes, "application/pdf")
        .await?;

    let preview = app_state
        .catalog_service
        .build_comparison_against_catalog(
            &app_state.db_pool,
            &candidates,
            Some(doc.supplier_id),
            markup_pct,
        )
        .await?;

    Ok((StatusCode::OK, Json(ExtractTariffResponse {
        candidates,
        preview,
        markup_pct,
    })))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportTariffPayload {
    // Itens confirmados pelo operador na tela de preview.
    pub items: Vec<CandidateItem>,
    #[schema(value_type = f64, example = 30.0)]
    pub markup_pct: Decimal,
    // Categoria opcional; por padrão, a do tarifário.
    pub category: Option<String>,
}

// POST /api/catalog/tariffs/{id}/import
#[utoipa::path(
    post,
    path = "/api/catalog/tariffs/{id}/import",
    tag = "Catalog",
    request_body = ImportTariffPayload,
    responses(
        (status = 201, description = "Itens gravados no catálogo", body = Vec<Material>),
        (status = 500, description = "Falha de persistência; nada foi gravado")
    )
)]
pub async fn import_tariff(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ImportTariffPayload>,
) -> Result<impl IntoResponse, AppError> {
    let doc = app_state
        .catalog_service
        .get_tariff_document(&app_state.db_pool, id)
        .await?;

    let category = payload.category.as_deref().unwrap_or(&doc.category);
    let imported = app_state
        .catalog_service
        .import_candidates(
            &app_state.db_pool,
            &payload.items,
            category,
            Some(doc.supplier_id),
            payload.markup_pct,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(imported)))
}

// DELETE /api/catalog/tariffs/{id}
#[utoipa::path(
    delete,
    path = "/api/catalog/tariffs/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Tarifário e arquivo removidos"),
        (status = 404, description = "Tarifário não encontrado")
    )
)]
pub async fn delete_tariff(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let doc = app_state
        .catalog_service
        .get_tariff_document(&app_state.db_pool, id)
        .await?;

    app_state
        .catalog_service
        .delete_tariff_document(&app_state.db_pool, id)
        .await?;
    app_state
        .storage_service
        .delete(&[doc.storage_path])
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
