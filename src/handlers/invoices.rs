// src/handlers/invoices.rs

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::invoice::Invoice};

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    responses(
        (status = 200, description = "Fatura", body = Invoice),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state
        .invoice_service
        .get_invoice(&app_state.db_pool, id)
        .await?;
    Ok((StatusCode::OK, Json(invoice)))
}

// GET /api/invoices/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    tag = "Invoices",
    responses(
        (status = 200, description = "PDF da fatura com QR de verificação"),
        (status = 404, description = "Fatura não encontrada")
    )
)]
pub async fn download_invoice_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_invoice_pdf(&app_state.db_pool, id)
        .await?;

    // Configura os headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"fatura_{}.pdf\"", id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
