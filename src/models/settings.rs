// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Perfil da empresa. Vive numa linha única do banco (id fixo) e é lido a
// cada requisição; nada disso mora em memória de processo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[schema(ignore)]
    pub id: Uuid,

    #[schema(example = "ODEPLAC PRO S.A.")]
    pub company_name: Option<String>,

    #[schema(example = "B-76543210")]
    pub document_number: Option<String>,

    #[schema(example = "Av. de la Construcción 42, Sevilla")]
    pub address: Option<String>,

    // Margem padrão sugerida nas telas de importação.
    #[schema(example = "30.00")]
    pub default_markup: Decimal,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "ODEPLAC PRO S.A.")]
    pub company_name: Option<String>,

    pub document_number: Option<String>,

    pub address: Option<String>,

    #[schema(example = "35.00")]
    pub default_markup: Option<Decimal>,
}
