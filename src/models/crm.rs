// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Clientes ---
// O portal_token é uma credencial tipo "capability": apresentar o token
// na URL do portal dá acesso de leitura aos projetos daquele cliente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Constructora Silva Ltda")]
    pub full_name: String,
    #[schema(example = "contato@silva.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    // Único e nunca reutilizado: a rotação sempre gera um valor novo.
    pub portal_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Fornecedores ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "ingestion_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestionMethod {
    Api,
    Pdf,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(example = "Aceros del Norte")]
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    // Só o caminho PDF está implementado; API fica registrado para o futuro.
    pub ingestion_method: IngestionMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
