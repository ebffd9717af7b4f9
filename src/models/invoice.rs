// src/models/invoice.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub project_id: Uuid,
    #[schema(example = "FAC-2026-000042")]
    pub number: String,
    pub content_hash: String,
    // Hash da fatura imediatamente anterior na cadeia global.
    pub previous_hash: String,
    #[schema(example = "ODEPLAC|FAC-2026-000042|9f2c1a0b4d6e8f01")]
    pub qr_payload: String,
    // Snapshot completo do payload canônico no momento da emissão.
    #[schema(ignore)]
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

// --- Payload canônico ---
// A ordem dos campos é a ordem de declaração; serializar duas vezes o
// mesmo payload produz exatamente a mesma string, e portanto o mesmo hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub items: Vec<InvoiceLine>,
    pub total: Decimal,
    pub previous_hash: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub applied_price: Decimal,
}
